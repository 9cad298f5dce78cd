//! Level progression
//!
//! Checked once per tick after combat. Kills past the target in the same
//! tick do not carry over into the next level.

use super::state::{GameEvent, GameState};
use crate::consts::MAX_LEVEL;
use crate::kill_target;

/// Level up if the kill target was reached. Returns true on level-up.
pub fn apply_progression(state: &mut GameState) -> bool {
    if state.kill_count < state.kill_target {
        return false;
    }

    state.level = (state.level + 1).min(MAX_LEVEL);
    state.kill_count = 0;
    state.kill_target = kill_target(state.level);
    state.regenerate_enemies();
    state.events.push(GameEvent::LevelUp { level: state.level });
    log::info!(
        "Level {} reached: {} enemies, target {} kills",
        state.level,
        state.enemies.len(),
        state.kill_target
    );
    true
}
