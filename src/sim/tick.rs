//! Fixed timestep simulation tick
//!
//! Core game loop that advances a session one step. Time-based effects
//! (fire cooldown, invulnerability, resume countdown) compare elapsed
//! milliseconds, so the result does not depend on how often `tick` runs.

use super::collision::resolve_collisions;
use super::progression::apply_progression;
use super::state::{Countdown, Direction, GameEvent, GamePhase, GameState};
use crate::consts::COUNTDOWN_STEP_MS;

/// Input for a single tick, independent of any input device
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Held direction keys
    pub move_left: bool,
    pub move_right: bool,
    /// One-shot actions
    pub fire: bool,
    pub cycle_weapon_prev: bool,
    pub cycle_weapon_next: bool,
    pub pause_toggle: bool,
    pub confirm: bool,
    pub cancel: bool,
}

/// Advance the session to `now_ms` (milliseconds since session start)
pub fn tick(state: &mut GameState, input: &TickInput, now_ms: u64) {
    state.now_ms = state.now_ms.max(now_ms);

    match state.phase {
        GamePhase::Running => run_frame(state, input),
        GamePhase::Paused => {
            if input.pause_toggle {
                // Cancel-pause skips the countdown
                state.phase = GamePhase::Running;
                state.events.push(GameEvent::Resumed);
            } else if input.confirm {
                state.phase = GamePhase::ResumeCountdown;
                state.countdown = Countdown {
                    last_step_ms: state.now_ms,
                    ..Countdown::default()
                };
                state.events.push(GameEvent::CountdownStarted);
            } else if input.cancel {
                exit(state);
            }
        }
        GamePhase::ResumeCountdown => advance_countdown(state),
        GamePhase::GameOver => {
            if input.confirm {
                state.restart();
                state.events.push(GameEvent::Restarted);
                log::info!("Restarting at level {}", state.level);
            } else if input.cancel {
                exit(state);
            }
        }
        GamePhase::Exited => {}
    }
}

/// One simulation step while running, in fixed order
fn run_frame(state: &mut GameState, input: &TickInput) {
    // 1. Discrete actions
    if input.pause_toggle {
        state.phase = GamePhase::Paused;
        state.events.push(GameEvent::Paused);
        return;
    }
    if input.cancel {
        exit(state);
        return;
    }
    if input.fire {
        state.fire();
    }
    // Opposite cycle presses in the same tick cancel out
    let changed = match (input.cycle_weapon_prev, input.cycle_weapon_next) {
        (true, false) => state.loadout.cycle_prev(),
        (false, true) => state.loadout.cycle_next(),
        _ => false,
    };
    if changed {
        let weapon = state.loadout.current().name.clone();
        state.events.push(GameEvent::WeaponChanged { weapon });
    }

    // 2. Held movement
    if input.move_left {
        state.ship.move_by(Direction::Left);
    }
    if input.move_right {
        state.ship.move_by(Direction::Right);
    }

    // 3. Auto-fire
    if state.auto_fire && state.fire_ready() {
        state.fire();
    }

    // 4. Invulnerability window
    if state.invulnerable && state.now_ms >= state.invulnerable_until_ms {
        state.invulnerable = false;
    }

    // 5. Movement, with escaped enemies replaced in place
    for i in 0..state.enemies.len() {
        state.enemies[i].advance();
        if state.enemies[i].has_escaped() {
            state.replace_enemy(i);
        }
    }
    state.ship.advance_projectiles();

    // 6. Combat
    resolve_collisions(state);

    // 7. Level progression
    apply_progression(state);

    // 8. Out of lives
    if state.lives == 0 {
        state.phase = GamePhase::GameOver;
        state.events.push(GameEvent::GameOver {
            level: state.level,
            score: state.score,
        });
        log::info!("Game over at level {} with score {}", state.level, state.score);
    }
}

fn advance_countdown(state: &mut GameState) {
    while state.now_ms.saturating_sub(state.countdown.last_step_ms) >= COUNTDOWN_STEP_MS {
        state.countdown.remaining = state.countdown.remaining.saturating_sub(1);
        state.countdown.last_step_ms += COUNTDOWN_STEP_MS;

        if state.countdown.remaining == 0 {
            state.countdown = Countdown::default();
            state.phase = GamePhase::Running;
            state.events.push(GameEvent::Resumed);
            return;
        }
        state.events.push(GameEvent::CountdownTick {
            remaining: state.countdown.remaining,
        });
    }
}

fn exit(state: &mut GameState) {
    state.phase = GamePhase::Exited;
    state.events.push(GameEvent::Exited);
}
