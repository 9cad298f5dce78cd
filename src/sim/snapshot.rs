//! Render snapshot
//!
//! A plain copy of what a renderer needs from the state each frame, so
//! presentation code never holds on to the simulation.

use glam::Vec2;
use serde::Serialize;

use super::state::{GamePhase, GameState};
use crate::catalog::ProjectileKind;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectileView {
    pub pos: Vec2,
    pub kind: ProjectileKind,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderSnapshot {
    pub phase: GamePhase,
    pub ship: Vec2,
    pub enemies: Vec<Vec2>,
    pub projectiles: Vec<ProjectileView>,
    pub lives: u8,
    pub score: u64,
    pub best_score: u64,
    pub points: u64,
    pub level: u32,
    pub kill_count: u32,
    pub kill_target: u32,
    pub weapon: String,
    pub invulnerable: bool,
    /// Seconds left on the resume countdown (only meaningful in ResumeCountdown)
    pub countdown: u8,
    /// Message for the player, e.g. a failed save
    pub notice: Option<String>,
}

impl RenderSnapshot {
    pub fn capture(state: &GameState) -> Self {
        Self {
            phase: state.phase,
            ship: state.ship.pos,
            enemies: state.enemies.iter().map(|e| e.pos).collect(),
            projectiles: state
                .ship
                .projectiles
                .iter()
                .map(|p| ProjectileView {
                    pos: p.pos,
                    kind: p.kind,
                })
                .collect(),
            lives: state.lives,
            score: state.score,
            best_score: state.best_score,
            points: state.points,
            level: state.level,
            kill_count: state.kill_count,
            kill_target: state.kill_target,
            weapon: state.loadout.current().name.clone(),
            invulnerable: state.invulnerable,
            countdown: state.countdown.remaining,
            notice: None,
        }
    }
}
