//! Alien War - an arcade space shooter
//!
//! Core modules:
//! - `sim`: Deterministic simulation (entities, collisions, progression, session phases)
//! - `catalog`: Weapon catalog lookups
//! - `persistence`: Player record storage with atomic rewrites
//! - `session`: Ties a simulation run to the record store
//! - `shop`, `account`, `leaderboard`, `nav`: Outer menu layer

pub mod account;
pub mod catalog;
pub mod leaderboard;
pub mod nav;
pub mod persistence;
pub mod session;
pub mod settings;
pub mod shop;
pub mod sim;

pub use catalog::{ProjectileKind, WeaponCatalog, WeaponSpec, WeaponTable};
pub use leaderboard::Leaderboard;
pub use persistence::{JsonFileStore, MemoryStore, PlayerRecord, PlayerRecordStore, StoreError};
pub use session::{GameSession, SessionExit};
pub use settings::Settings;

/// Game configuration constants
pub mod consts {
    /// Logical simulation rate
    pub const TICK_HZ: u32 = 60;

    /// Playfield dimensions
    pub const SCREEN_WIDTH: f32 = 800.0;
    pub const SCREEN_HEIGHT: f32 = 600.0;

    /// Ship defaults
    pub const SHIP_WIDTH: f32 = 50.0;
    pub const SHIP_HEIGHT: f32 = 50.0;
    /// Gap between the ship's bottom edge and the screen bottom
    pub const SHIP_BOTTOM_MARGIN: f32 = 20.0;
    /// Horizontal movement per tick while a direction is held
    pub const SHIP_SPEED: f32 = 5.0;

    /// Enemy defaults
    pub const ENEMY_WIDTH: f32 = 50.0;
    pub const ENEMY_HEIGHT: f32 = 50.0;
    pub const ENEMY_BASE_SPEED: f32 = 2.0;
    pub const ENEMY_SPEED_PER_LEVEL: f32 = 0.5;
    pub const ENEMY_BASE_HEALTH: i32 = 10;
    pub const ENEMY_HEALTH_PER_LEVEL: i32 = 5;
    /// Enemies spawn above the visible area within this y range
    pub const ENEMY_SPAWN_Y_MIN: f32 = -100.0;
    pub const ENEMY_SPAWN_Y_MAX: f32 = -50.0;

    /// Lives and damage window
    pub const MAX_LIVES: u8 = 3;

    /// Highest reachable level; stored levels above it are treated as corrupt
    pub const MAX_LEVEL: u32 = 999;
    pub const INVULNERABILITY_MS: u64 = 2000;

    /// Resume countdown after leaving the pause menu
    pub const RESUME_COUNTDOWN_SECS: u8 = 3;
    pub const COUNTDOWN_STEP_MS: u64 = 1000;

    /// Rewards per kill, multiplied by the current level
    pub const SCORE_PER_KILL: u64 = 10;
    pub const POINTS_PER_KILL: u64 = 5;
}

/// Enemy pool size for a level (5 + 2 per level)
#[inline]
pub fn enemy_pool_size(level: u32) -> usize {
    5 + 2 * level.min(consts::MAX_LEVEL) as usize
}

/// Kills required to leave a level
#[inline]
pub fn kill_target(level: u32) -> u32 {
    10u32.saturating_mul(level)
}
