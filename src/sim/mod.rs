//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must stay pure:
//! - Time enters only as milliseconds since session start
//! - Seeded RNG only
//! - Stable iteration order (enemy pool slots, projectile firing order)
//! - No storage, rendering or platform dependencies

pub mod collision;
pub mod progression;
pub mod snapshot;
pub mod state;
pub mod tick;

pub use collision::{Aabb, CollisionResult, resolve_collisions};
pub use progression::apply_progression;
pub use snapshot::{ProjectileView, RenderSnapshot};
pub use state::{
    Countdown, Direction, Enemy, GameEvent, GamePhase, GameState, Loadout, Projectile, Ship,
    enemy_health, enemy_speed,
};
pub use tick::{TickInput, tick};
