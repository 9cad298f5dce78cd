//! Collision detection and combat resolution
//!
//! Runs after every entity has moved for the tick. Rectangles use
//! half-open intervals, so boxes that only share an edge do not overlap.

use glam::Vec2;

use super::state::{GameEvent, GameState};
use crate::consts::{INVULNERABILITY_MS, POINTS_PER_KILL, SCORE_PER_KILL};

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    /// Box from a top-left corner and a size
    pub fn new(pos: Vec2, size: Vec2) -> Self {
        Self {
            min: pos,
            max: pos + size,
        }
    }

    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.min.x < other.max.x
            && other.min.x < self.max.x
            && self.min.y < other.max.y
            && other.min.y < self.max.y
    }
}

/// What the resolver did this tick
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollisionResult {
    /// The ship lost a life
    pub ship_hit: bool,
    /// Projectile impacts
    pub hits: u32,
    /// Enemies destroyed
    pub kills: u32,
}

/// Run both collision passes
pub fn resolve_collisions(state: &mut GameState) -> CollisionResult {
    let mut result = CollisionResult {
        ship_hit: resolve_ship_enemy(state),
        ..Default::default()
    };
    resolve_projectile_enemy(state, &mut result);
    result
}

/// Ship against enemies. At most one life is lost per tick: the first
/// overlapping enemy (pool order) grants invulnerability before any other
/// overlap is considered.
pub fn resolve_ship_enemy(state: &mut GameState) -> bool {
    if state.invulnerable || state.lives == 0 {
        return false;
    }

    let ship_box = state.ship.bounds();
    let Some(index) = state
        .enemies
        .iter()
        .position(|e| e.bounds().overlaps(&ship_box))
    else {
        return false;
    };

    state.lives -= 1;
    state.invulnerable = true;
    state.invulnerable_until_ms = state.now_ms + INVULNERABILITY_MS;
    state.replace_enemy(index);
    state.events.push(GameEvent::ShipHit {
        lives_left: state.lives,
    });
    log::debug!("Ship hit, {} lives left", state.lives);
    true
}

/// Projectiles against enemies. Each projectile damages at most one enemy
/// per tick (the first overlap in pool order); piercing projectiles stay
/// alive and may hit again on later ticks.
pub fn resolve_projectile_enemy(state: &mut GameState, result: &mut CollisionResult) {
    let mut i = 0;
    while i < state.ship.projectiles.len() {
        let projectile = &state.ship.projectiles[i];
        let bounds = projectile.bounds();
        let (damage, piercing) = (projectile.damage, projectile.piercing());

        let Some(target) = state
            .enemies
            .iter()
            .position(|e| e.bounds().overlaps(&bounds))
        else {
            i += 1;
            continue;
        };

        let enemy = &mut state.enemies[target];
        enemy.health -= damage;
        let (enemy_id, destroyed) = (enemy.id, enemy.health <= 0);
        result.hits += 1;
        state.events.push(GameEvent::EnemyHit { enemy_id, damage });

        if piercing {
            i += 1;
        } else {
            state.ship.projectiles.remove(i);
        }

        if destroyed {
            state.replace_enemy(target);
            award_kill(state, enemy_id);
            result.kills += 1;
        }
    }
}

/// Score, currency and kill credit for one destroyed enemy
fn award_kill(state: &mut GameState, enemy_id: u32) {
    let level = state.level as u64;
    let score = SCORE_PER_KILL * level;
    let points = POINTS_PER_KILL * level;
    state.add_score(score);
    state.points += points;
    state.kill_count += 1;
    state.events.push(GameEvent::EnemyDestroyed {
        enemy_id,
        score,
        points,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{ProjectileKind, builtin_weapons};
    use crate::sim::state::{GamePhase, Loadout};

    fn state() -> GameState {
        GameState::new(42, 1, Loadout::new(builtin_weapons(), "basic_shot"))
    }

    /// Park every enemy far from the ship and the projectiles
    fn clear_field(state: &mut GameState) {
        for (i, enemy) in state.enemies.iter_mut().enumerate() {
            enemy.pos = Vec2::new(i as f32 * 60.0, -400.0);
        }
    }

    #[test]
    fn test_aabb_overlap() {
        let a = Aabb::new(Vec2::ZERO, Vec2::new(10.0, 10.0));
        assert!(a.overlaps(&Aabb::new(Vec2::new(5.0, 5.0), Vec2::new(10.0, 10.0))));
        assert!(!a.overlaps(&Aabb::new(Vec2::new(20.0, 0.0), Vec2::new(10.0, 10.0))));
    }

    #[test]
    fn test_aabb_touching_edges_do_not_overlap() {
        let a = Aabb::new(Vec2::ZERO, Vec2::new(10.0, 10.0));
        assert!(!a.overlaps(&Aabb::new(Vec2::new(10.0, 0.0), Vec2::new(10.0, 10.0))));
        assert!(!a.overlaps(&Aabb::new(Vec2::new(0.0, 10.0), Vec2::new(10.0, 10.0))));
    }

    #[test]
    fn test_empty_containers() {
        let mut state = state();
        state.enemies.clear();
        state.ship.projectiles.clear();
        let result = resolve_collisions(&mut state);
        assert_eq!(result, CollisionResult::default());
    }

    #[test]
    fn test_ship_hit_costs_one_life_even_with_multiple_overlaps() {
        let mut state = state();
        clear_field(&mut state);
        state.enemies[0].pos = state.ship.pos;
        state.enemies[1].pos = state.ship.pos + Vec2::new(10.0, 0.0);
        let before = state.enemies.len();

        assert!(resolve_ship_enemy(&mut state));
        assert_eq!(state.lives, 2);
        assert!(state.invulnerable);
        assert_eq!(state.invulnerable_until_ms, INVULNERABILITY_MS);
        assert_eq!(state.enemies.len(), before);

        // Second overlapping enemy is ignored while invulnerable
        assert!(!resolve_ship_enemy(&mut state));
        assert_eq!(state.lives, 2);
    }

    #[test]
    fn test_ship_hit_ignored_while_invulnerable() {
        let mut state = state();
        clear_field(&mut state);
        state.invulnerable = true;
        state.enemies[0].pos = state.ship.pos;
        assert!(!resolve_ship_enemy(&mut state));
        assert_eq!(state.lives, 3);
    }

    #[test]
    fn test_projectile_kill_awards_rewards() {
        let mut state = state();
        clear_field(&mut state);
        state.level = 2;
        state.enemies[0].pos = Vec2::new(100.0, 100.0);
        state.enemies[0].health = 10;
        state.ship.projectiles.push(crate::sim::state::Projectile::new(
            999,
            Vec2::new(110.0, 110.0),
            ProjectileKind::Normal,
            10,
        ));
        let dead_id = state.enemies[0].id;

        let result = resolve_collisions(&mut state);
        assert_eq!(result.kills, 1);
        assert_eq!(state.score, 20);
        assert_eq!(state.points, 10);
        assert_eq!(state.kill_count, 1);
        assert!(state.ship.projectiles.is_empty());
        assert_ne!(state.enemies[0].id, dead_id);
        assert_eq!(state.phase, GamePhase::Running);
    }

    #[test]
    fn test_piercing_projectile_survives_and_hits_once_per_tick() {
        let mut state = state();
        clear_field(&mut state);
        state.enemies[0].pos = Vec2::new(100.0, 100.0);
        state.enemies[1].pos = Vec2::new(100.0, 100.0);
        state.enemies[0].health = 100;
        state.enemies[1].health = 100;
        state.ship.projectiles.push(crate::sim::state::Projectile::new(
            999,
            Vec2::new(110.0, 110.0),
            ProjectileKind::SuperLaser,
            25,
        ));

        let result = resolve_collisions(&mut state);
        assert_eq!(result.hits, 1);
        assert_eq!(state.ship.projectiles.len(), 1);
        assert_eq!(state.enemies[0].health, 75);
        assert_eq!(state.enemies[1].health, 100);
    }

    #[test]
    fn test_partial_damage_keeps_enemy() {
        let mut state = state();
        clear_field(&mut state);
        state.enemies[0].pos = Vec2::new(100.0, 100.0);
        state.enemies[0].health = 30;
        state.ship.projectiles.push(crate::sim::state::Projectile::new(
            999,
            Vec2::new(110.0, 110.0),
            ProjectileKind::Laser,
            20,
        ));

        let result = resolve_collisions(&mut state);
        assert_eq!(result.kills, 0);
        assert_eq!(state.enemies[0].health, 10);
        assert_eq!(state.score, 0);
    }
}
