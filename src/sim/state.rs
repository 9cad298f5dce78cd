//! Game state and core simulation types
//!
//! Everything a running session needs lives here. Nothing in this module
//! touches storage, rendering or the wall clock; time arrives as
//! milliseconds since session start through `tick`.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::collision::Aabb;
use crate::catalog::{ProjectileKind, WeaponSpec};
use crate::consts::*;
use crate::{enemy_pool_size, kill_target};

/// Current phase of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Active gameplay
    Running,
    /// Pause menu open, simulation frozen
    Paused,
    /// Counting down back into play, simulation frozen
    ResumeCountdown,
    /// Lives exhausted, waiting for restart or exit
    GameOver,
    /// Player left the session
    Exited,
}

/// Horizontal ship movement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
}

/// Something that happened during a tick, for audio/HUD/persistence hooks
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    Fired { kind: ProjectileKind },
    WeaponChanged { weapon: String },
    EnemyHit { enemy_id: u32, damage: i32 },
    EnemyDestroyed { enemy_id: u32, score: u64, points: u64 },
    ShipHit { lives_left: u8 },
    LevelUp { level: u32 },
    Paused,
    CountdownStarted,
    CountdownTick { remaining: u8 },
    Resumed,
    GameOver { level: u32, score: u64 },
    Restarted,
    Exited,
}

/// A projectile fired by the ship
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Projectile {
    pub id: u32,
    /// Top-left corner
    pub pos: Vec2,
    pub size: Vec2,
    pub kind: ProjectileKind,
    pub speed: f32,
    pub damage: i32,
}

impl Projectile {
    pub fn new(id: u32, pos: Vec2, kind: ProjectileKind, damage: i32) -> Self {
        let (w, h) = kind.size();
        Self {
            id,
            pos,
            size: Vec2::new(w, h),
            kind,
            speed: kind.speed(),
            damage,
        }
    }

    /// Move toward the top of the screen
    pub fn advance(&mut self) {
        self.pos.y -= self.speed;
    }

    pub fn piercing(&self) -> bool {
        self.kind.piercing()
    }

    pub fn is_off_screen(&self) -> bool {
        self.pos.y < 0.0
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::new(self.pos, self.size)
    }
}

/// The player's ship
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ship {
    /// Top-left corner
    pub pos: Vec2,
    pub size: Vec2,
    /// Live projectiles (oldest first)
    pub projectiles: Vec<Projectile>,
}

impl Default for Ship {
    fn default() -> Self {
        Self {
            pos: Vec2::new(
                (SCREEN_WIDTH / 2.0 - SHIP_WIDTH / 2.0).floor(),
                SCREEN_HEIGHT - SHIP_HEIGHT - SHIP_BOTTOM_MARGIN,
            ),
            size: Vec2::new(SHIP_WIDTH, SHIP_HEIGHT),
            projectiles: Vec::new(),
        }
    }
}

impl Ship {
    /// Step one tick in a direction, clamped to the playfield
    pub fn move_by(&mut self, direction: Direction) {
        let max_x = SCREEN_WIDTH - self.size.x;
        let dx = match direction {
            Direction::Left => -SHIP_SPEED,
            Direction::Right => SHIP_SPEED,
        };
        self.pos.x = (self.pos.x + dx).clamp(0.0, max_x);
    }

    /// Spawn a projectile at the horizontal centre of the top edge
    pub fn fire(&mut self, id: u32, kind: ProjectileKind, damage: i32) {
        let (w, h) = kind.size();
        let pos = Vec2::new(self.pos.x + self.size.x / 2.0 - w / 2.0, self.pos.y - h);
        self.projectiles.push(Projectile::new(id, pos, kind, damage));
    }

    /// Move projectiles and drop the ones that left the screen
    pub fn advance_projectiles(&mut self) {
        for projectile in &mut self.projectiles {
            projectile.advance();
        }
        self.projectiles.retain(|p| !p.is_off_screen());
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::new(self.pos, self.size)
    }
}

/// A descending enemy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enemy {
    pub id: u32,
    /// Top-left corner
    pub pos: Vec2,
    pub size: Vec2,
    pub speed: f32,
    pub health: i32,
}

impl Enemy {
    /// Spawn above the screen at a random column, scaled to the level
    pub fn spawn(id: u32, level: u32, rng: &mut Pcg32) -> Self {
        let x = rng.random_range(0..=(SCREEN_WIDTH - ENEMY_WIDTH) as i32) as f32;
        let y = rng.random_range(ENEMY_SPAWN_Y_MIN as i32..=ENEMY_SPAWN_Y_MAX as i32) as f32;
        Self {
            id,
            pos: Vec2::new(x, y),
            size: Vec2::new(ENEMY_WIDTH, ENEMY_HEIGHT),
            speed: enemy_speed(level),
            health: enemy_health(level),
        }
    }

    pub fn advance(&mut self) {
        self.pos.y += self.speed;
    }

    /// Past the bottom edge
    pub fn has_escaped(&self) -> bool {
        self.pos.y > SCREEN_HEIGHT
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::new(self.pos, self.size)
    }
}

/// Enemy fall speed per tick at a level
pub fn enemy_speed(level: u32) -> f32 {
    ENEMY_BASE_SPEED + level.saturating_sub(1) as f32 * ENEMY_SPEED_PER_LEVEL
}

/// Enemy starting health at a level
pub fn enemy_health(level: u32) -> i32 {
    ENEMY_BASE_HEALTH + level.saturating_sub(1) as i32 * ENEMY_HEALTH_PER_LEVEL
}

/// Owned weapons in shop order, with the equipped one selected
#[derive(Debug, Clone, PartialEq)]
pub struct Loadout {
    weapons: Vec<WeaponSpec>,
    current: usize,
}

impl Loadout {
    /// `weapons` must not be empty; an unknown `current` selects the first entry
    pub fn new(weapons: Vec<WeaponSpec>, current: &str) -> Self {
        debug_assert!(!weapons.is_empty());
        let current = weapons.iter().position(|w| w.name == current).unwrap_or(0);
        Self { weapons, current }
    }

    pub fn current(&self) -> &WeaponSpec {
        &self.weapons[self.current]
    }

    pub fn weapons(&self) -> &[WeaponSpec] {
        &self.weapons
    }

    /// Select the next owned weapon (wrapping). False if only one is owned.
    pub fn cycle_next(&mut self) -> bool {
        if self.weapons.len() < 2 {
            return false;
        }
        self.current = (self.current + 1) % self.weapons.len();
        true
    }

    /// Select the previous owned weapon (wrapping). False if only one is owned.
    pub fn cycle_prev(&mut self) -> bool {
        if self.weapons.len() < 2 {
            return false;
        }
        self.current = (self.current + self.weapons.len() - 1) % self.weapons.len();
        true
    }
}

/// Resume countdown bookkeeping
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Countdown {
    pub remaining: u8,
    /// Time of the last decrement (or of the countdown start)
    pub last_step_ms: u64,
}

impl Default for Countdown {
    fn default() -> Self {
        Self {
            remaining: RESUME_COUNTDOWN_SECS,
            last_step_ms: 0,
        }
    }
}

/// Complete session state
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    rng: Pcg32,
    /// Current level (1-based)
    pub level: u32,
    /// Score this run
    pub score: u64,
    /// Best score across runs (never decreases)
    pub best_score: u64,
    /// Currency balance including kills this run
    pub points: u64,
    pub kill_count: u32,
    pub kill_target: u32,
    pub lives: u8,
    pub invulnerable: bool,
    pub invulnerable_until_ms: u64,
    /// Time of the last shot, manual or automatic
    pub last_fire_ms: Option<u64>,
    /// Milliseconds since session start, as of the latest tick
    pub now_ms: u64,
    pub phase: GamePhase,
    pub countdown: Countdown,
    pub auto_fire: bool,
    pub ship: Ship,
    /// Enemy pool, always `enemy_pool_size(level)` long
    pub enemies: Vec<Enemy>,
    pub loadout: Loadout,
    /// Events raised since the last drain
    pub events: Vec<GameEvent>,
    next_id: u32,
}

impl GameState {
    /// Start a session at `level` (clamped to `1..=MAX_LEVEL`) with the given weapons
    pub fn new(seed: u64, level: u32, loadout: Loadout) -> Self {
        let level = level.clamp(1, MAX_LEVEL);
        let mut state = Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            level,
            score: 0,
            best_score: 0,
            points: 0,
            kill_count: 0,
            kill_target: kill_target(level),
            lives: MAX_LIVES,
            invulnerable: false,
            invulnerable_until_ms: 0,
            last_fire_ms: None,
            now_ms: 0,
            phase: GamePhase::Running,
            countdown: Countdown::default(),
            auto_fire: true,
            ship: Ship::default(),
            enemies: Vec::new(),
            loadout,
            events: Vec::new(),
            next_id: 1,
        };
        state.regenerate_enemies();
        state
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Replace the whole pool with fresh enemies for the current level
    pub fn regenerate_enemies(&mut self) {
        let count = enemy_pool_size(self.level);
        self.enemies.clear();
        for _ in 0..count {
            let id = self.next_entity_id();
            let enemy = Enemy::spawn(id, self.level, &mut self.rng);
            self.enemies.push(enemy);
        }
    }

    /// Swap the enemy at `index` for a fresh one in the same slot
    pub fn replace_enemy(&mut self, index: usize) {
        let id = self.next_entity_id();
        self.enemies[index] = Enemy::spawn(id, self.level, &mut self.rng);
    }

    /// Fire the equipped weapon
    pub fn fire(&mut self) {
        let id = self.next_entity_id();
        let weapon = self.loadout.current();
        let (kind, damage) = (weapon.projectile_kind, weapon.damage);
        self.ship.fire(id, kind, damage);
        self.last_fire_ms = Some(self.now_ms);
        self.events.push(GameEvent::Fired { kind });
    }

    /// Whether the equipped weapon's interval has elapsed since the last shot
    pub fn fire_ready(&self) -> bool {
        match self.last_fire_ms {
            None => true,
            Some(last) => {
                self.now_ms.saturating_sub(last) >= self.loadout.current().fire_interval_ms
            }
        }
    }

    /// Add score, keeping the best score in step
    pub fn add_score(&mut self, amount: u64) {
        self.score += amount;
        self.best_score = self.best_score.max(self.score);
    }

    /// Fresh run at the current level, keeping currency, best score and weapons
    pub fn restart(&mut self) {
        self.score = 0;
        self.kill_count = 0;
        self.kill_target = kill_target(self.level);
        self.lives = MAX_LIVES;
        self.invulnerable = false;
        self.invulnerable_until_ms = 0;
        self.last_fire_ms = None;
        self.countdown = Countdown::default();
        self.ship = Ship::default();
        self.phase = GamePhase::Running;
        self.regenerate_enemies();
    }

    /// Take the events raised since the last call
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::builtin_weapons;

    fn state_at(level: u32) -> GameState {
        GameState::new(7, level, Loadout::new(builtin_weapons(), "basic_shot"))
    }

    #[test]
    fn test_new_state_invariants() {
        let state = state_at(3);
        assert_eq!(state.enemies.len(), 11);
        assert_eq!(state.kill_target, 30);
        assert_eq!(state.lives, MAX_LIVES);
        assert_eq!(state.phase, GamePhase::Running);
        for enemy in &state.enemies {
            assert_eq!(enemy.speed, 3.0);
            assert_eq!(enemy.health, 20);
            assert!(enemy.pos.y >= ENEMY_SPAWN_Y_MIN && enemy.pos.y <= ENEMY_SPAWN_Y_MAX);
            assert!(enemy.pos.x >= 0.0 && enemy.pos.x <= SCREEN_WIDTH - ENEMY_WIDTH);
        }
    }

    #[test]
    fn test_ship_clamps_at_left_edge() {
        let mut ship = Ship::default();
        ship.pos.x = 0.0;
        ship.move_by(Direction::Left);
        assert_eq!(ship.pos.x, 0.0);

        ship.pos.x = 3.0;
        ship.move_by(Direction::Left);
        assert_eq!(ship.pos.x, 0.0);
    }

    #[test]
    fn test_ship_clamps_at_right_edge() {
        let mut ship = Ship::default();
        ship.pos.x = SCREEN_WIDTH - SHIP_WIDTH;
        ship.move_by(Direction::Right);
        assert_eq!(ship.pos.x, SCREEN_WIDTH - SHIP_WIDTH);
    }

    #[test]
    fn test_fire_spawns_at_ship_centre() {
        let mut ship = Ship::default();
        ship.fire(1, ProjectileKind::Missile, 30);
        let p = &ship.projectiles[0];
        assert_eq!(p.pos.x + p.size.x / 2.0, ship.pos.x + ship.size.x / 2.0);
        assert_eq!(p.pos.y, ship.pos.y - 20.0);
        assert_eq!(p.damage, 30);
    }

    #[test]
    fn test_projectiles_leave_through_top() {
        let mut ship = Ship::default();
        ship.fire(1, ProjectileKind::Normal, 10);
        ship.projectiles[0].pos.y = 5.0;
        ship.advance_projectiles();
        assert!(ship.projectiles.is_empty());
    }

    #[test]
    fn test_loadout_cycles_both_ways() {
        let mut loadout = Loadout::new(builtin_weapons(), "basic_shot");
        assert!(loadout.cycle_prev());
        assert_eq!(loadout.current().name, "super_laser");
        assert!(loadout.cycle_next());
        assert_eq!(loadout.current().name, "basic_shot");

        let mut single = Loadout::new(builtin_weapons()[..1].to_vec(), "basic_shot");
        assert!(!single.cycle_next());
        assert!(!single.cycle_prev());
    }

    #[test]
    fn test_same_seed_same_spawns() {
        let a = state_at(2);
        let b = state_at(2);
        assert_eq!(a.enemies, b.enemies);
    }

    #[test]
    fn test_restart_keeps_level_and_best() {
        let mut state = state_at(4);
        state.add_score(500);
        state.lives = 0;
        state.phase = GamePhase::GameOver;
        state.restart();
        assert_eq!(state.level, 4);
        assert_eq!(state.score, 0);
        assert_eq!(state.best_score, 500);
        assert_eq!(state.lives, MAX_LIVES);
        assert_eq!(state.enemies.len(), enemy_pool_size(4));
    }
}
