//! Weapon catalog
//!
//! Weapons are immutable for the lifetime of a run. The table is read from
//! `weapons.json` once at startup; a missing file is seeded with the
//! built-in weapons and anything unreadable falls back to them.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Weapon every player owns from registration
pub const DEFAULT_WEAPON: &str = "basic_shot";

/// Attempts made before giving up on the catalog file
const MAX_LOAD_ATTEMPTS: u32 = 3;

#[derive(thiserror::Error, Debug)]
pub enum CatalogError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid catalog: {0}")]
    Invalid(String),
}

/// Kind of projectile a weapon fires
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProjectileKind {
    #[default]
    Normal,
    Laser,
    Missile,
    SuperLaser,
}

impl ProjectileKind {
    /// Upward travel per tick (pixels)
    pub fn speed(&self) -> f32 {
        match self {
            ProjectileKind::Normal => 10.0,
            ProjectileKind::Laser => 15.0,
            ProjectileKind::Missile => 8.0,
            ProjectileKind::SuperLaser => 20.0,
        }
    }

    /// Hitbox (width, height)
    pub fn size(&self) -> (f32, f32) {
        match self {
            ProjectileKind::Normal => (5.0, 15.0),
            ProjectileKind::Laser => (8.0, 15.0),
            ProjectileKind::Missile => (10.0, 20.0),
            ProjectileKind::SuperLaser => (8.0, 15.0),
        }
    }

    /// Piercing projectiles survive hitting an enemy
    pub fn piercing(&self) -> bool {
        *self == ProjectileKind::SuperLaser
    }
}

/// A purchasable weapon
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeaponSpec {
    pub name: String,
    pub price: u64,
    pub damage: i32,
    pub fire_interval_ms: u64,
    #[serde(alias = "bullet_kind")]
    pub projectile_kind: ProjectileKind,
}

impl WeaponSpec {
    pub fn new(
        name: &str,
        price: u64,
        damage: i32,
        fire_interval_ms: u64,
        projectile_kind: ProjectileKind,
    ) -> Self {
        Self {
            name: name.to_string(),
            price,
            damage,
            fire_interval_ms,
            projectile_kind,
        }
    }
}

/// Lookup-only view of the weapons on offer
pub trait WeaponCatalog {
    fn get(&self, weapon_id: &str) -> Option<WeaponSpec>;

    /// All weapons in shop order
    fn list_all(&self) -> Vec<WeaponSpec>;
}

/// The weapons shipped with the game
pub fn builtin_weapons() -> Vec<WeaponSpec> {
    vec![
        WeaponSpec::new(DEFAULT_WEAPON, 0, 10, 300, ProjectileKind::Normal),
        WeaponSpec::new("laser", 500, 20, 500, ProjectileKind::Laser),
        WeaponSpec::new("missile", 1000, 30, 800, ProjectileKind::Missile),
        WeaponSpec::new("super_laser", 2000, 25, 400, ProjectileKind::SuperLaser),
    ]
}

/// In-memory weapon table, optionally backed by a JSON file
#[derive(Debug, Clone)]
pub struct WeaponTable {
    weapons: Vec<WeaponSpec>,
}

impl Default for WeaponTable {
    fn default() -> Self {
        Self::builtin()
    }
}

impl WeaponTable {
    pub fn builtin() -> Self {
        Self {
            weapons: builtin_weapons(),
        }
    }

    /// Build a table from explicit entries (validated)
    pub fn from_weapons(weapons: Vec<WeaponSpec>) -> Result<Self, CatalogError> {
        validate(&weapons)?;
        Ok(Self { weapons })
    }

    /// Read and validate a catalog file
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let json = fs::read_to_string(path)?;
        let weapons: Vec<WeaponSpec> = serde_json::from_str(&json)?;
        Self::from_weapons(weapons)
    }

    /// Load the catalog file, seeding it with the built-in weapons when it
    /// is missing. Gives up after a fixed number of attempts and returns the
    /// built-in table.
    pub fn load_or_seed(path: &Path) -> Self {
        for attempt in 1..=MAX_LOAD_ATTEMPTS {
            match Self::load(path) {
                Ok(table) => {
                    log::info!("Loaded {} weapons from {}", table.weapons.len(), path.display());
                    return table;
                }
                Err(CatalogError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                    log::info!("No weapon catalog at {}, seeding defaults", path.display());
                    if let Err(e) = Self::builtin().save(path) {
                        log::warn!("Failed to seed weapon catalog: {}", e);
                    }
                }
                Err(e) => {
                    log::warn!("Weapon catalog attempt {}/{} failed: {}", attempt, MAX_LOAD_ATTEMPTS, e);
                    // A corrupt file is replaced once; later attempts re-read it
                    if attempt == 1 {
                        if let Err(e) = Self::builtin().save(path) {
                            log::warn!("Failed to rewrite weapon catalog: {}", e);
                        }
                    }
                }
            }
        }

        log::warn!("Using built-in weapon catalog");
        Self::builtin()
    }

    /// Write the table as JSON (atomic replace)
    pub fn save(&self, path: &Path) -> Result<(), CatalogError> {
        let json = serde_json::to_string_pretty(&self.weapons)?;
        crate::persistence::write_atomic(path, json.as_bytes())?;
        Ok(())
    }
}

impl WeaponCatalog for WeaponTable {
    fn get(&self, weapon_id: &str) -> Option<WeaponSpec> {
        self.weapons.iter().find(|w| w.name == weapon_id).cloned()
    }

    fn list_all(&self) -> Vec<WeaponSpec> {
        self.weapons.clone()
    }
}

fn validate(weapons: &[WeaponSpec]) -> Result<(), CatalogError> {
    if !weapons.iter().any(|w| w.name == DEFAULT_WEAPON) {
        return Err(CatalogError::Invalid(format!(
            "default weapon '{}' missing",
            DEFAULT_WEAPON
        )));
    }
    for (i, w) in weapons.iter().enumerate() {
        if w.name.is_empty() {
            return Err(CatalogError::Invalid(format!("entry {} has no name", i)));
        }
        if w.damage <= 0 {
            return Err(CatalogError::Invalid(format!("'{}' has non-positive damage", w.name)));
        }
        if w.fire_interval_ms == 0 {
            return Err(CatalogError::Invalid(format!("'{}' has zero fire interval", w.name)));
        }
        if weapons[..i].iter().any(|other| other.name == w.name) {
            return Err(CatalogError::Invalid(format!("duplicate weapon '{}'", w.name)));
        }
    }
    Ok(())
}
