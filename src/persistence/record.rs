//! Player record types and their on-disk row
//!
//! Numeric fields are read leniently: a value that is not a non-negative
//! integer (or a string of digits) becomes the field default instead of
//! failing the whole row.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::catalog::DEFAULT_WEAPON;
use crate::consts::MAX_LEVEL;

/// Durable progress for one player
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerRecord {
    pub username: String,
    pub best_score: u64,
    pub points: u64,
    /// Owned weapon ids, always including the default weapon
    pub owned_weapons: Vec<String>,
    /// Equipped weapon, always one of `owned_weapons`
    pub current_weapon: String,
    pub highest_level: u32,
}

impl PlayerRecord {
    /// Fresh registration defaults
    pub fn new(username: &str) -> Self {
        Self {
            username: username.to_string(),
            best_score: 0,
            points: 0,
            owned_weapons: vec![DEFAULT_WEAPON.to_string()],
            current_weapon: DEFAULT_WEAPON.to_string(),
            highest_level: 1,
        }
    }

    pub fn owns(&self, weapon_id: &str) -> bool {
        self.owned_weapons.iter().any(|w| w == weapon_id)
    }

    /// Restore the record invariants: unique owned set containing the
    /// default weapon, equipped weapon owned, level within `1..=MAX_LEVEL`
    pub fn normalized(mut self) -> Self {
        let mut owned: Vec<String> = Vec::with_capacity(self.owned_weapons.len() + 1);
        owned.push(DEFAULT_WEAPON.to_string());
        for weapon in self.owned_weapons.drain(..) {
            let weapon = weapon.trim().to_string();
            if !weapon.is_empty() && !owned.contains(&weapon) {
                owned.push(weapon);
            }
        }
        self.owned_weapons = owned;

        if !self.owns(&self.current_weapon) {
            self.current_weapon = DEFAULT_WEAPON.to_string();
        }
        self.highest_level = self.highest_level.clamp(1, MAX_LEVEL);
        self
    }
}

/// A player as stored on disk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerRow {
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub best_score: u64,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub points: u64,
    #[serde(default, deserialize_with = "lenient_list")]
    pub owned_weapons: Vec<String>,
    #[serde(default)]
    pub current_weapon: String,
    #[serde(default = "default_level", deserialize_with = "lenient_level")]
    pub highest_level: u32,
}

impl PlayerRow {
    pub fn from_record(record: &PlayerRecord, password: &str) -> Self {
        Self {
            username: record.username.clone(),
            password: password.to_string(),
            best_score: record.best_score,
            points: record.points,
            owned_weapons: record.owned_weapons.clone(),
            current_weapon: record.current_weapon.clone(),
            highest_level: record.highest_level,
        }
    }

    pub fn to_record(&self) -> PlayerRecord {
        PlayerRecord {
            username: self.username.clone(),
            best_score: self.best_score,
            points: self.points,
            owned_weapons: self.owned_weapons.clone(),
            current_weapon: self.current_weapon.clone(),
            highest_level: self.highest_level,
        }
        .normalized()
    }

    /// Overwrite progress fields from `record`, keeping the password
    pub fn apply(&mut self, record: &PlayerRecord) {
        self.best_score = record.best_score;
        self.points = record.points;
        self.owned_weapons = record.owned_weapons.clone();
        self.current_weapon = record.current_weapon.clone();
        self.highest_level = record.highest_level;
    }
}

fn default_level() -> u32 {
    1
}

/// Parse a loosely typed number: integers and digit strings only
pub(crate) fn parse_count(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn lenient_u64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(parse_count(&value).unwrap_or(0))
}

fn lenient_level<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(parse_count(&value)
        .and_then(|n| u32::try_from(n).ok())
        .filter(|n| (1..=MAX_LEVEL).contains(n))
        .unwrap_or(1))
}

/// Accepts a JSON array of names or one comma-separated string
fn lenient_list<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect(),
        Value::String(s) => s.split(',').map(|w| w.trim().to_string()).collect(),
        _ => Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_numbers_default_per_field() {
        let json = r#"{
            "username": "pilot",
            "password": "pw",
            "best_score": "12x",
            "points": "340",
            "owned_weapons": "basic_shot,laser",
            "current_weapon": "laser",
            "highest_level": -3
        }"#;
        let row: PlayerRow = serde_json::from_str(json).unwrap();
        assert_eq!(row.best_score, 0);
        assert_eq!(row.points, 340);
        assert_eq!(row.highest_level, 1);
        assert_eq!(row.owned_weapons, vec!["basic_shot", "laser"]);
        assert_eq!(row.to_record().current_weapon, "laser");
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let row: PlayerRow = serde_json::from_str(r#"{"username":"pilot"}"#).unwrap();
        let record = row.to_record();
        assert_eq!(record, PlayerRecord::new("pilot"));
    }

    #[test]
    fn test_implausible_level_defaults_to_one() {
        let row: PlayerRow =
            serde_json::from_str(r#"{"username":"pilot","highest_level":500000000}"#).unwrap();
        assert_eq!(row.highest_level, 1);

        let row: PlayerRow = serde_json::from_str(r#"{"username":"pilot","highest_level":"999"}"#).unwrap();
        assert_eq!(row.highest_level, MAX_LEVEL);

        let mut record = PlayerRecord::new("pilot");
        record.highest_level = u32::MAX;
        assert_eq!(record.normalized().highest_level, MAX_LEVEL);
    }

    #[test]
    fn test_normalize_restores_invariants() {
        let record = PlayerRecord {
            username: "pilot".into(),
            best_score: 5,
            points: 5,
            owned_weapons: vec!["laser".into(), "laser".into()],
            current_weapon: "missile".into(),
            highest_level: 0,
        }
        .normalized();
        assert_eq!(record.owned_weapons, vec!["basic_shot", "laser"]);
        assert_eq!(record.current_weapon, "basic_shot");
        assert_eq!(record.highest_level, 1);
    }
}
