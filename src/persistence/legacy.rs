//! Legacy user file import
//!
//! The old format is one comma-separated line per player with a header:
//! `username,password,best_score,points,owned_weapons,current_weapon,last_level`.
//! Owned weapons were joined with commas too, so a row can have more than
//! seven fields; the last two are always the equipped weapon and level.

use std::path::Path;

use super::record::{PlayerRecord, PlayerRow};
use super::{JsonFileStore, Result};
use crate::catalog::DEFAULT_WEAPON;

/// Map weapon names used by the old file to catalog ids
fn weapon_id(legacy: &str) -> String {
    match legacy.trim() {
        "普通子弹" | "" => DEFAULT_WEAPON.to_string(),
        "激光" => "laser".to_string(),
        "导弹" => "missile".to_string(),
        "超级激光" => "super_laser".to_string(),
        other => other.to_string(),
    }
}

fn number(field: Option<&str>, default: u64) -> u64 {
    field
        .and_then(|f| f.trim().parse().ok())
        .unwrap_or(default)
}

/// Parse one legacy row. Rows without a username are dropped.
pub fn parse_row(fields: &[&str]) -> Option<PlayerRow> {
    let username = fields.first()?.trim();
    if username.is_empty() {
        return None;
    }

    let password = fields.get(1).copied().unwrap_or("");
    let best_score = number(fields.get(2).copied(), 0);
    let points = number(fields.get(3).copied(), 0);

    let (owned, current, level) = if fields.len() >= 7 {
        let n = fields.len();
        (&fields[4..n - 2], Some(fields[n - 2]), fields.get(n - 1).copied())
    } else {
        (fields.get(4..5).unwrap_or(&[]), fields.get(5).copied(), None)
    };

    let record = PlayerRecord {
        username: username.to_string(),
        best_score,
        points,
        owned_weapons: owned.iter().map(|w| weapon_id(w)).collect(),
        current_weapon: current.map(weapon_id).unwrap_or_else(|| DEFAULT_WEAPON.to_string()),
        highest_level: number(level, 1).clamp(1, u32::MAX as u64) as u32,
    }
    .normalized();

    Some(PlayerRow::from_record(&record, password.trim()))
}

/// Read every usable row from a legacy user file
pub fn read_legacy_users(path: &Path) -> Result<Vec<PlayerRow>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)?;

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                log::warn!("Skipping unreadable legacy row: {}", e);
                continue;
            }
        };
        let fields: Vec<&str> = record.iter().collect();
        if let Some(row) = parse_row(&fields) {
            rows.push(row);
        }
    }
    Ok(rows)
}

/// Import a legacy user file into `store`, skipping names already present
pub fn import_legacy_users(store: &mut JsonFileStore, path: &Path) -> Result<usize> {
    let rows = read_legacy_users(path)?;
    let found = rows.len();
    let added = store.import_rows(rows)?;
    log::info!("Imported {} of {} legacy players from {}", added, found, path.display());
    Ok(added)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::PlayerRecordStore;

    #[test]
    fn test_single_owned_weapon_row() {
        let row = parse_row(&["pilot", "pw", "120", "45", "普通子弹", "普通子弹", "3"]).unwrap();
        assert_eq!(row.best_score, 120);
        assert_eq!(row.points, 45);
        assert_eq!(row.owned_weapons, vec!["basic_shot"]);
        assert_eq!(row.current_weapon, "basic_shot");
        assert_eq!(row.highest_level, 3);
    }

    #[test]
    fn test_multiple_owned_weapons_spill_into_extra_fields() {
        let row = parse_row(&["pilot", "pw", "0", "0", "普通子弹", "激光", "导弹", "激光", "5"]).unwrap();
        assert_eq!(row.owned_weapons, vec!["basic_shot", "laser", "missile"]);
        assert_eq!(row.current_weapon, "laser");
        assert_eq!(row.highest_level, 5);
    }

    #[test]
    fn test_short_and_malformed_rows() {
        let row = parse_row(&["pilot", "pw", "abc"]).unwrap();
        assert_eq!(row.best_score, 0);
        assert_eq!(row.highest_level, 1);
        assert_eq!(row.current_weapon, "basic_shot");

        assert!(parse_row(&["", "pw"]).is_none());
    }

    #[test]
    fn test_import_file() {
        let dir = tempfile::tempdir().unwrap();
        let legacy = dir.path().join("users.txt");
        std::fs::write(
            &legacy,
            "username,password,best_score,points,owned_weapons,current_weapon,last_level\n\
             ace,pw1,300,20,普通子弹,普通子弹,2\n\
             \n\
             rookie,pw2,x,7,普通子弹,导弹,导弹,4\n",
        )
        .unwrap();

        let mut store = JsonFileStore::open(dir.path().join("players.json"));
        assert_eq!(import_legacy_users(&mut store, &legacy).unwrap(), 2);
        assert!(store.authenticate("ace", "pw1"));
        let rookie = store.load("rookie");
        assert_eq!(rookie.best_score, 0);
        assert_eq!(rookie.current_weapon, "missile");
        assert_eq!(rookie.highest_level, 4);
    }
}
