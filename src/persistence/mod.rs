//! Player record persistence
//!
//! Features:
//! - `PlayerRecordStore` contract consumed by sessions and menus
//! - Versioned JSON file store with atomic rewrites (tmp file → rename)
//! - Tolerant parsing: bad fields fall back to defaults, bad rows are skipped
//! - Import of the legacy comma-separated user file

pub mod file_store;
pub mod legacy;
pub mod record;

use std::fs;
use std::io::Write;
use std::path::Path;

pub use file_store::JsonFileStore;
pub use record::{PlayerRecord, PlayerRow};

#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// Durable per-player progress
pub trait PlayerRecordStore {
    /// Stored record, or new-player defaults if unknown
    fn load(&self, username: &str) -> PlayerRecord;

    /// Full upsert. The stored best score never decreases.
    fn save(&mut self, record: &PlayerRecord) -> Result<()>;

    /// Create a player with default progress. `Ok(false)` if the name is taken.
    fn register(&mut self, username: &str, password: &str) -> Result<bool>;

    fn authenticate(&self, username: &str, password: &str) -> bool;

    /// Every player, best score first
    fn list_all(&self) -> Vec<PlayerRecord>;

    /// Delete every player
    fn reset(&mut self) -> Result<()>;
}

/// Replace `path` with `bytes` without ever exposing a partial file
pub fn write_atomic(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;

    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Merge `record` into `rows`, keeping password and the higher best score
pub(crate) fn upsert(rows: &mut Vec<PlayerRow>, record: &PlayerRecord) {
    let record = record.clone().normalized();
    match rows.iter_mut().find(|r| r.username == record.username) {
        Some(row) => {
            let best = row.best_score.max(record.best_score);
            row.apply(&record);
            row.best_score = best;
        }
        None => rows.push(PlayerRow::from_record(&record, "")),
    }
}

/// Records sorted by best score (descending), then name
pub(crate) fn ranked(rows: &[PlayerRow]) -> Vec<PlayerRecord> {
    let mut records: Vec<PlayerRecord> = rows.iter().map(PlayerRow::to_record).collect();
    records.sort_by(|a, b| {
        b.best_score
            .cmp(&a.best_score)
            .then_with(|| a.username.cmp(&b.username))
    });
    records
}

/// Volatile store for tests and guest play
#[derive(Debug, Default)]
pub struct MemoryStore {
    rows: Vec<PlayerRow>,
    /// When set, every write fails (simulates a full disk or lock)
    pub fail_writes: bool,
    /// Successful writes so far
    pub writes: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn check_writable(&mut self) -> Result<()> {
        if self.fail_writes {
            return Err(StoreError::Unavailable("writes disabled".into()));
        }
        self.writes += 1;
        Ok(())
    }
}

impl PlayerRecordStore for MemoryStore {
    fn load(&self, username: &str) -> PlayerRecord {
        self.rows
            .iter()
            .find(|r| r.username == username)
            .map(PlayerRow::to_record)
            .unwrap_or_else(|| PlayerRecord::new(username))
    }

    fn save(&mut self, record: &PlayerRecord) -> Result<()> {
        self.check_writable()?;
        upsert(&mut self.rows, record);
        Ok(())
    }

    fn register(&mut self, username: &str, password: &str) -> Result<bool> {
        if self.rows.iter().any(|r| r.username == username) {
            return Ok(false);
        }
        self.check_writable()?;
        self.rows
            .push(PlayerRow::from_record(&PlayerRecord::new(username), password));
        Ok(true)
    }

    fn authenticate(&self, username: &str, password: &str) -> bool {
        self.rows
            .iter()
            .any(|r| r.username == username && r.password == password)
    }

    fn list_all(&self) -> Vec<PlayerRecord> {
        ranked(&self.rows)
    }

    fn reset(&mut self) -> Result<()> {
        self.check_writable()?;
        self.rows.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::DEFAULT_WEAPON;

    #[test]
    fn test_register_and_authenticate() {
        let mut store = MemoryStore::new();
        assert!(store.register("pilot", "secret").unwrap());
        assert!(!store.register("pilot", "other").unwrap());
        assert!(store.authenticate("pilot", "secret"));
        assert!(!store.authenticate("pilot", "wrong"));
        assert!(!store.authenticate("ghost", "secret"));
    }

    #[test]
    fn test_unknown_player_gets_defaults() {
        let store = MemoryStore::new();
        let record = store.load("nobody");
        assert_eq!(record.best_score, 0);
        assert_eq!(record.points, 0);
        assert_eq!(record.highest_level, 1);
        assert_eq!(record.owned_weapons, vec![DEFAULT_WEAPON.to_string()]);
        assert_eq!(record.current_weapon, DEFAULT_WEAPON);
    }

    #[test]
    fn test_best_score_never_decreases() {
        let mut store = MemoryStore::new();
        store.register("pilot", "secret").unwrap();
        let mut record = store.load("pilot");
        record.best_score = 900;
        store.save(&record).unwrap();

        record.best_score = 100;
        record.points = 42;
        store.save(&record).unwrap();

        let stored = store.load("pilot");
        assert_eq!(stored.best_score, 900);
        assert_eq!(stored.points, 42);
        assert!(store.authenticate("pilot", "secret"));
    }

    #[test]
    fn test_list_all_sorted_by_best_score() {
        let mut store = MemoryStore::new();
        for (name, best) in [("a", 10), ("b", 300), ("c", 50)] {
            let mut record = PlayerRecord::new(name);
            record.best_score = best;
            store.save(&record).unwrap();
        }
        let names: Vec<_> = store.list_all().into_iter().map(|r| r.username).collect();
        assert_eq!(names, vec!["b", "c", "a"]);
    }

    #[test]
    fn test_failed_write_leaves_store_untouched() {
        let mut store = MemoryStore::new();
        store.fail_writes = true;
        let mut record = PlayerRecord::new("pilot");
        record.points = 10;
        assert!(store.save(&record).is_err());
        assert!(store.list_all().is_empty());
    }

    #[test]
    fn test_write_atomic_replaces_contents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("file.json");
        write_atomic(&path, b"first").unwrap();
        write_atomic(&path, b"second").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "second");
        // Only the target remains in the directory
        assert_eq!(std::fs::read_dir(path.parent().unwrap()).unwrap().count(), 1);
    }
}
