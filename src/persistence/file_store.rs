//! JSON file store
//!
//! Layout: `{"version": 1, "players": [row, ...]}`. A bare array of rows
//! is read as version 0. Rows are kept in memory and the whole file is
//! rewritten atomically after every change; the in-memory copy is only
//! updated once the write succeeded.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::record::{PlayerRecord, PlayerRow};
use super::{PlayerRecordStore, Result, StoreError, ranked, upsert, write_atomic};

/// Current schema version
pub const SCHEMA_VERSION: u32 = 1;

#[derive(Serialize, Deserialize)]
struct Envelope {
    version: u32,
    players: Vec<PlayerRow>,
}

#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    rows: Vec<PlayerRow>,
    /// Set when the existing file could neither be read nor moved aside;
    /// writes are refused so it is never overwritten
    blocked: Option<String>,
}

impl JsonFileStore {
    /// Open the store at `path`. A missing file is an empty store; an
    /// undecodable one is moved aside to `<name>.corrupt` and treated as
    /// empty. If the file cannot be read at all the store opens empty and
    /// read-only.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let mut blocked = None;
        let rows = match fs::read(&path) {
            Ok(bytes) => match String::from_utf8(bytes).ok().and_then(|json| parse_rows(&json)) {
                Some(rows) => {
                    log::info!("Loaded {} players from {}", rows.len(), path.display());
                    rows
                }
                None => {
                    log::warn!("Player file {} is corrupt, starting fresh", path.display());
                    if let Err(e) = quarantine(&path) {
                        log::warn!("Could not move corrupt file aside: {}", e);
                        blocked = Some(format!(
                            "corrupt file {} could not be moved aside",
                            path.display()
                        ));
                    }
                    Vec::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::info!("No player file at {}, starting fresh", path.display());
                Vec::new()
            }
            Err(e) => {
                log::warn!("Failed to read {}: {}, writes disabled", path.display(), e);
                blocked = Some(format!("{} unreadable: {}", path.display(), e));
                Vec::new()
            }
        };
        Self {
            path,
            rows,
            blocked,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Add rows that do not clash with existing usernames. Returns how many were added.
    pub fn import_rows(&mut self, imported: Vec<PlayerRow>) -> Result<usize> {
        let mut rows = self.rows.clone();
        let mut added = 0;
        for row in imported {
            if row.username.is_empty() || rows.iter().any(|r| r.username == row.username) {
                continue;
            }
            rows.push(row);
            added += 1;
        }
        if added > 0 {
            self.commit(rows)?;
        }
        Ok(added)
    }

    /// Write `rows` to disk, then adopt them
    fn commit(&mut self, rows: Vec<PlayerRow>) -> Result<()> {
        if let Some(reason) = &self.blocked {
            return Err(StoreError::Unavailable(reason.clone()));
        }
        let envelope = Envelope {
            version: SCHEMA_VERSION,
            players: rows,
        };
        let json = serde_json::to_string_pretty(&envelope)?;
        write_atomic(&self.path, json.as_bytes())?;
        self.rows = envelope.players;
        Ok(())
    }
}

impl PlayerRecordStore for JsonFileStore {
    fn load(&self, username: &str) -> PlayerRecord {
        self.rows
            .iter()
            .find(|r| r.username == username)
            .map(PlayerRow::to_record)
            .unwrap_or_else(|| PlayerRecord::new(username))
    }

    fn save(&mut self, record: &PlayerRecord) -> Result<()> {
        let mut rows = self.rows.clone();
        upsert(&mut rows, record);
        self.commit(rows)
    }

    fn register(&mut self, username: &str, password: &str) -> Result<bool> {
        if self.rows.iter().any(|r| r.username == username) {
            return Ok(false);
        }
        let mut rows = self.rows.clone();
        rows.push(PlayerRow::from_record(&PlayerRecord::new(username), password));
        self.commit(rows)?;
        log::info!("Registered player {}", username);
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
        self.commit(Vec::new())?;
        log::info!("Player store reset");
        Ok(())
    }
}

/// Rows from either schema; `None` if the document is unusable. Individual
/// rows that fail to parse are skipped.
fn parse_rows(json: &str) -> Option<Vec<PlayerRow>> {
    let value: Value = serde_json::from_str(json).ok()?;
    let players = match value {
        Value::Array(players) => players,
        Value::Object(mut map) => {
            let version = map.get("version").and_then(Value::as_u64).unwrap_or(0);
            if version > SCHEMA_VERSION as u64 {
                log::warn!("Player file version {} is newer than {}", version, SCHEMA_VERSION);
            }
            match map.remove("players") {
                Some(Value::Array(players)) => players,
                _ => return None,
            }
        }
        _ => return None,
    };

    let mut rows: Vec<PlayerRow> = Vec::with_capacity(players.len());
    for player in players {
        match serde_json::from_value::<PlayerRow>(player) {
            Ok(row) if !row.username.is_empty() => {
                if rows.iter().any(|r| r.username == row.username) {
                    log::warn!("Duplicate player row '{}' ignored", row.username);
                } else {
                    rows.push(row);
                }
            }
            Ok(_) => log::warn!("Skipping player row without a name"),
            Err(e) => log::warn!("Skipping unreadable player row: {}", e),
        }
    }
    Some(rows)
}

fn quarantine(path: &Path) -> std::io::Result<()> {
    let mut aside = path.as_os_str().to_owned();
    aside.push(".corrupt");
    fs::rename(path, &aside)
}
