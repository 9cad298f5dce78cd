//! Cross-player leaderboard
//!
//! Built from the record store on demand, so it always reflects the
//! latest saved best scores.

use std::path::Path;

use serde::Serialize;

use crate::persistence::{PlayerRecordStore, StoreError};

/// Entries shown per leaderboard page
pub const PAGE_SIZE: usize = 6;

/// A single ranked player
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LeaderboardEntry {
    /// 1-based rank
    pub rank: usize,
    pub username: String,
    pub best_score: u64,
    pub points: u64,
    pub highest_level: u32,
}

/// Ranked players, best score first
#[derive(Debug, Clone, Default)]
pub struct Leaderboard {
    pub entries: Vec<LeaderboardEntry>,
}

impl Leaderboard {
    pub fn from_store(store: &dyn PlayerRecordStore) -> Self {
        let entries = store
            .list_all()
            .into_iter()
            .enumerate()
            .map(|(i, record)| LeaderboardEntry {
                rank: i + 1,
                username: record.username,
                best_score: record.best_score,
                points: record.points,
                highest_level: record.highest_level,
            })
            .collect();
        Self { entries }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get the top score (if any)
    pub fn top_score(&self) -> Option<u64> {
        self.entries.first().map(|e| e.best_score)
    }

    /// Number of pages (at least 1, even when empty)
    pub fn page_count(&self) -> usize {
        self.entries.len().div_ceil(PAGE_SIZE).max(1)
    }

    /// Entries on a 1-based page; empty past the end
    pub fn page(&self, page: usize) -> &[LeaderboardEntry] {
        let start = page.saturating_sub(1) * PAGE_SIZE;
        if start >= self.entries.len() {
            return &[];
        }
        let end = (start + PAGE_SIZE).min(self.entries.len());
        &self.entries[start..end]
    }

    pub fn rank_of(&self, username: &str) -> Option<usize> {
        self.entries
            .iter()
            .find(|e| e.username == username)
            .map(|e| e.rank)
    }

    /// Rank a score would take if it were saved now (1-indexed)
    pub fn potential_rank(&self, score: u64) -> usize {
        self.entries
            .iter()
            .position(|e| score > e.best_score)
            .unwrap_or(self.entries.len())
            + 1
    }

    /// Write the full ranking as CSV
    pub fn export_csv(&self, path: &Path) -> Result<usize, StoreError> {
        let mut writer = csv::Writer::from_path(path)?;
        for entry in &self.entries {
            writer.serialize(entry)?;
        }
        writer.flush()?;
        log::info!("Exported {} leaderboard entries to {}", self.entries.len(), path.display());
        Ok(self.entries.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::{MemoryStore, PlayerRecord};

    fn board(scores: &[(&str, u64)]) -> Leaderboard {
        let mut store = MemoryStore::new();
        for (name, best) in scores {
            let mut record = PlayerRecord::new(name);
            record.best_score = *best;
            store.save(&record).unwrap();
        }
        Leaderboard::from_store(&store)
    }

    #[test]
    fn test_ranks_follow_best_score() {
        let board = board(&[("low", 5), ("high", 500), ("mid", 50)]);
        assert_eq!(board.top_score(), Some(500));
        assert_eq!(board.rank_of("high"), Some(1));
        assert_eq!(board.rank_of("low"), Some(3));
        assert_eq!(board.rank_of("nobody"), None);
    }

    #[test]
    fn test_paging() {
        let names: Vec<String> = (0..8).map(|i| format!("p{}", i)).collect();
        let scores: Vec<(&str, u64)> = names
            .iter()
            .enumerate()
            .map(|(i, n)| (n.as_str(), i as u64))
            .collect();
        let board = board(&scores);
        assert_eq!(board.page_count(), 2);
        assert_eq!(board.page(1).len(), 6);
        assert_eq!(board.page(2).len(), 2);
        assert_eq!(board.page(2)[0].rank, 7);
        assert!(board.page(3).is_empty());

        assert_eq!(Leaderboard::default().page_count(), 1);
    }

    #[test]
    fn test_potential_rank() {
        let board = board(&[("a", 100), ("b", 50)]);
        assert_eq!(board.potential_rank(200), 1);
        assert_eq!(board.potential_rank(75), 2);
        assert_eq!(board.potential_rank(10), 3);
    }

    #[test]
    fn test_export_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ranking.csv");
        let board = board(&[("a", 100), ("b", 50)]);
        assert_eq!(board.export_csv(&path).unwrap(), 2);

        let text = std::fs::read_to_string(&path).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("rank,username,best_score,points,highest_level"));
        assert_eq!(lines.next(), Some("1,a,100,0,1"));
    }
}
