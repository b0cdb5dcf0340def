//! High score leaderboard and the persistence sink
//!
//! The game hands one `ScoreRecord` to a `ScoreSink` per finished run.
//! `HighScores` is the bundled sink: top 10 per variant, persisted to
//! LocalStorage on the web and to a JSON file natively.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};
use crate::sim::{ScoringResult, Variant};

/// Maximum number of high scores kept per variant
pub const MAX_HIGH_SCORES: usize = 10;

/// What a finished run reports to persistence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub variant: Variant,
    pub raw_score: u64,
    pub multiplier: f64,
    pub final_score: u64,
    /// Unix timestamp (ms) when achieved
    pub timestamp: f64,
}

impl ScoreRecord {
    pub fn new(variant: Variant, result: &ScoringResult, timestamp: f64) -> Self {
        Self {
            variant,
            raw_score: result.raw_score,
            multiplier: result.multiplier,
            final_score: result.final_score,
            timestamp,
        }
    }
}

/// Leaderboard-write capability
pub trait ScoreSink {
    fn submit(&mut self, record: &ScoreRecord) -> Result<()>;
}

/// Per-variant high score leaderboard
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct HighScores {
    /// All variants, each kept sorted descending by final score
    pub entries: Vec<ScoreRecord>,
    /// Backing file for native builds
    #[serde(skip)]
    path: Option<PathBuf>,
}

impl HighScores {
    /// LocalStorage key (used only in wasm32)
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "arcade_engine_highscores";

    /// Create empty leaderboard
    pub fn new() -> Self {
        Self::default()
    }

    /// Entries for one variant, best first
    pub fn entries_for(&self, variant: Variant) -> impl Iterator<Item = &ScoreRecord> {
        self.entries.iter().filter(move |e| e.variant == variant)
    }

    /// Check if a score qualifies for the variant's table
    pub fn qualifies(&self, variant: Variant, score: u64) -> bool {
        if score == 0 {
            return false;
        }
        let table: Vec<_> = self.entries_for(variant).collect();
        if table.len() < MAX_HIGH_SCORES {
            return true;
        }
        // Check if score beats the lowest entry
        table.last().map(|e| score > e.final_score).unwrap_or(true)
    }

    /// Get the rank a score would achieve (1-indexed, None if doesn't qualify)
    pub fn potential_rank(&self, variant: Variant, score: u64) -> Option<usize> {
        if !self.qualifies(variant, score) {
            return None;
        }
        let table: Vec<_> = self.entries_for(variant).collect();
        let rank = table.iter().position(|e| score > e.final_score);
        Some(rank.unwrap_or(table.len()) + 1)
    }

    /// Add a record (if it qualifies); returns the rank achieved
    pub fn add_record(&mut self, record: ScoreRecord) -> Option<usize> {
        let rank = self.potential_rank(record.variant, record.final_score)?;
        let variant = record.variant;

        let insert_at = self
            .entries
            .iter()
            .position(|e| e.variant == variant && record.final_score > e.final_score)
            .unwrap_or(self.entries.len());
        self.entries.insert(insert_at, record);

        // Trim the variant's table to max size
        let mut kept = 0;
        self.entries.retain(|e| {
            if e.variant != variant {
                return true;
            }
            kept += 1;
            kept <= MAX_HIGH_SCORES
        });

        Some(rank)
    }

    /// Best final score for a variant
    pub fn best_for(&self, variant: Variant) -> Option<u64> {
        self.entries_for(variant).next().map(|e| e.final_score)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Load high scores from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                if let Ok(scores) = serde_json::from_str::<HighScores>(&json) {
                    log::info!("Loaded {} high scores", scores.entries.len());
                    return scores;
                }
            }
        }

        log::info!("No high scores found, starting fresh");
        Self::new()
    }

    /// Save high scores to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) -> Result<()> {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten()
            .ok_or_else(|| EngineError::Persistence("LocalStorage unavailable".into()))?;
        let json = serde_json::to_string(self)?;
        storage
            .set_item(Self::STORAGE_KEY, &json)
            .map_err(|_| EngineError::Persistence("LocalStorage write rejected".into()))?;
        log::info!("High scores saved ({} entries)", self.entries.len());
        Ok(())
    }

    /// Load high scores from a JSON file, remembering the path for saves
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_from(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let mut scores = match std::fs::read_to_string(&path) {
            Ok(json) => {
                let scores: HighScores = serde_json::from_str(&json)?;
                log::info!("Loaded {} high scores", scores.entries.len());
                scores
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::info!("No high scores found, starting fresh");
                Self::new()
            }
            Err(e) => return Err(e.into()),
        };
        scores.path = Some(path);
        Ok(scores)
    }

    /// Write to the backing file; in-memory boards have nothing to do
    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
            .map_err(|e| EngineError::Persistence(format!("{}: {}", path.display(), e)))?;
        log::info!("High scores saved ({} entries)", self.entries.len());
        Ok(())
    }
}

impl ScoreSink for HighScores {
    fn submit(&mut self, record: &ScoreRecord) -> Result<()> {
        match self.add_record(record.clone()) {
            Some(rank) => {
                log::info!(
                    "New {} high score #{}: {}",
                    record.variant.as_str(),
                    rank,
                    record.final_score
                );
                self.save()
            }
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(variant: Variant, final_score: u64) -> ScoreRecord {
        ScoreRecord {
            variant,
            raw_score: final_score,
            multiplier: 1.0,
            final_score,
            timestamp: 0.0,
        }
    }

    #[test]
    fn test_zero_never_qualifies() {
        let scores = HighScores::new();
        assert!(!scores.qualifies(Variant::Runner, 0));
        assert!(scores.qualifies(Variant::Runner, 1));
    }

    #[test]
    fn test_tables_are_per_variant() {
        let mut scores = HighScores::new();
        assert_eq!(scores.add_record(record(Variant::Runner, 100)), Some(1));
        assert_eq!(scores.add_record(record(Variant::Shooter, 50)), Some(1));
        assert_eq!(scores.add_record(record(Variant::Runner, 300)), Some(1));
        assert_eq!(scores.add_record(record(Variant::Runner, 200)), Some(2));

        let runner: Vec<_> = scores.entries_for(Variant::Runner).map(|e| e.final_score).collect();
        assert_eq!(runner, vec![300, 200, 100]);
        assert_eq!(scores.best_for(Variant::Shooter), Some(50));
        assert_eq!(scores.best_for(Variant::Collector), None);
    }

    #[test]
    fn test_table_trimmed_to_max() {
        let mut scores = HighScores::new();
        for s in 1..=15 {
            scores.add_record(record(Variant::Collector, s * 10));
        }
        scores.add_record(record(Variant::Runner, 5));
        assert_eq!(scores.entries_for(Variant::Collector).count(), MAX_HIGH_SCORES);
        assert_eq!(scores.entries_for(Variant::Runner).count(), 1);
        assert!(!scores.qualifies(Variant::Collector, 60));
        assert_eq!(scores.potential_rank(Variant::Collector, 145), Some(2));
        assert_eq!(scores.add_record(record(Variant::Collector, 10)), None);
    }

    #[test]
    fn test_submit_in_memory_never_fails() {
        let mut scores = HighScores::new();
        let result = ScoringResult::compute(12_000, Variant::Collector);
        let rec = ScoreRecord::new(Variant::Collector, &result, 1.0);
        scores.submit(&rec).unwrap();
        assert_eq!(scores.best_for(Variant::Collector), Some(20_400));
    }

    #[test]
    fn test_file_round_trip() {
        let path = std::env::temp_dir().join(format!(
            "arcade_engine_scores_{}.json",
            std::process::id()
        ));
        let _ = std::fs::remove_file(&path);

        let mut scores = HighScores::load_from(&path).unwrap();
        assert!(scores.is_empty());
        scores.submit(&record(Variant::Shooter, 700)).unwrap();

        let reloaded = HighScores::load_from(&path).unwrap();
        assert_eq!(reloaded.best_for(Variant::Shooter), Some(700));
        let _ = std::fs::remove_file(&path);
    }
}
