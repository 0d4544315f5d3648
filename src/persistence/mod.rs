//! Best-effort save data
//!
//! A flat record of lifetime totals. Loading never fails: missing files,
//! malformed JSON and absent keys all fall back to defaults. The simulation
//! only ever hands over a [`RunSummary`] at game over.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{GameError, Result};
use crate::sim::RunSummary;

/// Lifetime totals across runs
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SaveData {
    pub high_score: u64,
    /// Seconds
    pub total_play_time: f64,
    pub games_played: u32,
    pub enemies_killed: u64,
    pub power_ups_collected: u64,
    pub highest_wave: u32,
    pub highest_level: u32,
}

impl SaveData {
    /// Fold a finished run in; returns true when it set a new high score
    pub fn record_run(&mut self, run: &RunSummary) -> bool {
        self.total_play_time += run.play_time as f64;
        self.games_played += 1;
        self.enemies_killed += run.enemies_killed as u64;
        self.power_ups_collected += run.power_ups_collected as u64;
        self.highest_wave = self.highest_wave.max(run.wave);
        self.highest_level = self.highest_level.max(run.level);

        if run.score > self.high_score {
            self.high_score = run.score;
            return true;
        }
        false
    }
}

/// Storage backend for [`SaveData`]
pub trait SaveStore {
    /// Load, merging with defaults; never fails
    fn load(&self) -> SaveData;

    fn save(&mut self, data: &SaveData) -> Result<()>;
}

/// JSON file on disk
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SaveStore for JsonFileStore {
    fn load(&self) -> SaveData {
        let json = match std::fs::read_to_string(&self.path) {
            Ok(json) => json,
            Err(_) => {
                log::info!("No save data found, starting fresh");
                return SaveData::default();
            }
        };
        match serde_json::from_str::<SaveData>(&json) {
            Ok(data) => {
                log::info!("Loaded save data (high score {})", data.high_score);
                data
            }
            Err(e) => {
                log::warn!("Malformed save data in {}: {e}", self.path.display());
                SaveData::default()
            }
        }
    }

    fn save(&mut self, data: &SaveData) -> Result<()> {
        let json =
            serde_json::to_string_pretty(data).map_err(|e| GameError::Persistence(e.to_string()))?;
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir).map_err(|e| GameError::Persistence(e.to_string()))?;
        }
        std::fs::write(&self.path, json).map_err(|e| GameError::Persistence(e.to_string()))?;
        log::info!("Save data written to {}", self.path.display());
        Ok(())
    }
}

/// In-memory store (tests and headless runs without disk)
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    data: Option<SaveData>,
}

impl SaveStore for MemoryStore {
    fn load(&self) -> SaveData {
        self.data.clone().unwrap_or_default()
    }

    fn save(&mut self, data: &SaveData) -> Result<()> {
        self.data = Some(data.clone());
        Ok(())
    }
}

/// Load, fold in `run` and save. Save failures are logged and swallowed.
/// Returns true when the run set a new high score.
pub fn record_run(store: &mut impl SaveStore, run: &RunSummary) -> bool {
    let mut data = store.load();
    let new_high = data.record_run(run);
    if let Err(e) = store.save(&data) {
        log::warn!("Could not save run: {e}");
    }
    new_high
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(score: u64) -> RunSummary {
        RunSummary {
            score,
            wave: 3,
            play_time: 60.0,
            enemies_killed: 12,
            power_ups_collected: 2,
            level: 2,
        }
    }

    #[test]
    fn test_record_run_tracks_high_score() {
        let mut data = SaveData::default();
        assert!(data.record_run(&run(100)));
        assert!(!data.record_run(&run(50)));
        assert!(!data.record_run(&run(100)));
        assert_eq!(data.high_score, 100);
        assert_eq!(data.games_played, 3);
        assert_eq!(data.enemies_killed, 36);
        assert_eq!(data.highest_wave, 3);
        assert!((data.total_play_time - 180.0).abs() < 1e-9);
    }

    #[test]
    fn test_partial_record_merges_with_defaults() {
        let data: SaveData = serde_json::from_str(r#"{"highScore": 420, "bogus": true}"#).unwrap();
        assert_eq!(data.high_score, 420);
        assert_eq!(data.games_played, 0);
    }

    #[test]
    fn test_memory_store_round() {
        let mut store = MemoryStore::default();
        assert_eq!(store.load(), SaveData::default());
        assert!(record_run(&mut store, &run(10)));
        assert!(!record_run(&mut store, &run(5)));
        assert_eq!(store.load().games_played, 2);
    }

    #[test]
    fn test_file_store_survives_corruption() {
        let dir = std::env::temp_dir().join(format!("space-survivor-save-{}", std::process::id()));
        let path = dir.join("save.json");
        let mut store = JsonFileStore::new(&path);

        assert_eq!(store.load(), SaveData::default());
        assert!(record_run(&mut store, &run(77)));
        assert_eq!(store.load().high_score, 77);

        std::fs::write(&path, "{ truncated").unwrap();
        assert_eq!(store.load(), SaveData::default());

        std::fs::remove_dir_all(&dir).ok();
    }
}
