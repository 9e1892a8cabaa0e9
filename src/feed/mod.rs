pub mod live_data;
pub mod types;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use types::GameInput;

/// Supplies fully materialized games to the engine. Implementations own all
/// fetching, caching and retry policy.
pub trait GameSource: Sync {
    fn game_ids_for_date(&self, date: NaiveDate) -> Result<Vec<String>>;
    fn load_game(&self, game_id: &str, date: NaiveDate) -> Result<GameInput>;
}

/// Serves games already held in memory.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    games: Vec<GameInput>,
}

impl MemorySource {
    pub fn new(games: Vec<GameInput>) -> Self {
        Self { games }
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        let mut dates: Vec<NaiveDate> = self.games.iter().map(|g| g.date).collect();
        dates.sort();
        dates.dedup();
        dates
    }
}

impl GameSource for MemorySource {
    fn game_ids_for_date(&self, date: NaiveDate) -> Result<Vec<String>> {
        Ok(self
            .games
            .iter()
            .filter(|g| g.date == date)
            .map(|g| g.game_id.clone())
            .collect())
    }

    fn load_game(&self, game_id: &str, date: NaiveDate) -> Result<GameInput> {
        self.games
            .iter()
            .find(|g| g.game_id == game_id && g.date == date)
            .cloned()
            .with_context(|| format!("game {game_id} on {date} not found"))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ManifestEntry {
    pub game_id: String,
    pub date: NaiveDate,
    pub playbyplay: PathBuf,
    pub boxscore: PathBuf,
}

/// Reads live-data documents from disk, as listed in a JSON manifest.
/// Paths in the manifest are relative to the manifest's directory.
#[derive(Debug, Clone)]
pub struct ManifestSource {
    root: PathBuf,
    entries: Vec<ManifestEntry>,
}

impl ManifestSource {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read manifest: {}", path.display()))?;
        let entries: Vec<ManifestEntry> = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse manifest: {}", path.display()))?;
        let root = path.parent().map(Path::to_path_buf).unwrap_or_default();
        Ok(Self { root, entries })
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        let mut dates: Vec<NaiveDate> = self.entries.iter().map(|e| e.date).collect();
        dates.sort();
        dates.dedup();
        dates
    }
}

impl GameSource for ManifestSource {
    fn game_ids_for_date(&self, date: NaiveDate) -> Result<Vec<String>> {
        Ok(self
            .entries
            .iter()
            .filter(|e| e.date == date)
            .map(|e| e.game_id.clone())
            .collect())
    }

    fn load_game(&self, game_id: &str, date: NaiveDate) -> Result<GameInput> {
        let entry = self
            .entries
            .iter()
            .find(|e| e.game_id == game_id && e.date == date)
            .with_context(|| format!("game {game_id} on {date} not in manifest"))?;
        let pbp_path = self.root.join(&entry.playbyplay);
        let box_path = self.root.join(&entry.boxscore);
        let pbp = std::fs::read_to_string(&pbp_path)
            .with_context(|| format!("Failed to read {}", pbp_path.display()))?;
        let boxscore = std::fs::read_to_string(&box_path)
            .with_context(|| format!("Failed to read {}", box_path.display()))?;
        live_data::game_input_from_live_data(game_id, date, &pbp, &boxscore)
    }
}
