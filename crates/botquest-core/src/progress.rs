//! The progress store — one best-result record per level, with unlock
//! gating and binary save/load.
//!
//! Uses bincode for the persisted form; the save carries a version number
//! that is checked on load.

use std::collections::BTreeMap;
use std::io::{Read, Write};

use serde::{Deserialize, Serialize};

use botquest_logic::scoring::RunResult;

use crate::catalog::LevelCatalog;

/// Version number for the save format (increment when the format changes).
const SAVE_VERSION: u32 = 1;

/// The persisted record for one level.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LevelProgress {
    pub completed: bool,
    pub best_stars: u8,
    pub best_blocks: Option<u32>,
    pub best_time_secs: Option<f32>,
    pub play_count: u32,
    pub total_xp: u32,
    pub total_sparks: u32,
}

/// Best-result-per-level ledger. The only state that outlives a run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProgressStore {
    levels: BTreeMap<u32, LevelProgress>,
}

#[derive(Serialize, Deserialize)]
struct SaveData {
    version: u32,
    levels: BTreeMap<u32, LevelProgress>,
}

impl ProgressStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, level_id: u32) -> Option<&LevelProgress> {
        self.levels.get(&level_id)
    }

    /// Record a terminal outcome. Every run counts a play and banks its
    /// rewards; bests are merged only from completed runs.
    pub fn record(&mut self, level_id: u32, result: &RunResult) {
        let entry = self.levels.entry(level_id).or_default();
        entry.play_count += 1;
        entry.total_xp += result.xp_earned;
        entry.total_sparks += result.sparks_earned;
        if result.completed {
            entry.completed = true;
            entry.best_stars = entry.best_stars.max(result.stars);
            entry.best_blocks = Some(match entry.best_blocks {
                Some(best) => best.min(result.blocks_used),
                None => result.blocks_used,
            });
            entry.best_time_secs = Some(match entry.best_time_secs {
                Some(best) => best.min(result.time_spent_secs),
                None => result.time_spent_secs,
            });
        }
    }

    /// The first catalog level is always unlocked; every later one
    /// unlocks when its predecessor is completed.
    pub fn is_unlocked(&self, level_id: u32, catalog: &LevelCatalog) -> bool {
        match catalog.index_of(level_id) {
            Some(0) => true,
            Some(i) => {
                let prev_id = catalog.levels()[i - 1].id;
                self.get(prev_id).map(|p| p.completed).unwrap_or(false)
            }
            None => false,
        }
    }

    /// Save the store to a writer.
    pub fn save<W: Write>(&self, writer: W) -> Result<(), SaveError> {
        let data = SaveData {
            version: SAVE_VERSION,
            levels: self.levels.clone(),
        };
        bincode::serialize_into(writer, &data)?;
        Ok(())
    }

    /// Load a store from a reader.
    pub fn load<R: Read>(reader: R) -> Result<Self, SaveError> {
        let data: SaveData = bincode::deserialize_from(reader)?;
        if data.version != SAVE_VERSION {
            return Err(SaveError::VersionMismatch {
                expected: SAVE_VERSION,
                found: data.version,
            });
        }
        Ok(Self {
            levels: data.levels,
        })
    }
}

/// Errors that can occur during save/load.
#[derive(Debug)]
pub enum SaveError {
    Io(std::io::Error),
    Bincode(Box<bincode::ErrorKind>),
    VersionMismatch { expected: u32, found: u32 },
}

impl From<std::io::Error> for SaveError {
    fn from(e: std::io::Error) -> Self {
        SaveError::Io(e)
    }
}

impl From<Box<bincode::ErrorKind>> for SaveError {
    fn from(e: Box<bincode::ErrorKind>) -> Self {
        SaveError::Bincode(e)
    }
}

impl std::fmt::Display for SaveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SaveError::Io(e) => write!(f, "IO error: {}", e),
            SaveError::Bincode(e) => write!(f, "Serialization error: {}", e),
            SaveError::VersionMismatch { expected, found } => {
                write!(
                    f,
                    "Save version mismatch: expected {}, found {}",
                    expected, found
                )
            }
        }
    }
}

impl std::error::Error for SaveError {}
