use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

/// Where the best score survives between runs.
///
/// Implementations never fail the game: a store that can't read reports 0,
/// and one that can't write keeps going without persisting.
pub trait HighScoreStore {
    fn load(&mut self) -> u32;
    fn save(&mut self, high_score: u32);
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct HighScoreRecord {
    high_score: u32,
}

/// JSON file store, e.g. `{"high_score": 120}`.
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileStore { path: path.into() }
    }

    fn read(&self) -> Result<u32> {
        let raw = fs::read_to_string(&self.path)
            .with_context(|| format!("reading {}", self.path.display()))?;
        let record: HighScoreRecord = serde_json::from_str(&raw)
            .with_context(|| format!("parsing {}", self.path.display()))?;
        Ok(record.high_score)
    }

    fn write(&self, high_score: u32) -> Result<()> {
        let raw = serde_json::to_string(&HighScoreRecord { high_score })?;
        fs::write(&self.path, raw).with_context(|| format!("writing {}", self.path.display()))
    }
}

impl HighScoreStore for FileStore {
    fn load(&mut self) -> u32 {
        if !self.path.exists() {
            debug!("No high score file at {}, starting from 0", self.path.display());
            return 0;
        }

        match self.read() {
            Ok(score) => score,
            Err(e) => {
                warn!("Error loading high score: {:#}", e);
                0
            }
        }
    }

    fn save(&mut self, high_score: u32) {
        if let Err(e) = self.write(high_score) {
            warn!("Error saving high score, keeping it in memory only: {:#}", e);
        }
    }
}

/// Keeps the high score for the lifetime of the process only.
#[derive(Default)]
pub struct MemoryStore {
    high_score: u32,
}

impl HighScoreStore for MemoryStore {
    fn load(&mut self) -> u32 {
        self.high_score
    }

    fn save(&mut self, high_score: u32) {
        self.high_score = high_score;
    }
}
