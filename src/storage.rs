//! Best completion time per difficulty.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::Difficulty;
use crate::error::StorageError;

/// Namespaced key the records are stored under.
pub const STORAGE_KEY: &str = "tar-souls.best-times";

/// `{difficulty: milliseconds}`. Lower is better.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BestTimes(BTreeMap<Difficulty, u64>);

impl BestTimes {
    pub fn get(&self, difficulty: Difficulty) -> Option<u64> {
        self.0.get(&difficulty).copied()
    }

    /// Keeps `time_ms` if it beats the stored record. Returns whether it did.
    pub fn record(&mut self, difficulty: Difficulty, time_ms: u64) -> bool {
        match self.0.get(&difficulty) {
            Some(&best) if best <= time_ms => false,
            _ => {
                self.0.insert(difficulty, time_ms);
                true
            }
        }
    }
}

pub trait BestTimeStore {
    fn load(&self) -> Result<BestTimes, StorageError>;
    fn save(&mut self, times: &BestTimes) -> Result<(), StorageError>;

    /// Loads, offers `time_ms`, and saves when it set a new record.
    fn submit(&mut self, difficulty: Difficulty, time_ms: u64) -> Result<bool, StorageError> {
        let mut times = self.load()?;
        let improved = times.record(difficulty, time_ms);
        if improved {
            self.save(&times)?;
        }
        Ok(improved)
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    times: BestTimes,
}

impl BestTimeStore for MemoryStore {
    fn load(&self) -> Result<BestTimes, StorageError> {
        Ok(self.times.clone())
    }

    fn save(&mut self, times: &BestTimes) -> Result<(), StorageError> {
        self.times = times.clone();
        Ok(())
    }
}

/// JSON file named after [`STORAGE_KEY`] inside a data directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            path: dir.as_ref().join(format!("{STORAGE_KEY}.json")),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl BestTimeStore for FileStore {
    fn load(&self) -> Result<BestTimes, StorageError> {
        match fs::read_to_string(&self.path) {
            Ok(text) => Ok(serde_json::from_str(&text)?),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No best-time file yet");
                Ok(BestTimes::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    fn save(&mut self, times: &BestTimes) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let text = serde_json::to_string_pretty(times)?;
        fs::write(&self.path, text)?;
        info!(path = %self.path.display(), "Saved best times");
        Ok(())
    }
}
