//! Centralized error types for the game.
//!
//! Nothing on the per-tick path returns these. They cover setup work: loading the difficulty
//! table, reading bundled assets and touching the best-time store.

use std::io;

use crate::config::Difficulty;

/// Main error type for the game.
///
/// This is the primary error type that should be used in public APIs.
#[derive(thiserror::Error, Debug)]
pub enum GameError {
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Asset error: {0}")]
    Asset(#[from] AssetError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Logging setup failed: {0}")]
    Logging(String),
}

#[derive(thiserror::Error, Debug)]
pub enum AssetError {
    #[error("Asset not found: {0}")]
    NotFound(String),

    #[error("Asset is not valid UTF-8: {0}")]
    Encoding(String),
}

/// Errors raised while loading or validating difficulty profiles.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("Malformed difficulty table: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("No profile defined for difficulty '{0}'")]
    MissingProfile(Difficulty),

    #[error("Invalid profile '{difficulty}': {reason}")]
    InvalidProfile { difficulty: Difficulty, reason: String },
}

/// Errors raised by best-time persistence.
#[derive(thiserror::Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Corrupt best-time record: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Result type for game operations.
pub type GameResult<T> = Result<T, GameError>;
