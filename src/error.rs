//! Error types for the edges of the game: config loading, map generation and
//! the terminal session. Gameplay itself never fails; rejected moves and
//! placements are plain no-ops.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid config value for `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

#[derive(Debug, Error)]
pub enum MapError {
    #[error("grid has {available} floor cells but {needed} are required")]
    NotEnoughFloor { available: usize, needed: usize },

    #[error("no usable layout after {attempts} attempts")]
    Exhausted { attempts: u32 },
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("terminal I/O error: {0}")]
    Terminal(#[from] std::io::Error),

    #[error("failed to read input script {path}: {source}")]
    Script {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
