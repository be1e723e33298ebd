//! Engine Errors
//!
//! Recoverable failures only. Programmer errors (unregistered colliders,
//! unconfigured scenes, popping an empty stack) panic at the call site.

use std::path::PathBuf;

/// Degenerate or unreadable configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A dimension that must be strictly positive was zero or negative.
    #[error("{field} must be positive, got {value}")]
    NonPositive {
        /// Offending field name.
        field: &'static str,
        /// Value supplied.
        value: i64,
    },

    /// Camera dead-zone margin below zero.
    #[error("camera_deadzone_margin must not be negative, got {0}")]
    NegativeMargin(i32),

    /// Key repeat interval is negative, NaN or infinite.
    #[error("move_interval_secs must be finite and non-negative, got {0}")]
    InvalidMoveInterval(f64),

    /// Config file could not be read.
    #[error("failed to read config {}: {source}", path.display())]
    Io {
        /// File that failed.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Config text is not valid JSON for `EngineConfig`.
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Save snapshot read/write failure.
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    /// Filesystem failure.
    #[error("save IO error at {}: {source}", path.display())]
    Io {
        /// File or directory involved.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Snapshot could not be encoded or decoded.
    #[error("save data is malformed: {0}")]
    Json(#[from] serde_json::Error),

    /// No save with the requested name exists.
    #[error("no save named '{0}'")]
    NotFound(String),

    /// Save name is empty or would leave the save directory.
    #[error("invalid save name '{0}'")]
    InvalidName(String),
}

/// Top-level engine error.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration rejected.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Persistence collaborator failed.
    #[error("Persistence error: {0}")]
    Persistence(#[from] PersistenceError),

    /// The loop was started with no scene registered.
    #[error("Scene stack is empty")]
    EmptySceneStack,
}
