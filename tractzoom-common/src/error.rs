//! Common error types for tractzoom

use std::path::PathBuf;
use thiserror::Error;

/// Common result type for tractzoom operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the tractzoom pipeline
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encode/decode error (wraps serde_json::Error)
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV read error (wraps csv::Error)
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// TOML parse error (wraps toml::de::Error)
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration loading, validation, or bucketing precondition error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Required column or property missing or ill-typed
    #[error("Schema error: {0}")]
    Schema(String),

    /// Upstream contract violation (empty geometry, duplicate id, ...)
    #[error("Data integrity error: {0}")]
    DataIntegrity(String),

    /// One output artifact failed to write
    #[error("Failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: Box<Error>,
    },

    /// Both output artifacts failed to write
    #[error("{} output writes failed: {}", .0.len(), join_errors(.0))]
    WriteFailures(Vec<Error>),
}

fn join_errors(errors: &[Error]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}
