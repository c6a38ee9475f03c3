//! Error taxonomy for the batch engine.
//!
//! Only [`RunError`] aborts a run. Per-item [`GenerationError`]s are caught at
//! the item boundary and [`PersistenceError`]s raised mid-run degrade to
//! in-memory tracking.

use std::path::PathBuf;

/// The work source could not produce a usable item list.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("Failed to read source {path}: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed source {path}: {reason}")]
    Malformed { path: PathBuf, reason: String },

    #[error("No items found in {path}")]
    Empty { path: PathBuf },
}

/// The progress store could not be read or written.
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("Failed to read progress file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write progress file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Progress file {path} is corrupt: {reason}")]
    Corrupt { path: PathBuf, reason: String },
}

/// A single generation attempt failed.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    /// The generation service could not be reached.
    #[error("Connection error: {0}")]
    Connection(String),

    /// The service answered but produced no usable artifact.
    #[error("Generation failed: {0}")]
    Generation(String),

    /// The reported artifact path exists neither as given nor under any
    /// fallback cache root.
    #[error("Generated file not found at {} or in {} fallback location(s)", reported.display(), searched.len())]
    LocationUnresolved {
        reported: PathBuf,
        searched: Vec<PathBuf>,
    },
}

/// Reasons a run ends in the Aborted state.
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error(transparent)]
    Source(#[from] ParseError),

    #[error("Progress store unusable: {0}")]
    Persistence(#[from] PersistenceError),

    #[error("Failed to prepare output directory {path}: {source}")]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
