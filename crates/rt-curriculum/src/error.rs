// error.rs — Error types for the curriculum catalog.

use std::path::PathBuf;

use thiserror::Error;
use uuid::Uuid;

use crate::catalog::Track;

/// Errors that can occur while loading, validating or editing a curriculum.
#[derive(Debug, Error)]
pub enum CurriculumError {
    /// A file I/O operation failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A curriculum document is not valid JSON.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A YAML curriculum file could not be parsed.
    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// No phase with this id exists in the track.
    #[error("phase {phase_id} not found in the {track} curriculum")]
    PhaseNotFound { track: Track, phase_id: Uuid },

    /// The catalog breaks one of its structural rules.
    #[error("invalid {track} curriculum: {reason}")]
    Invalid { track: Track, reason: String },
}
