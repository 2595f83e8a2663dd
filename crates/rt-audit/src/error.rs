// error.rs — Error types for the audit trail.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuditError {
    /// The audit file could not be opened or created.
    #[error("failed to open audit trail at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Reading or appending a line failed.
    #[error("audit trail I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// A line is not a valid audit entry.
    #[error("serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// An entry does not link to the hash of the line before it.
    #[error("hash chain broken at line {line}: expected {expected}, found {actual}")]
    IntegrityViolation {
        line: usize,
        expected: String,
        actual: String,
    },
}
