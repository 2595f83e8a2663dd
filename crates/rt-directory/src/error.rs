// error.rs — Error types for the user directory.

use std::path::PathBuf;

use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur while registering or loading users.
#[derive(Debug, Error)]
pub enum DirectoryError {
    /// A file I/O operation failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to serialize/deserialize a user record.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The requested user does not exist.
    #[error("user not found: {0}")]
    NotFound(Uuid),

    /// The user record is incomplete or inconsistent with its role.
    #[error("invalid user '{email}': {reason}")]
    InvalidUser { email: String, reason: String },

    /// Another user already registered this e-mail.
    #[error("e-mail already registered: {0}")]
    DuplicateEmail(String),
}
