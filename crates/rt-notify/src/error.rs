// error.rs — Error types for notification storage and fan-out.

use std::path::PathBuf;

use rt_directory::DirectoryError;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum NotifyError {
    /// A file I/O operation failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("notification not found: {0}")]
    NotFound(Uuid),

    /// Someone other than the recipient tried to change a notification.
    #[error("notification {notification_id} does not belong to user {user_id}")]
    NotRecipient { notification_id: Uuid, user_id: Uuid },

    /// Recipient lookup failed.
    #[error(transparent)]
    Directory(#[from] DirectoryError),
}
