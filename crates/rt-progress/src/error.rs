// error.rs — Error taxonomy for the progress workflow.
//
// Domain errors carry the HTTP status a request handler should answer with:
//   400 — precondition failed (wrong state, missing required field)
//   403 — caller lacks the role or scope
//   404 — unknown record or activity index
//   500 — storage and other infrastructure failures

use std::path::PathBuf;

use rt_audit::AuditError;
use rt_curriculum::CurriculumError;
use rt_directory::DirectoryError;
use rt_notify::NotifyError;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum ProgressError {
    /// A guard on the current state or the request payload failed.
    #[error("{0}")]
    Precondition(String),

    /// A phase-level transition the state machine does not allow.
    #[error("invalid transition from {from} to {to} for progress {progress_id}: {reason}")]
    InvalidTransition {
        progress_id: Uuid,
        from: String,
        to: String,
        reason: String,
    },

    /// The caller's role or scope does not permit the operation.
    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("{0} not found")]
    NotFound(String),

    /// A file I/O operation failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// tracker.toml could not be read or parsed.
    #[error("invalid configuration at {path}: {reason}")]
    Config { path: PathBuf, reason: String },

    #[error(transparent)]
    Curriculum(#[from] CurriculumError),

    #[error(transparent)]
    Directory(#[from] DirectoryError),

    #[error(transparent)]
    Notify(#[from] NotifyError),

    #[error(transparent)]
    Audit(#[from] AuditError),
}

impl ProgressError {
    pub fn precondition(reason: impl Into<String>) -> Self {
        ProgressError::Precondition(reason.into())
    }

    pub fn forbidden(reason: impl Into<String>) -> Self {
        ProgressError::Forbidden(reason.into())
    }

    /// HTTP status for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            ProgressError::Precondition(_) | ProgressError::InvalidTransition { .. } => 400,
            ProgressError::Forbidden(_) => 403,
            ProgressError::NotFound(_) => 404,
            ProgressError::Curriculum(e) => curriculum_status(e),
            ProgressError::Directory(e) => directory_status(e),
            ProgressError::Notify(e) => match e {
                NotifyError::NotFound(_) => 404,
                NotifyError::NotRecipient { .. } => 403,
                NotifyError::Directory(inner) => directory_status(inner),
                _ => 500,
            },
            ProgressError::Io { .. }
            | ProgressError::Serialization(_)
            | ProgressError::Config { .. }
            | ProgressError::Audit(_) => 500,
        }
    }

    /// Whether this is a domain error (4xx) rather than an infrastructure failure.
    pub fn is_domain(&self) -> bool {
        self.status_code() < 500
    }
}

fn curriculum_status(e: &CurriculumError) -> u16 {
    match e {
        CurriculumError::PhaseNotFound { .. } => 404,
        CurriculumError::Invalid { .. } => 400,
        _ => 500,
    }
}

fn directory_status(e: &DirectoryError) -> u16 {
    match e {
        DirectoryError::NotFound(_) => 404,
        DirectoryError::InvalidUser { .. } | DirectoryError::DuplicateEmail(_) => 400,
        _ => 500,
    }
}
