// entry.rs — One line of the audit trail.
//
// Entries are deliberately schema-light: `action` is the event name emitted by
// the workflow engine and `detail` holds the full event payload. Only the
// chaining fields are fixed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuditEntry {
    pub entry_id: Uuid,

    pub timestamp: DateTime<Utc>,

    /// User who triggered the transition. `None` for system actions.
    pub actor_id: Option<Uuid>,

    /// Event name, e.g. `activity_validated`.
    pub action: String,

    /// Record the action applied to (usually a progress id).
    pub subject_id: Option<Uuid>,

    #[serde(default)]
    pub detail: serde_json::Value,

    /// Hash of the previous line; `None` for the first entry.
    pub previous_hash: Option<String>,
}

impl AuditEntry {
    pub fn new(action: impl Into<String>) -> Self {
        Self {
            entry_id: Uuid::new_v4(),
            timestamp: Utc::now(),
            actor_id: None,
            action: action.into(),
            subject_id: None,
            detail: serde_json::Value::Null,
            previous_hash: None,
        }
    }

    pub fn by(mut self, actor_id: Uuid) -> Self {
        self.actor_id = Some(actor_id);
        self
    }

    pub fn on(mut self, subject_id: Uuid) -> Self {
        self.subject_id = Some(subject_id);
        self
    }

    pub fn with_detail(mut self, detail: serde_json::Value) -> Self {
        self.detail = detail;
        self
    }
}
