// notification.rs — Notification data model.
//
// A notification is written once and never edited afterwards, apart from
// its `read` flag. `related` points back at the record that caused it so a
// later review can clear every notification about the same progress record.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Why a notification was sent. Serialized with the wire names the web
/// client filters on.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum NotificationKind {
    /// A trainee submitted work that needs review.
    #[serde(rename = "validacion")]
    Validation,
    /// A reviewer rejected submitted work.
    #[serde(rename = "rechazo")]
    Rejection,
    /// Every activity of a phase was validated.
    #[serde(rename = "fase_validada")]
    PhaseValidated,
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NotificationKind::Validation => "validacion",
            NotificationKind::Rejection => "rechazo",
            NotificationKind::PhaseValidated => "fase_validada",
        };
        f.write_str(name)
    }
}

/// The record a notification is about.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RelatedEntity {
    pub kind: String,
    pub id: Uuid,
}

impl RelatedEntity {
    pub const PROGRESS: &'static str = "progreso";

    pub fn progress(id: Uuid) -> Self {
        Self {
            kind: Self::PROGRESS.to_string(),
            id,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Notification {
    pub id: Uuid,
    pub recipient_id: Uuid,
    pub kind: NotificationKind,
    pub message: String,
    /// Web path the client opens when the notification is clicked.
    pub link: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related: Option<RelatedEntity>,
    #[serde(default)]
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn new(
        recipient_id: Uuid,
        kind: NotificationKind,
        message: impl Into<String>,
        link: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            recipient_id,
            kind,
            message: message.into(),
            link: link.into(),
            related: None,
            read: false,
            created_at: Utc::now(),
        }
    }

    pub fn about(mut self, related: RelatedEntity) -> Self {
        self.related = Some(related);
        self
    }

    pub fn is_about(&self, related: &RelatedEntity) -> bool {
        self.related.as_ref() == Some(related)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_uses_wire_names() {
        assert_eq!(
            serde_json::to_string(&NotificationKind::Validation).unwrap(),
            "\"validacion\""
        );
        assert_eq!(
            serde_json::to_string(&NotificationKind::Rejection).unwrap(),
            "\"rechazo\""
        );
        assert_eq!(NotificationKind::PhaseValidated.to_string(), "fase_validada");
    }

    #[test]
    fn new_notification_is_unread() {
        let n = Notification::new(Uuid::new_v4(), NotificationKind::Rejection, "msg", "/progreso");
        assert!(!n.read);
        assert!(n.related.is_none());
    }

    #[test]
    fn related_entity_matching() {
        let id = Uuid::new_v4();
        let n = Notification::new(Uuid::new_v4(), NotificationKind::Validation, "m", "/l")
            .about(RelatedEntity::progress(id));
        assert!(n.is_about(&RelatedEntity::progress(id)));
        assert!(!n.is_about(&RelatedEntity::progress(Uuid::new_v4())));

        let json = serde_json::to_string(&n).unwrap();
        assert!(json.contains("\"progreso\""));
    }
}
