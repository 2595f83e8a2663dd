// store.rs — NotificationStore: one JSON file per notification.
//
// Layout: `<notifications_dir>/<notification_id>.json`.
//
// Mark-read operations only rewrite files whose `read` flag is still false,
// so running them twice changes nothing the second time.

use std::fs;
use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::error::NotifyError;
use crate::notification::{Notification, RelatedEntity};

pub struct NotificationStore {
    dir: PathBuf,
}

impl NotificationStore {
    /// Open a store backed by the given directory, creating it if needed.
    pub fn new(dir: impl AsRef<Path>) -> Result<Self, NotifyError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir).map_err(|source| NotifyError::Io {
            path: dir.clone(),
            source,
        })?;
        Ok(Self { dir })
    }

    pub fn save(&self, notification: &Notification) -> Result<(), NotifyError> {
        let path = self.notification_file(notification.id);
        let json = serde_json::to_string_pretty(notification)?;
        fs::write(&path, json).map_err(|source| NotifyError::Io { path, source })?;
        Ok(())
    }

    pub fn get(&self, notification_id: Uuid) -> Result<Option<Notification>, NotifyError> {
        let path = self.notification_file(notification_id);
        if !path.exists() {
            return Ok(None);
        }
        let json = fs::read_to_string(&path).map_err(|source| NotifyError::Io {
            path: path.clone(),
            source,
        })?;
        Ok(Some(serde_json::from_str(&json)?))
    }

    /// Every stored notification, newest first.
    pub fn list(&self) -> Result<Vec<Notification>, NotifyError> {
        let mut notifications = Vec::new();
        let entries = fs::read_dir(&self.dir).map_err(|source| NotifyError::Io {
            path: self.dir.clone(),
            source,
        })?;

        for entry in entries {
            let entry = entry.map_err(|source| NotifyError::Io {
                path: self.dir.clone(),
                source,
            })?;
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                let json = fs::read_to_string(&path).map_err(|source| NotifyError::Io {
                    path: path.clone(),
                    source,
                })?;
                match serde_json::from_str::<Notification>(&json) {
                    Ok(notification) => notifications.push(notification),
                    Err(e) => {
                        tracing::warn!(path = %path.display(), error = %e, "skipping unreadable notification file")
                    }
                }
            }
        }

        notifications.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(notifications)
    }

    /// Inbox of one user, newest first.
    pub fn list_for(&self, recipient_id: Uuid, unread_only: bool) -> Result<Vec<Notification>, NotifyError> {
        Ok(self
            .list()?
            .into_iter()
            .filter(|n| n.recipient_id == recipient_id && (!unread_only || !n.read))
            .collect())
    }

    pub fn unread_count(&self, recipient_id: Uuid) -> Result<usize, NotifyError> {
        Ok(self.list_for(recipient_id, true)?.len())
    }

    /// Mark one notification read on behalf of its recipient.
    ///
    /// Returns `false` when it was already read.
    pub fn mark_read(&self, notification_id: Uuid, user_id: Uuid) -> Result<bool, NotifyError> {
        let mut notification = self
            .get(notification_id)?
            .ok_or(NotifyError::NotFound(notification_id))?;
        if notification.recipient_id != user_id {
            return Err(NotifyError::NotRecipient {
                notification_id,
                user_id,
            });
        }
        if notification.read {
            return Ok(false);
        }
        notification.read = true;
        self.save(&notification)?;
        Ok(true)
    }

    /// Mark every unread notification of a user read. Returns how many changed.
    pub fn mark_all_read(&self, recipient_id: Uuid) -> Result<usize, NotifyError> {
        self.mark_where(|n| n.recipient_id == recipient_id)
    }

    /// Mark read every unread notification about `related` addressed to one of
    /// `recipients`. Returns how many changed.
    pub fn mark_related_read(
        &self,
        related: &RelatedEntity,
        recipients: &[Uuid],
    ) -> Result<usize, NotifyError> {
        self.mark_where(|n| n.is_about(related) && recipients.contains(&n.recipient_id))
    }

    fn mark_where(&self, predicate: impl Fn(&Notification) -> bool) -> Result<usize, NotifyError> {
        let mut changed = 0;
        for mut notification in self.list()? {
            if !notification.read && predicate(&notification) {
                notification.read = true;
                self.save(&notification)?;
                changed += 1;
            }
        }
        Ok(changed)
    }

    fn notification_file(&self, notification_id: Uuid) -> PathBuf {
        self.dir.join(format!("{}.json", notification_id))
    }
}
