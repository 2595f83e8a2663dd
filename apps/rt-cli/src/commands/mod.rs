pub mod audit;
pub mod curriculum;
pub mod notifications;
pub mod progress;
pub mod report;
pub mod serve;
pub mod user;

use rt_directory::User;
use rt_progress::{Tracker, TrackerConfig};
use uuid::Uuid;

/// An open tracker plus the user the command acts for.
pub struct Context {
    pub tracker: Tracker,
    actor: Option<Uuid>,
}

impl Context {
    pub fn open(config: TrackerConfig, actor: Option<Uuid>) -> anyhow::Result<Self> {
        Ok(Self {
            tracker: Tracker::open(config)?,
            actor,
        })
    }

    /// The `--as` user, resolved against the directory.
    pub fn actor(&self) -> anyhow::Result<User> {
        let id = self
            .actor
            .ok_or_else(|| anyhow::anyhow!("this command needs --as <user-id>"))?;
        Ok(self.tracker.caller(id)?)
    }
}

pub(crate) fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() > max {
        let head: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", head)
    } else {
        s.to_string()
    }
}
