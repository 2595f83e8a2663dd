//! # rt-notify
//!
//! Notification records and fan-out for the Residency Tracker.
//!
//! - [`Notification`] — one message to one user, only ever mutated by reading it
//! - [`NotificationStore`] — JSON file-based inbox storage with idempotent mark-read
//! - [`FanOut`] — resolves reviewers for a trainee and creates or clears
//!   notifications when activities are submitted, validated or rejected

pub mod error;
pub mod fanout;
pub mod notification;
pub mod store;

pub use error::NotifyError;
pub use fanout::{resolve_reviewers, FanOut, NotificationLinks};
pub use notification::{Notification, NotificationKind, RelatedEntity};
pub use store::NotificationStore;
