//! # rt-progress
//!
//! The progress workflow of the Residency Tracker.
//!
//! A [`Progress`] record tracks one trainee through one curriculum phase. The
//! [`Tracker`] owns every store and runs the workflow:
//!
//! - **Initializer** — [`Tracker::initialize`] creates one record per phase,
//!   the first `active` and the rest `locked`
//! - **Activity transitions** — [`Tracker::mark_completed`],
//!   [`Tracker::validate`] and [`Tracker::reject`] under role and scope guards
//! - **Phase transitions** — [`Tracker::recompute_after_validation`] closes a
//!   fully validated phase and unlocks the next; [`Tracker::admin_set_state`]
//!   is the administrator override
//! - **Events** — every transition is dispatched as a [`ProgressEvent`] to the
//!   tracing log and the hash-chained audit trail

mod activities;
pub mod config;
pub mod error;
pub mod events;
mod initializer;
pub mod phases;
pub mod progress;
pub mod report;
pub mod store;
pub mod tracker;

pub use config::{HttpSettings, TrackerConfig, TrackerSettings};
pub use error::ProgressError;
pub use events::{AuditSink, EventDispatcher, EventSink, ProgressEvent, TracingSink};
pub use phases::Recompute;
pub use progress::{
    ActivityProgress, ActivityState, CompletionPayload, Participation, PhaseState, Progress,
    ReviewPayload,
};
pub use report::{PhaseSummary, ProgressReport};
pub use store::ProgressStore;
pub use tracker::Tracker;
