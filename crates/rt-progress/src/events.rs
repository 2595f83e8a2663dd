// events.rs — Progress events and sink dispatch.
//
// The workflow engines emit one event per transition. Sinks observe events;
// they cannot veto or alter a transition, and a failing sink never fails the
// request that produced the event.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rt_audit::{AuditEntry, AuditTrail};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ProgressError;
use crate::progress::PhaseState;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum ProgressEvent {
    /// Progress records were created for a trainee.
    ProgressInitialized {
        resident_id: Uuid,
        records: usize,
        timestamp: DateTime<Utc>,
    },

    ActivityCompleted {
        progress_id: Uuid,
        activity_index: usize,
        activity_name: String,
        actor_id: Uuid,
        timestamp: DateTime<Utc>,
    },

    ActivityValidated {
        progress_id: Uuid,
        activity_index: usize,
        activity_name: String,
        validator_id: Uuid,
        timestamp: DateTime<Utc>,
    },

    ActivityRejected {
        progress_id: Uuid,
        activity_index: usize,
        activity_name: String,
        validator_id: Uuid,
        comments: Option<String>,
        timestamp: DateTime<Utc>,
    },

    /// A phase changed state, either by recompute, cascade or override.
    PhaseStateChanged {
        progress_id: Uuid,
        resident_id: Uuid,
        from_state: String,
        to_state: String,
        /// `None` for cascade unlocks.
        actor_id: Option<Uuid>,
        timestamp: DateTime<Utc>,
    },
}

impl ProgressEvent {
    pub fn event_type(&self) -> &str {
        match self {
            ProgressEvent::ProgressInitialized { .. } => "progress_initialized",
            ProgressEvent::ActivityCompleted { .. } => "activity_completed",
            ProgressEvent::ActivityValidated { .. } => "activity_validated",
            ProgressEvent::ActivityRejected { .. } => "activity_rejected",
            ProgressEvent::PhaseStateChanged { .. } => "phase_state_changed",
        }
    }

    /// Who caused the event, if a person did.
    pub fn actor(&self) -> Option<Uuid> {
        match self {
            ProgressEvent::ProgressInitialized { .. } => None,
            ProgressEvent::ActivityCompleted { actor_id, .. } => Some(*actor_id),
            ProgressEvent::ActivityValidated { validator_id, .. }
            | ProgressEvent::ActivityRejected { validator_id, .. } => Some(*validator_id),
            ProgressEvent::PhaseStateChanged { actor_id, .. } => *actor_id,
        }
    }

    /// The record the event is about.
    pub fn subject(&self) -> Uuid {
        match self {
            ProgressEvent::ProgressInitialized { resident_id, .. } => *resident_id,
            ProgressEvent::ActivityCompleted { progress_id, .. }
            | ProgressEvent::ActivityValidated { progress_id, .. }
            | ProgressEvent::ActivityRejected { progress_id, .. }
            | ProgressEvent::PhaseStateChanged { progress_id, .. } => *progress_id,
        }
    }

    pub fn phase_state_changed(
        progress_id: Uuid,
        resident_id: Uuid,
        from: PhaseState,
        to: PhaseState,
        actor_id: Option<Uuid>,
    ) -> Self {
        ProgressEvent::PhaseStateChanged {
            progress_id,
            resident_id,
            from_state: from.to_string(),
            to_state: to.to_string(),
            actor_id,
            timestamp: Utc::now(),
        }
    }
}

/// Receives progress events.
pub trait EventSink: Send + Sync {
    /// Errors are logged by the dispatcher and otherwise ignored.
    fn send(&self, event: &ProgressEvent) -> Result<(), ProgressError>;
}

/// Writes every event to the `tracing` log.
pub struct TracingSink;

impl EventSink for TracingSink {
    fn send(&self, event: &ProgressEvent) -> Result<(), ProgressError> {
        tracing::info!(
            event = event.event_type(),
            subject = %event.subject(),
            actor = ?event.actor(),
            "progress event"
        );
        Ok(())
    }
}

/// Appends every event to the hash-chained audit trail.
pub struct AuditSink {
    trail: Arc<AuditTrail>,
}

impl AuditSink {
    pub fn new(trail: Arc<AuditTrail>) -> Self {
        Self { trail }
    }
}

impl EventSink for AuditSink {
    fn send(&self, event: &ProgressEvent) -> Result<(), ProgressError> {
        let mut entry = AuditEntry::new(event.event_type())
            .on(event.subject())
            .with_detail(serde_json::to_value(event)?);
        if let Some(actor) = event.actor() {
            entry = entry.by(actor);
        }
        self.trail.append(entry)?;
        Ok(())
    }
}

/// Fans events out to every registered sink.
pub struct EventDispatcher {
    sinks: Vec<Box<dyn EventSink>>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self { sinks: Vec::new() }
    }

    pub fn add_sink(&mut self, sink: Box<dyn EventSink>) {
        self.sinks.push(sink);
    }

    pub fn dispatch(&self, event: &ProgressEvent) {
        for sink in &self.sinks {
            if let Err(e) = sink.send(event) {
                tracing::warn!(event = event.event_type(), "event sink error: {}", e);
            }
        }
    }
}

impl Default for EventDispatcher {
    fn default() -> Self {
        Self::new()
    }
}
