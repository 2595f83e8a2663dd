// progress.rs — Progress: one trainee's record for one phase.
//
// Progress is the aggregate root. Its activities are an owned list addressed
// by index, and every change goes through the methods below so the state
// rules hold in one place.
//
// Phase state:
//   Locked → Active → Completed → Validated
//   Completed | Validated → Active   (administrator revert)
//
// Activity state:
//   Pending → Completed → Validated
//                       → Rejected → Completed (resubmission)

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rt_curriculum::{ActivityKind, Phase, Track};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ProgressError;

/// Phase-level state of a Progress record.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PhaseState {
    /// Not yet reachable; an earlier phase is unfinished.
    Locked,
    /// The trainee is working through its activities.
    Active,
    /// Every activity submitted; closed by an administrator.
    Completed,
    /// Every activity validated.
    Validated,
}

impl fmt::Display for PhaseState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PhaseState::Locked => "locked",
            PhaseState::Active => "active",
            PhaseState::Completed => "completed",
            PhaseState::Validated => "validated",
        };
        f.write_str(name)
    }
}

impl FromStr for PhaseState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "locked" => Ok(PhaseState::Locked),
            "active" => Ok(PhaseState::Active),
            "completed" => Ok(PhaseState::Completed),
            "validated" => Ok(PhaseState::Validated),
            other => Err(format!("unknown phase state '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ActivityState {
    Pending,
    Completed,
    Validated,
    Rejected,
}

impl fmt::Display for ActivityState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ActivityState::Pending => "pending",
            ActivityState::Completed => "completed",
            ActivityState::Validated => "validated",
            ActivityState::Rejected => "rejected",
        };
        f.write_str(name)
    }
}

/// Share of a procedure performed by the trainee: 0, 25, 50, 75 or 100.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(try_from = "u8", into = "u8")]
pub struct Participation(u8);

impl Participation {
    pub fn percent(&self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Participation {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 | 25 | 50 | 75 | 100 => Ok(Participation(value)),
            other => Err(format!(
                "participation must be 0, 25, 50, 75 or 100 (got {})",
                other
            )),
        }
    }
}

impl From<Participation> for u8 {
    fn from(p: Participation) -> u8 {
        p.0
    }
}

/// Embedded per-activity status, copied from the catalog at initialization.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ActivityProgress {
    /// Catalog activity this entry tracks. Never changes.
    pub activity_id: Uuid,
    pub name: String,
    pub kind: ActivityKind,
    pub state: ActivityState,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resident_comments: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub surgery_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub surgeon_name: Option<String>,

    #[serde(default)]
    pub participation: Participation,

    /// Reference to an uploaded document (storage is external).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachment: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validated_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validated_by: Option<Uuid>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validator_comments: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejected_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejection_comments: Option<String>,
}

impl ActivityProgress {
    fn pending(activity: &rt_curriculum::Activity) -> Self {
        Self {
            activity_id: activity.id,
            name: activity.name.clone(),
            kind: activity.kind,
            state: ActivityState::Pending,
            completed_at: None,
            resident_comments: None,
            surgery_type: None,
            surgeon_name: None,
            participation: Participation::default(),
            attachment: None,
            validated_at: None,
            validated_by: None,
            validator_comments: None,
            signature: None,
            rejected_at: None,
            rejection_comments: None,
        }
    }
}

/// What a trainee reports when completing an activity.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompletionPayload {
    #[serde(default)]
    pub comments: Option<String>,
    #[serde(default)]
    pub surgery_type: Option<String>,
    #[serde(default)]
    pub surgeon_name: Option<String>,
    #[serde(default)]
    pub participation: Option<Participation>,
    #[serde(default)]
    pub attachment: Option<String>,
}

/// What a reviewer records when validating or rejecting.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReviewPayload {
    #[serde(default)]
    pub comments: Option<String>,
    #[serde(default)]
    pub signature: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Progress {
    pub id: Uuid,
    pub resident_id: Uuid,
    pub phase_id: Uuid,

    /// Curriculum discriminator: which catalog `phase_id` and the activity ids refer to.
    pub track: Track,

    /// Copied from the catalog at initialization, for listing and reports.
    pub phase_number: u32,
    pub phase_name: String,

    pub activities: Vec<ActivityProgress>,
    pub state: PhaseState,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validated_by: Option<Uuid>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_comments: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Progress {
    /// A fresh record for `phase`, one pending entry per catalog activity in
    /// `order` sequence.
    pub fn new(resident_id: Uuid, track: Track, phase: &Phase, state: PhaseState) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            resident_id,
            phase_id: phase.id,
            track,
            phase_number: phase.number,
            phase_name: phase.name.clone(),
            activities: phase
                .ordered_activities()
                .into_iter()
                .map(ActivityProgress::pending)
                .collect(),
            state,
            validated_by: None,
            started_at: (state == PhaseState::Active).then_some(now),
            finished_at: None,
            final_comments: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn activity(&self, index: usize) -> Result<&ActivityProgress, ProgressError> {
        self.activities.get(index).ok_or_else(|| self.missing(index))
    }

    /// Every activity validated (and there is at least one).
    pub fn all_validated(&self) -> bool {
        !self.activities.is_empty()
            && self
                .activities
                .iter()
                .all(|a| a.state == ActivityState::Validated)
    }

    /// Nothing left pending or rejected.
    pub fn all_submitted(&self) -> bool {
        self.activities
            .iter()
            .all(|a| matches!(a.state, ActivityState::Completed | ActivityState::Validated))
    }

    pub fn validated_count(&self) -> usize {
        self.activities
            .iter()
            .filter(|a| a.state == ActivityState::Validated)
            .count()
    }

    /// Record a trainee's submission.
    ///
    /// Resubmitting a rejected activity clears the previous rejection.
    /// A validated activity cannot be resubmitted.
    pub fn complete_activity(
        &mut self,
        index: usize,
        payload: CompletionPayload,
    ) -> Result<&ActivityProgress, ProgressError> {
        if self.state != PhaseState::Active {
            return Err(ProgressError::precondition(format!(
                "phase is not active ({})",
                self.state
            )));
        }
        let missing = self.missing(index);
        let activity = self.activities.get_mut(index).ok_or(missing)?;
        if activity.state == ActivityState::Validated {
            return Err(ProgressError::precondition(format!(
                "activity '{}' is already validated",
                activity.name
            )));
        }

        let now = Utc::now();
        activity.state = ActivityState::Completed;
        activity.completed_at = Some(now);
        activity.resident_comments = payload.comments;
        activity.surgery_type = payload.surgery_type;
        activity.surgeon_name = payload.surgeon_name;
        activity.participation = payload.participation.unwrap_or_default();
        activity.attachment = payload.attachment;
        activity.rejected_at = None;
        activity.rejection_comments = None;
        self.updated_at = now;
        Ok(&self.activities[index])
    }

    /// Approve a completed activity.
    pub fn validate_activity(
        &mut self,
        index: usize,
        validator_id: Uuid,
        review: ReviewPayload,
    ) -> Result<&ActivityProgress, ProgressError> {
        let activity = self.reviewable(index, "validated")?;
        let now = Utc::now();
        activity.state = ActivityState::Validated;
        activity.validated_at = Some(now);
        activity.validated_by = Some(validator_id);
        activity.validator_comments = review.comments;
        activity.signature = review.signature;
        self.updated_at = now;
        Ok(&self.activities[index])
    }

    /// Send a completed activity back to the trainee.
    pub fn reject_activity(
        &mut self,
        index: usize,
        review: ReviewPayload,
    ) -> Result<&ActivityProgress, ProgressError> {
        let activity = self.reviewable(index, "rejected")?;
        let now = Utc::now();
        activity.state = ActivityState::Rejected;
        activity.rejected_at = Some(now);
        activity.rejection_comments = review.comments;
        self.updated_at = now;
        Ok(&self.activities[index])
    }

    /// Move to `Validated`, recording who closed the phase.
    ///
    /// Returns `false` when the phase already was validated.
    pub fn mark_validated(&mut self, validator_id: Uuid) -> Result<bool, ProgressError> {
        if self.state == PhaseState::Validated {
            return Ok(false);
        }
        if !self.all_validated() {
            return Err(self.invalid(
                PhaseState::Validated,
                "every activity must be validated first",
            ));
        }
        let now = Utc::now();
        self.state = PhaseState::Validated;
        self.finished_at.get_or_insert(now);
        self.validated_by = Some(validator_id);
        self.updated_at = now;
        Ok(true)
    }

    /// Cascade unlock. Returns `false` unless the phase was locked.
    pub fn unlock(&mut self) -> bool {
        if self.state != PhaseState::Locked {
            return false;
        }
        let now = Utc::now();
        self.state = PhaseState::Active;
        self.started_at.get_or_insert(now);
        self.updated_at = now;
        true
    }

    /// Administrator override of the phase state.
    ///
    /// Allowed: locked → active, active → completed (nothing pending or
    /// rejected), completed|validated → active. Everything else fails,
    /// including a request for the state the phase is already in.
    pub fn admin_transition(&mut self, requested: PhaseState) -> Result<(), ProgressError> {
        let now = Utc::now();
        match (self.state, requested) {
            (from, to) if from == to => {
                return Err(self.invalid(to, &format!("phase is already {}", from)));
            }
            (PhaseState::Locked, PhaseState::Active) => {
                self.started_at.get_or_insert(now);
            }
            (PhaseState::Active, PhaseState::Completed) => {
                if !self.all_submitted() {
                    return Err(self.invalid(
                        requested,
                        "every activity must be completed or validated",
                    ));
                }
                self.finished_at = Some(now);
            }
            (PhaseState::Completed | PhaseState::Validated, PhaseState::Active) => {
                self.finished_at = None;
                self.validated_by = None;
            }
            (_, PhaseState::Validated) => {
                return Err(self.invalid(
                    requested,
                    "phases are validated by validating all of their activities",
                ));
            }
            (_, to) => {
                return Err(self.invalid(to, "transition not allowed"));
            }
        }
        self.state = requested;
        self.updated_at = now;
        Ok(())
    }

    fn reviewable(&mut self, index: usize, verb: &str) -> Result<&mut ActivityProgress, ProgressError> {
        let missing = self.missing(index);
        let activity = self.activities.get_mut(index).ok_or(missing)?;
        if activity.state != ActivityState::Completed {
            return Err(ProgressError::precondition(format!(
                "activity '{}' is {} and cannot be {}; only completed activities can be reviewed",
                activity.name, activity.state, verb
            )));
        }
        Ok(activity)
    }

    fn missing(&self, index: usize) -> ProgressError {
        ProgressError::NotFound(format!(
            "activity #{} in progress {} ({} activities)",
            index,
            self.id,
            self.activities.len()
        ))
    }

    fn invalid(&self, to: PhaseState, reason: &str) -> ProgressError {
        ProgressError::InvalidTransition {
            progress_id: self.id,
            from: self.state.to_string(),
            to: to.to_string(),
            reason: reason.to_string(),
        }
    }
}
