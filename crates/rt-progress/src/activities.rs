// activities.rs — Activity transition engine.
//
//   pending ──complete──▶ completed ──validate──▶ validated
//                            │  ▲
//                     reject │  │ complete (resubmission)
//                            ▼  │
//                          rejected
//
// Completing is done by the owning trainee (or an administrator). Validating
// and rejecting need validator capability and scope over the trainee.

use chrono::Utc;
use rt_curriculum::Activity;
use rt_directory::{acts_as_owner, User};
use uuid::Uuid;

use crate::error::ProgressError;
use crate::events::ProgressEvent;
use crate::progress::{CompletionPayload, Progress, ReviewPayload};
use crate::tracker::Tracker;

impl Tracker {
    /// Submit activity `index` of a progress record.
    ///
    /// When the catalog entry requires validation, every reviewer of the
    /// trainee gets a `validacion` notification.
    pub fn mark_completed(
        &self,
        actor: &User,
        progress_id: Uuid,
        index: usize,
        payload: CompletionPayload,
    ) -> Result<Progress, ProgressError> {
        let mut progress = self.progress.require(progress_id)?;
        if !acts_as_owner(actor, progress.resident_id) {
            return Err(ProgressError::forbidden(format!(
                "{} does not own progress {}",
                actor.name, progress_id
            )));
        }

        let catalog = self.catalog_entry(&progress, index)?;
        if let Some(entry) = &catalog {
            if entry.requires_percentage && payload.participation.is_none() {
                return Err(ProgressError::precondition(format!(
                    "'{}' requires a participation percentage",
                    entry.name
                )));
            }
            if entry.requires_attachment && is_blank(&payload.attachment) {
                return Err(ProgressError::precondition(format!(
                    "'{}' requires an attachment",
                    entry.name
                )));
            }
        }

        let name = progress.complete_activity(index, payload)?.name.clone();
        self.progress.save(&progress)?;
        tracing::info!(%progress_id, index, activity = %name, "activity completed");
        self.emit(ProgressEvent::ActivityCompleted {
            progress_id,
            activity_index: index,
            activity_name: name.clone(),
            actor_id: actor.id,
            timestamp: Utc::now(),
        });

        if catalog.as_ref().is_none_or(|entry| entry.requires_validation) {
            let resident = self.users.require(progress.resident_id)?;
            self.fanout
                .notify_on_submission(&self.users, progress_id, &resident, &name)?;
        }
        Ok(progress)
    }

    /// Approve a submitted activity, then recompute the phase.
    pub fn validate(
        &self,
        actor: &User,
        progress_id: Uuid,
        index: usize,
        review: ReviewPayload,
    ) -> Result<Progress, ProgressError> {
        let mut progress = self.progress.require(progress_id)?;
        let resident = self.users.require(progress.resident_id)?;
        self.ensure_reviewer(actor, &resident)?;

        if let Some(entry) = self.catalog_entry(&progress, index)? {
            if entry.requires_signature && is_blank(&review.signature) {
                return Err(ProgressError::precondition(format!(
                    "'{}' requires the validator's signature",
                    entry.name
                )));
            }
        }

        let name = progress
            .validate_activity(index, actor.id, review)?
            .name
            .clone();
        self.progress.save(&progress)?;
        tracing::info!(%progress_id, index, activity = %name, validator = %actor.id, "activity validated");
        self.emit(ProgressEvent::ActivityValidated {
            progress_id,
            activity_index: index,
            activity_name: name,
            validator_id: actor.id,
            timestamp: Utc::now(),
        });

        self.fanout
            .notify_on_validation(&self.users, progress_id, &resident, actor)?;
        self.recompute_after_validation(&mut progress, actor)?;
        Ok(progress)
    }

    /// Send a submitted activity back to the trainee. The phase state does
    /// not change.
    pub fn reject(
        &self,
        actor: &User,
        progress_id: Uuid,
        index: usize,
        review: ReviewPayload,
    ) -> Result<Progress, ProgressError> {
        let mut progress = self.progress.require(progress_id)?;
        let resident = self.users.require(progress.resident_id)?;
        self.ensure_reviewer(actor, &resident)?;

        let comments = review.comments.clone();
        let name = progress.reject_activity(index, review)?.name.clone();
        self.progress.save(&progress)?;
        tracing::info!(%progress_id, index, activity = %name, validator = %actor.id, "activity rejected");
        self.emit(ProgressEvent::ActivityRejected {
            progress_id,
            activity_index: index,
            activity_name: name.clone(),
            validator_id: actor.id,
            comments: comments.clone(),
            timestamp: Utc::now(),
        });

        self.fanout.notify_on_rejection(
            &self.users,
            progress_id,
            &resident,
            actor,
            &name,
            comments.as_deref(),
        )?;
        Ok(progress)
    }

    /// Catalog definition behind activity `index`. `None` when the catalog no
    /// longer lists it; the record keeps working with default flags.
    fn catalog_entry(&self, progress: &Progress, index: usize) -> Result<Option<Activity>, ProgressError> {
        let activity_id = progress.activity(index)?.activity_id;
        let entry = match self
            .curriculum
            .activity(progress.track, progress.phase_id, activity_id)
        {
            Ok(entry) => entry,
            Err(rt_curriculum::CurriculumError::PhaseNotFound { .. }) => None,
            Err(e) => return Err(e.into()),
        };
        if entry.is_none() {
            tracing::warn!(progress_id = %progress.id, %activity_id, "activity missing from catalog");
        }
        Ok(entry)
    }
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().is_none_or(|v| v.trim().is_empty())
}
