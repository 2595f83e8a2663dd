// phases.rs — Phase transition engine.
//
//   locked ──▶ active ──▶ completed
//                │
//                └──(every activity validated)──▶ validated
//
//   completed | validated ──(administrator)──▶ active
//   active | completed ──(administrator, every activity validated)──▶ validated
//
// Validating a phase unlocks the next one of the same track and trainee: the
// phase with the smallest `order` above the current one. Phases the trainee
// has no record for (they had no activities) are passed over.

use rt_curriculum::CurriculumError;
use rt_directory::User;
use uuid::Uuid;

use crate::error::ProgressError;
use crate::events::ProgressEvent;
use crate::progress::{PhaseState, Progress};
use crate::tracker::Tracker;

/// What a recompute changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Recompute {
    /// The phase moved to `validated`.
    pub phase_validated: bool,
    /// Progress record unlocked by the cascade.
    pub unlocked: Option<Uuid>,
}

impl Tracker {
    /// After an activity validation: close the phase when every activity is
    /// validated, tell the trainee, and unlock the next phase.
    pub fn recompute_after_validation(
        &self,
        progress: &mut Progress,
        validator: &User,
    ) -> Result<Recompute, ProgressError> {
        if !progress.all_validated() {
            return Ok(Recompute::default());
        }

        let from = progress.state;
        if !progress.mark_validated(validator.id)? {
            return Ok(Recompute::default());
        }
        self.progress.save(progress)?;
        tracing::info!(
            progress_id = %progress.id,
            phase = progress.phase_number,
            "phase validated"
        );
        self.emit(ProgressEvent::phase_state_changed(
            progress.id,
            progress.resident_id,
            from,
            PhaseState::Validated,
            Some(validator.id),
        ));

        let resident = self.users.require(progress.resident_id)?;
        self.fanout
            .notify_phase_validated(progress.id, &resident, &progress.phase_name)?;

        Ok(Recompute {
            phase_validated: true,
            unlocked: self.unlock_next(progress)?,
        })
    }

    /// Administrator override of a phase's state.
    pub fn admin_set_state(
        &self,
        actor: &User,
        progress_id: Uuid,
        requested: PhaseState,
    ) -> Result<Progress, ProgressError> {
        self.ensure_admin(actor)?;
        let mut progress = self.progress.require(progress_id)?;
        let from = progress.state;

        // A reopened phase whose activities all stayed validated closes the
        // same way an activity validation would close it.
        if requested == PhaseState::Validated
            && matches!(from, PhaseState::Active | PhaseState::Completed)
            && progress.all_validated()
        {
            self.recompute_after_validation(&mut progress, actor)?;
            return Ok(progress);
        }

        progress.admin_transition(requested)?;
        self.progress.save(&progress)?;

        tracing::info!(%progress_id, %from, to = %requested, admin = %actor.id, "phase state overridden");
        self.emit(ProgressEvent::phase_state_changed(
            progress_id,
            progress.resident_id,
            from,
            requested,
            Some(actor.id),
        ));
        Ok(progress)
    }

    /// Every record in `state`, across trainees. Administrators use it to find
    /// phases waiting on an override (e.g. `completed`).
    pub fn phases_in_state(&self, actor: &User, state: PhaseState) -> Result<Vec<Progress>, ProgressError> {
        self.ensure_admin(actor)?;
        self.progress.list_by_state(state)
    }

    /// Unlock the trainee's next record after `progress`, if it is locked.
    fn unlock_next(&self, progress: &Progress) -> Result<Option<Uuid>, ProgressError> {
        let mut current = progress.phase_id;
        loop {
            let next = match self.curriculum.next_phase(progress.track, current) {
                Ok(Some(phase)) => phase,
                Ok(None) => {
                    tracing::debug!(progress_id = %progress.id, "last phase validated, nothing to unlock");
                    return Ok(None);
                }
                Err(CurriculumError::PhaseNotFound { .. }) => {
                    tracing::warn!(
                        progress_id = %progress.id,
                        phase_id = %current,
                        "phase no longer in the catalog, cascade stopped"
                    );
                    return Ok(None);
                }
                Err(e) => return Err(e.into()),
            };

            let Some(mut following) = self.progress.find(progress.resident_id, next.id)? else {
                current = next.id;
                continue;
            };
            if !following.unlock() {
                tracing::debug!(
                    progress_id = %following.id,
                    state = %following.state,
                    "next phase already unlocked"
                );
                return Ok(None);
            }
            self.progress.save(&following)?;
            tracing::info!(
                progress_id = %following.id,
                phase = following.phase_number,
                "next phase unlocked"
            );
            self.emit(ProgressEvent::phase_state_changed(
                following.id,
                following.resident_id,
                PhaseState::Locked,
                PhaseState::Active,
                None,
            ));
            return Ok(Some(following.id));
        }
    }
}
