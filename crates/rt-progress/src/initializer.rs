// initializer.rs — Create a trainee's Progress records from the catalog.

use chrono::Utc;
use rt_directory::User;

use crate::error::ProgressError;
use crate::events::ProgressEvent;
use crate::progress::{PhaseState, Progress};
use crate::tracker::Tracker;

impl Tracker {
    /// One Progress per phase of the user's track that has activities.
    ///
    /// The first record created is `active`, the rest `locked`. Phases with no
    /// activities are skipped with a warning. A write failure stops the run;
    /// records already written stay. Returns how many records were created.
    pub fn initialize(&self, user: &User) -> Result<usize, ProgressError> {
        if !user.role.is_trainee() {
            return Err(ProgressError::precondition(format!(
                "{} is a {}; only residents and participants have progress",
                user.name, user.role
            )));
        }
        if !self.progress.list_for_resident(user.id)?.is_empty() {
            return Err(ProgressError::precondition(format!(
                "progress for {} is already initialized",
                user.name
            )));
        }

        let phases = self.curriculum.phases_by_number(user.track)?;
        let mut created = 0;
        for phase in &phases {
            if phase.activities.is_empty() {
                tracing::warn!(
                    phase = phase.number,
                    name = %phase.name,
                    track = %user.track,
                    "phase has no activities, skipping"
                );
                continue;
            }
            let state = if created == 0 {
                PhaseState::Active
            } else {
                PhaseState::Locked
            };
            let progress = Progress::new(user.id, user.track, phase, state);
            self.progress.save(&progress)?;
            created += 1;
        }

        if created == 0 {
            tracing::warn!(user_id = %user.id, track = %user.track, "curriculum is empty, nothing initialized");
        }
        tracing::info!(user_id = %user.id, track = %user.track, created, "progress initialized");
        self.emit(ProgressEvent::ProgressInitialized {
            resident_id: user.id,
            records: created,
            timestamp: Utc::now(),
        });
        Ok(created)
    }
}
