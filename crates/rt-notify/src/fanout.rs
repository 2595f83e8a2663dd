// fanout.rs — Who hears about a workflow transition, and what they get.
//
// Recipient resolution:
//   residency track → tutors of the trainee's hospital and specialty
//   society track   → professors of the trainee's society
// Administrators are never subscribed automatically.
//
// Transitions and their notifications:
//   submission (activity requires validation) → one "validacion" per reviewer
//   validation → related unread notifications marked read
//   rejection  → related unread notifications marked read, one "rechazo" to the trainee
//   phase validated → one "fase_validada" to the trainee
//
// Creation is not deduplicated: calling a trigger twice sends twice.

use rt_curriculum::Track;
use rt_directory::{User, UserStore};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::NotifyError;
use crate::notification::{Notification, NotificationKind, RelatedEntity};
use crate::store::NotificationStore;

/// Web paths notifications point at.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NotificationLinks {
    /// Reviewer's pending-validations view.
    #[serde(default = "default_validations_link")]
    pub validations: String,

    /// Trainee's own progress view.
    #[serde(default = "default_progress_link")]
    pub progress: String,
}

impl Default for NotificationLinks {
    fn default() -> Self {
        Self {
            validations: default_validations_link(),
            progress: default_progress_link(),
        }
    }
}

fn default_validations_link() -> String {
    "/validaciones".to_string()
}

fn default_progress_link() -> String {
    "/progreso".to_string()
}

/// Reviewers subscribed to a trainee's submissions.
pub fn resolve_reviewers(users: &UserStore, trainee: &User) -> Result<Vec<User>, NotifyError> {
    let reviewers = match trainee.track {
        Track::Residency => match (&trainee.hospital, &trainee.specialty) {
            (Some(hospital), Some(specialty)) => users.tutors_of(hospital, specialty)?,
            _ => Vec::new(),
        },
        Track::Society => match &trainee.society {
            Some(society) => users.professors_of(society)?,
            None => Vec::new(),
        },
    };
    if reviewers.is_empty() {
        tracing::warn!(trainee_id = %trainee.id, track = %trainee.track, "no reviewers resolved");
    }
    Ok(reviewers)
}

/// Creates and clears notifications in response to workflow transitions.
pub struct FanOut {
    store: NotificationStore,
    links: NotificationLinks,
}

impl FanOut {
    pub fn new(store: NotificationStore, links: NotificationLinks) -> Self {
        Self { store, links }
    }

    pub fn store(&self) -> &NotificationStore {
        &self.store
    }

    /// A trainee submitted an activity that needs review.
    pub fn notify_on_submission(
        &self,
        users: &UserStore,
        progress_id: Uuid,
        trainee: &User,
        activity_name: &str,
    ) -> Result<Vec<Notification>, NotifyError> {
        let reviewers = resolve_reviewers(users, trainee)?;
        let mut created = Vec::with_capacity(reviewers.len());
        for reviewer in &reviewers {
            let notification = Notification::new(
                reviewer.id,
                NotificationKind::Validation,
                format!("{} submitted '{}' for validation", trainee.name, activity_name),
                self.links.validations.clone(),
            )
            .about(RelatedEntity::progress(progress_id));
            self.store.save(&notification)?;
            created.push(notification);
        }
        tracing::info!(%progress_id, recipients = created.len(), "validation requests sent");
        Ok(created)
    }

    /// A reviewer validated an activity: pending requests about the record are done.
    pub fn notify_on_validation(
        &self,
        users: &UserStore,
        progress_id: Uuid,
        trainee: &User,
        reviewer: &User,
    ) -> Result<usize, NotifyError> {
        let interested = self.interested_parties(users, trainee, reviewer)?;
        self.mark_related_read(progress_id, &interested)
    }

    /// A reviewer rejected an activity: clear pending requests, tell the trainee.
    pub fn notify_on_rejection(
        &self,
        users: &UserStore,
        progress_id: Uuid,
        trainee: &User,
        reviewer: &User,
        activity_name: &str,
        comments: Option<&str>,
    ) -> Result<Notification, NotifyError> {
        let interested = self.interested_parties(users, trainee, reviewer)?;
        self.mark_related_read(progress_id, &interested)?;

        let mut message = format!("'{}' was rejected by {}", activity_name, reviewer.name);
        if let Some(comments) = comments.filter(|c| !c.trim().is_empty()) {
            message.push_str(": ");
            message.push_str(comments);
        }
        let notification = Notification::new(
            trainee.id,
            NotificationKind::Rejection,
            message,
            self.links.progress.clone(),
        )
        .about(RelatedEntity::progress(progress_id));
        self.store.save(&notification)?;
        tracing::info!(%progress_id, trainee_id = %trainee.id, "rejection notice sent");
        Ok(notification)
    }

    /// Every activity of a phase is validated.
    pub fn notify_phase_validated(
        &self,
        progress_id: Uuid,
        trainee: &User,
        phase_name: &str,
    ) -> Result<Notification, NotifyError> {
        let notification = Notification::new(
            trainee.id,
            NotificationKind::PhaseValidated,
            format!("Phase '{}' has been validated", phase_name),
            self.links.progress.clone(),
        )
        .about(RelatedEntity::progress(progress_id));
        self.store.save(&notification)?;
        Ok(notification)
    }

    /// Bulk conditional update: unread → read for notifications about the
    /// progress record addressed to any of `user_ids`.
    pub fn mark_related_read(&self, progress_id: Uuid, user_ids: &[Uuid]) -> Result<usize, NotifyError> {
        let changed = self
            .store
            .mark_related_read(&RelatedEntity::progress(progress_id), user_ids)?;
        tracing::debug!(%progress_id, changed, "related notifications marked read");
        Ok(changed)
    }

    /// Subscribed reviewers, the acting reviewer, and the trainee.
    fn interested_parties(
        &self,
        users: &UserStore,
        trainee: &User,
        reviewer: &User,
    ) -> Result<Vec<Uuid>, NotifyError> {
        let mut ids: Vec<Uuid> = resolve_reviewers(users, trainee)?
            .into_iter()
            .map(|u| u.id)
            .collect();
        for id in [reviewer.id, trainee.id] {
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rt_directory::Role;
    use tempfile::{tempdir, TempDir};

    struct Fixture {
        _dir: TempDir,
        users: UserStore,
        fanout: FanOut,
        resident: User,
        tutors: Vec<User>,
    }

    fn fixture() -> Fixture {
        let dir = tempdir().unwrap();
        let users = UserStore::new(dir.path().join("users")).unwrap();
        let store = NotificationStore::new(dir.path().join("notifications")).unwrap();
        let fanout = FanOut::new(store, NotificationLinks::default());

        let resident = User::new("Ana", "ana@h.org", Role::Resident)
            .with_hospital("La Paz", "urology", "centro");
        users.register(&resident).unwrap();

        let mut tutors = Vec::new();
        for name in ["Gil", "Sanz"] {
            let tutor = User::new(name, format!("{}@h.org", name), Role::Tutor)
                .with_hospital("La Paz", "urology", "centro");
            users.register(&tutor).unwrap();
            tutors.push(tutor);
        }
        let elsewhere = User::new("Ruiz", "ruiz@h.org", Role::Tutor)
            .with_hospital("La Paz", "gynecology", "centro");
        users.register(&elsewhere).unwrap();
        let admin = User::new("Root", "root@rt.org", Role::Administrator);
        users.register(&admin).unwrap();

        Fixture {
            _dir: dir,
            users,
            fanout,
            resident,
            tutors,
        }
    }

    #[test]
    fn submission_notifies_each_tutor_of_hospital_and_specialty() {
        let f = fixture();
        let progress_id = Uuid::new_v4();
        let created = f
            .fanout
            .notify_on_submission(&f.users, progress_id, &f.resident, "Dry lab")
            .unwrap();

        assert_eq!(created.len(), 2);
        for tutor in &f.tutors {
            let inbox = f.fanout.store().list_for(tutor.id, true).unwrap();
            assert_eq!(inbox.len(), 1);
            assert_eq!(inbox[0].kind, NotificationKind::Validation);
            assert_eq!(inbox[0].link, "/validaciones");
        }
        // Nobody else is subscribed, administrators included.
        assert_eq!(f.fanout.store().list().unwrap().len(), 2);
    }

    #[test]
    fn validation_marks_requests_read() {
        let f = fixture();
        let progress_id = Uuid::new_v4();
        f.fanout
            .notify_on_submission(&f.users, progress_id, &f.resident, "Dry lab")
            .unwrap();

        let changed = f
            .fanout
            .notify_on_validation(&f.users, progress_id, &f.resident, &f.tutors[0])
            .unwrap();
        assert_eq!(changed, 2);
        for tutor in &f.tutors {
            assert_eq!(f.fanout.store().unread_count(tutor.id).unwrap(), 0);
        }
    }

    #[test]
    fn rejection_notifies_trainee() {
        let f = fixture();
        let progress_id = Uuid::new_v4();
        f.fanout
            .notify_on_submission(&f.users, progress_id, &f.resident, "Dry lab")
            .unwrap();

        let notice = f
            .fanout
            .notify_on_rejection(
                &f.users,
                progress_id,
                &f.resident,
                &f.tutors[0],
                "Dry lab",
                Some("video missing"),
            )
            .unwrap();

        assert_eq!(notice.recipient_id, f.resident.id);
        assert_eq!(notice.kind, NotificationKind::Rejection);
        assert!(notice.message.contains("video missing"));
        assert_eq!(f.fanout.store().unread_count(f.tutors[1].id).unwrap(), 0);
        assert_eq!(f.fanout.store().unread_count(f.resident.id).unwrap(), 1);
    }

    #[test]
    fn repeated_submission_creates_duplicates() {
        let f = fixture();
        let progress_id = Uuid::new_v4();
        for _ in 0..2 {
            f.fanout
                .notify_on_submission(&f.users, progress_id, &f.resident, "Dry lab")
                .unwrap();
        }
        assert_eq!(f.fanout.store().unread_count(f.tutors[0].id).unwrap(), 2);
    }

    #[test]
    fn society_trainee_resolves_professors() {
        let f = fixture();
        let participant = User::new("Luis", "luis@s.org", Role::Participant).with_society("SEC");
        let professor = User::new("Prof", "prof@s.org", Role::Professor).with_society("SEC");
        f.users.register(&participant).unwrap();
        f.users.register(&professor).unwrap();

        let reviewers = resolve_reviewers(&f.users, &participant).unwrap();
        assert_eq!(reviewers.len(), 1);
        assert_eq!(reviewers[0].id, professor.id);
    }
}
