// tracker.rs — Tracker: the stores, fan-out and event dispatch behind every
// workflow operation.
//
// The workflow engines live in sibling modules as `impl Tracker` blocks:
//   initializer.rs — initialize
//   activities.rs  — mark_completed / validate / reject
//   phases.rs      — recompute_after_validation / admin_set_state
//   report.rs      — report
//
// This file holds construction, directory access, read access to progress
// records and the notification inbox.

use std::sync::Arc;

use rt_audit::AuditTrail;
use rt_curriculum::CurriculumStore;
use rt_directory::{acts_as_owner, review_decision, ReviewDecision, Role, User, UserStore};
use rt_notify::{FanOut, Notification, NotificationStore};
use uuid::Uuid;

use crate::config::TrackerConfig;
use crate::error::ProgressError;
use crate::events::{AuditSink, EventDispatcher, EventSink, ProgressEvent, TracingSink};
use crate::progress::Progress;
use crate::store::ProgressStore;

pub struct Tracker {
    config: TrackerConfig,
    pub(crate) curriculum: CurriculumStore,
    pub(crate) users: UserStore,
    pub(crate) progress: ProgressStore,
    pub(crate) fanout: FanOut,
    events: EventDispatcher,
}

impl Tracker {
    /// Open every store under the configured layout. Events go to the
    /// tracing log and the audit trail.
    pub fn open(config: TrackerConfig) -> Result<Self, ProgressError> {
        let trail = Arc::new(AuditTrail::open(&config.audit_log)?);
        let mut events = EventDispatcher::new();
        events.add_sink(Box::new(TracingSink));
        events.add_sink(Box::new(AuditSink::new(trail)));

        let fanout = FanOut::new(
            NotificationStore::new(&config.notifications_dir)?,
            config.settings.notifications.clone(),
        );
        Ok(Self {
            curriculum: CurriculumStore::new(&config.curriculum_dir)?,
            users: UserStore::new(&config.users_dir)?,
            progress: ProgressStore::new(&config.progress_dir)?,
            fanout,
            events,
            config,
        })
    }

    /// Register an extra event sink.
    pub fn add_sink(&mut self, sink: Box<dyn EventSink>) {
        self.events.add_sink(sink);
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    pub fn curriculum(&self) -> &CurriculumStore {
        &self.curriculum
    }

    pub fn users(&self) -> &UserStore {
        &self.users
    }

    pub fn progress_store(&self) -> &ProgressStore {
        &self.progress
    }

    pub fn notifications(&self) -> &NotificationStore {
        self.fanout.store()
    }

    pub(crate) fn emit(&self, event: ProgressEvent) {
        self.events.dispatch(&event);
    }

    /// Add a user to the directory. Trainees get their progress records
    /// right away; returns how many were created.
    pub fn register_user(&self, user: &User) -> Result<usize, ProgressError> {
        self.users.register(user)?;
        if !user.role.is_trainee() {
            return Ok(0);
        }
        self.initialize(user)
    }

    /// Resolve a caller id to a directory user.
    pub fn caller(&self, user_id: Uuid) -> Result<User, ProgressError> {
        Ok(self.users.require(user_id)?)
    }

    /// A trainee's records in phase order, if `actor` may see them.
    pub fn progress_for(&self, actor: &User, resident_id: Uuid) -> Result<Vec<Progress>, ProgressError> {
        let resident = self.users.require(resident_id)?;
        self.ensure_can_view(actor, &resident)?;
        self.progress.list_for_resident(resident_id)
    }

    /// One record, if `actor` may see it.
    pub fn progress(&self, actor: &User, progress_id: Uuid) -> Result<Progress, ProgressError> {
        let progress = self.progress.require(progress_id)?;
        let resident = self.users.require(progress.resident_id)?;
        self.ensure_can_view(actor, &resident)?;
        Ok(progress)
    }

    /// The owner, an administrator, or a reviewer in scope.
    pub(crate) fn ensure_can_view(&self, actor: &User, resident: &User) -> Result<(), ProgressError> {
        if acts_as_owner(actor, resident.id) || review_decision(actor, resident).is_allowed() {
            return Ok(());
        }
        Err(ProgressError::forbidden(format!(
            "{} may not view progress of {}",
            actor.name, resident.name
        )))
    }

    /// Validator capability plus scope over the trainee.
    pub(crate) fn ensure_reviewer(&self, actor: &User, resident: &User) -> Result<(), ProgressError> {
        match review_decision(actor, resident) {
            ReviewDecision::Allow => Ok(()),
            ReviewDecision::Deny { reason } => Err(ProgressError::forbidden(reason)),
        }
    }

    pub fn ensure_admin(&self, actor: &User) -> Result<(), ProgressError> {
        if actor.role == Role::Administrator {
            Ok(())
        } else {
            Err(ProgressError::forbidden(format!(
                "{} is a {}; only administrators may do this",
                actor.name, actor.role
            )))
        }
    }

    // ── Inbox ────────────────────────────────────────────────────

    pub fn inbox(&self, actor: &User, unread_only: bool) -> Result<Vec<Notification>, ProgressError> {
        Ok(self.notifications().list_for(actor.id, unread_only)?)
    }

    pub fn unread_count(&self, actor: &User) -> Result<usize, ProgressError> {
        Ok(self.notifications().unread_count(actor.id)?)
    }

    /// Returns `false` when the notification was already read.
    pub fn mark_read(&self, actor: &User, notification_id: Uuid) -> Result<bool, ProgressError> {
        Ok(self.notifications().mark_read(notification_id, actor.id)?)
    }

    pub fn mark_all_read(&self, actor: &User) -> Result<usize, ProgressError> {
        Ok(self.notifications().mark_all_read(actor.id)?)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use rt_curriculum::{Activity, ActivityKind, Curriculum, Phase, Track};
    use tempfile::{tempdir, TempDir};

    /// A tracker over a temp directory with a four-phase residency
    /// curriculum (phase 3 has no activities), one resident, two tutors of the resident's service, a
    /// tutor of another hospital, a coordinator and an administrator.
    pub(crate) struct Fixture {
        pub _dir: TempDir,
        pub tracker: Tracker,
        pub resident: User,
        pub tutor: User,
        pub second_tutor: User,
        pub outside_tutor: User,
        pub coordinator: User,
        pub admin: User,
    }

    pub(crate) fn curriculum() -> Curriculum {
        Curriculum::new(Track::Residency)
            .with_phase(
                Phase::new(1, "Theory")
                    .with_activity(Activity::new("Online course", ActivityKind::Theoretical, 1))
                    .with_activity(Activity::new("Console test", ActivityKind::Evaluation, 2)),
            )
            .with_phase(
                Phase::new(2, "Dry lab")
                    .with_activity(Activity::new("Simulator", ActivityKind::Practical, 1)),
            )
            .with_phase(Phase::new(3, "Observation"))
            .with_phase(
                Phase::new(4, "Live surgery")
                    .with_activity(Activity::new("Prostatectomy", ActivityKind::Procedure, 1)),
            )
    }

    pub(crate) fn fixture() -> Fixture {
        fixture_with(curriculum())
    }

    pub(crate) fn fixture_with(catalog: Curriculum) -> Fixture {
        let dir = tempdir().unwrap();
        let tracker = Tracker::open(TrackerConfig::for_project(dir.path())).unwrap();
        tracker.curriculum().save(&catalog).unwrap();

        let admin = User::new("Root", "root@rt.org", Role::Administrator);
        let tutor = User::new("Gil", "gil@lapaz.es", Role::Tutor)
            .with_hospital("La Paz", "urology", "centro");
        let second_tutor = User::new("Sanz", "sanz@lapaz.es", Role::Tutor)
            .with_hospital("La Paz", "urology", "centro");
        let outside_tutor = User::new("Mora", "mora@clinic.es", Role::Tutor)
            .with_hospital("Clinic", "urology", "norte");
        let coordinator = User::new("Vega", "vega@rt.org", Role::Coordinator).with_zone("centro");
        for user in [&admin, &tutor, &second_tutor, &outside_tutor, &coordinator] {
            tracker.register_user(user).unwrap();
        }
        let resident = User::new("Ana", "ana@lapaz.es", Role::Resident)
            .with_hospital("La Paz", "urology", "centro");
        tracker.register_user(&resident).unwrap();

        Fixture {
            _dir: dir,
            tracker,
            resident,
            tutor,
            second_tutor,
            outside_tutor,
            coordinator,
            admin,
        }
    }

    #[test]
    fn registering_a_trainee_initializes_progress() {
        let f = fixture();
        let records = f.tracker.progress_for(&f.resident, f.resident.id).unwrap();
        // Phase 3 has no activities.
        assert_eq!(records.len(), 3);
        assert!(f.tracker.progress_for(&f.tutor, f.tutor.id).unwrap().is_empty());
    }

    #[test]
    fn progress_visibility_follows_scope() {
        let f = fixture();
        assert!(f.tracker.progress_for(&f.tutor, f.resident.id).is_ok());
        assert!(f.tracker.progress_for(&f.coordinator, f.resident.id).is_ok());
        assert!(f.tracker.progress_for(&f.admin, f.resident.id).is_ok());

        let err = f
            .tracker
            .progress_for(&f.outside_tutor, f.resident.id)
            .unwrap_err();
        assert_eq!(err.status_code(), 403);

        let other = User::new("Leo", "leo@lapaz.es", Role::Resident)
            .with_hospital("La Paz", "urology", "centro");
        f.tracker.register_user(&other).unwrap();
        assert_eq!(
            f.tracker.progress_for(&other, f.resident.id).unwrap_err().status_code(),
            403
        );
    }

    #[test]
    fn unknown_ids_are_not_found() {
        let f = fixture();
        assert_eq!(f.tracker.caller(Uuid::new_v4()).unwrap_err().status_code(), 404);
        assert_eq!(
            f.tracker.progress(&f.admin, Uuid::new_v4()).unwrap_err().status_code(),
            404
        );
    }

    #[test]
    fn inbox_operations_are_scoped_to_the_caller() {
        let f = fixture();
        let first = &f.tracker.progress_for(&f.resident, f.resident.id).unwrap()[0];
        f.tracker
            .mark_completed(&f.resident, first.id, 0, Default::default())
            .unwrap();
        f.tracker
            .mark_completed(&f.resident, first.id, 1, Default::default())
            .unwrap();

        assert_eq!(f.tracker.unread_count(&f.tutor).unwrap(), 2);
        let inbox = f.tracker.inbox(&f.tutor, true).unwrap();
        assert!(f.tracker.mark_read(&f.tutor, inbox[0].id).unwrap());
        assert!(!f.tracker.mark_read(&f.tutor, inbox[0].id).unwrap());
        assert_eq!(
            f.tracker.mark_read(&f.resident, inbox[1].id).unwrap_err().status_code(),
            403
        );
        assert_eq!(f.tracker.mark_all_read(&f.tutor).unwrap(), 1);
        assert_eq!(f.tracker.unread_count(&f.tutor).unwrap(), 0);
        assert_eq!(f.tracker.inbox(&f.tutor, false).unwrap().len(), 2);
        // The other tutor's copies are untouched.
        assert_eq!(f.tracker.unread_count(&f.second_tutor).unwrap(), 2);
    }

    #[test]
    fn transitions_land_in_the_audit_trail() {
        let f = fixture();
        let first = &f.tracker.progress_for(&f.resident, f.resident.id).unwrap()[0];
        f.tracker
            .mark_completed(&f.resident, first.id, 0, Default::default())
            .unwrap();

        let log = &f.tracker.config().audit_log;
        let entries = AuditTrail::read_all(log).unwrap();
        let actions: Vec<&str> = entries.iter().map(|e| e.action.as_str()).collect();
        assert_eq!(actions, vec!["progress_initialized", "activity_completed"]);
        assert_eq!(AuditTrail::verify(log).unwrap(), 2);
    }
}
