// report.rs — Per-trainee progress summary and certificate eligibility.

use rt_curriculum::Track;
use rt_directory::User;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ProgressError;
use crate::progress::{PhaseState, Progress};
use crate::tracker::Tracker;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhaseSummary {
    pub progress_id: Uuid,
    pub phase_number: u32,
    pub phase_name: String,
    pub state: PhaseState,
    pub validated_activities: usize,
    pub total_activities: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressReport {
    pub resident_id: Uuid,
    pub resident_name: String,
    pub track: Track,
    pub phases: Vec<PhaseSummary>,
    pub validated_activities: usize,
    pub total_activities: usize,
    /// Validated share of all activities, rounded down.
    pub percent_validated: u8,
    /// Every phase validated.
    pub certificate_eligible: bool,
}

impl ProgressReport {
    pub fn build(resident: &User, records: &[Progress]) -> Self {
        let phases: Vec<PhaseSummary> = records
            .iter()
            .map(|p| PhaseSummary {
                progress_id: p.id,
                phase_number: p.phase_number,
                phase_name: p.phase_name.clone(),
                state: p.state,
                validated_activities: p.validated_count(),
                total_activities: p.activities.len(),
            })
            .collect();

        let validated: usize = phases.iter().map(|p| p.validated_activities).sum();
        let total: usize = phases.iter().map(|p| p.total_activities).sum();
        let percent = if total == 0 {
            0
        } else {
            (validated * 100 / total) as u8
        };

        Self {
            resident_id: resident.id,
            resident_name: resident.name.clone(),
            track: resident.track,
            certificate_eligible: !phases.is_empty()
                && phases.iter().all(|p| p.state == PhaseState::Validated),
            phases,
            validated_activities: validated,
            total_activities: total,
            percent_validated: percent,
        }
    }
}

impl Tracker {
    pub fn report(&self, actor: &User, resident_id: Uuid) -> Result<ProgressReport, ProgressError> {
        let resident = self.users.require(resident_id)?;
        self.ensure_can_view(actor, &resident)?;
        let records = self.progress.list_for_resident(resident_id)?;
        Ok(ProgressReport::build(&resident, &records))
    }
}

#[cfg(test)]
mod tests {
    use super::ProgressReport;
    use crate::progress::{CompletionPayload, ReviewPayload};
    use crate::tracker::tests::fixture;

    #[test]
    fn no_records_is_not_eligible() {
        let f = fixture();
        let report = ProgressReport::build(&f.resident, &[]);
        assert_eq!(report.total_activities, 0);
        assert_eq!(report.percent_validated, 0);
        assert!(!report.certificate_eligible);
    }

    #[test]
    fn fresh_resident_has_zero_percent() {
        let f = fixture();
        let report = f.tracker.report(&f.resident, f.resident.id).unwrap();
        assert_eq!(report.phases.len(), 3);
        assert_eq!(report.total_activities, 4);
        assert_eq!(report.percent_validated, 0);
        assert!(!report.certificate_eligible);
    }

    #[test]
    fn percent_and_eligibility_follow_validations() {
        let f = fixture();
        let records = f.tracker.progress_for(&f.admin, f.resident.id).unwrap();
        for record in &records {
            for index in 0..record.activities.len() {
                f.tracker
                    .mark_completed(&f.resident, record.id, index, CompletionPayload::default())
                    .unwrap();
                f.tracker
                    .validate(&f.tutor, record.id, index, ReviewPayload::default())
                    .unwrap();
            }
            if record.phase_number == 1 {
                let report = f.tracker.report(&f.tutor, f.resident.id).unwrap();
                assert_eq!(report.validated_activities, 2);
                assert_eq!(report.percent_validated, 50);
            }
        }

        let report = f.tracker.report(&f.admin, f.resident.id).unwrap();
        assert_eq!(report.percent_validated, 100);
        assert!(report.certificate_eligible);
    }

    #[test]
    fn report_respects_visibility() {
        let f = fixture();
        let err = f
            .tracker
            .report(&f.outside_tutor, f.resident.id)
            .unwrap_err();
        assert_eq!(err.status_code(), 403);
    }
}
