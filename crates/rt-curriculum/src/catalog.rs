// catalog.rs — Curriculum data model: tracks, phases and their activities.
//
// A curriculum is an ordered list of phases, each owning an ordered list of
// activities. Two curricula exist side by side (residency and society) and
// share this exact shape; a user's track decides which one applies.
//
// Phases carry two orderings:
//   number — the published position, used when progress is initialized
//   order  — the unlock order, editable by administrators, used by the cascade

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::CurriculumError;

/// Which curriculum a user follows.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Track {
    /// Hospital residents.
    Residency,
    /// Participants enrolled through a medical society.
    Society,
}

impl Track {
    pub const ALL: [Track; 2] = [Track::Residency, Track::Society];

    pub fn as_str(&self) -> &'static str {
        match self {
            Track::Residency => "residency",
            Track::Society => "society",
        }
    }
}

impl fmt::Display for Track {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Track {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "residency" => Ok(Track::Residency),
            "society" => Ok(Track::Society),
            other => Err(format!(
                "unknown track '{}' (expected 'residency' or 'society')",
                other
            )),
        }
    }
}

/// What kind of work an activity represents.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    Theoretical,
    Practical,
    Evaluation,
    Observation,
    /// A surgical procedure; carries surgery metadata when completed.
    #[serde(alias = "surgery")]
    Procedure,
}

impl fmt::Display for ActivityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ActivityKind::Theoretical => "theoretical",
            ActivityKind::Practical => "practical",
            ActivityKind::Evaluation => "evaluation",
            ActivityKind::Observation => "observation",
            ActivityKind::Procedure => "procedure",
        };
        f.write_str(name)
    }
}

/// A catalog activity. Belongs to exactly one phase.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Activity {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,

    /// Owning phase. Import files may omit it; [`Curriculum::normalize`] fills it in.
    #[serde(default)]
    pub phase_id: Uuid,

    pub name: String,

    #[serde(default)]
    pub description: String,

    pub kind: ActivityKind,

    /// Completion must be reviewed by a validator.
    #[serde(default = "default_true")]
    pub requires_validation: bool,

    /// The validator must sign when approving.
    #[serde(default)]
    pub requires_signature: bool,

    /// The resident must report a participation percentage.
    #[serde(default)]
    pub requires_percentage: bool,

    /// The resident must attach a document reference.
    #[serde(default)]
    pub requires_attachment: bool,

    #[serde(default)]
    pub order: u32,
}

fn default_true() -> bool {
    true
}

impl Activity {
    pub fn new(name: impl Into<String>, kind: ActivityKind, order: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            phase_id: Uuid::nil(),
            name: name.into(),
            description: String::new(),
            kind,
            requires_validation: true,
            requires_signature: false,
            requires_percentage: false,
            requires_attachment: false,
            order,
        }
    }
}

/// An ordered stage of the curriculum.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Phase {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,

    /// Published position, starting at 1.
    pub number: u32,

    pub name: String,

    #[serde(default)]
    pub description: String,

    /// Unlock order. Zero in an import file means "same as `number`".
    #[serde(default)]
    pub order: u32,

    #[serde(default)]
    pub activities: Vec<Activity>,
}

impl Phase {
    pub fn new(number: u32, name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            number,
            name: name.into(),
            description: String::new(),
            order: number,
            activities: Vec::new(),
        }
    }

    /// Append an activity, binding it to this phase.
    pub fn with_activity(mut self, mut activity: Activity) -> Self {
        activity.phase_id = self.id;
        self.activities.push(activity);
        self
    }

    /// Activities sorted by their `order` field.
    pub fn ordered_activities(&self) -> Vec<&Activity> {
        let mut activities: Vec<&Activity> = self.activities.iter().collect();
        activities.sort_by_key(|a| a.order);
        activities
    }

    pub fn activity(&self, activity_id: Uuid) -> Option<&Activity> {
        self.activities.iter().find(|a| a.id == activity_id)
    }
}

/// The full phase catalog of one track.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Curriculum {
    pub track: Track,
    #[serde(default)]
    pub phases: Vec<Phase>,
}

impl Curriculum {
    pub fn new(track: Track) -> Self {
        Self {
            track,
            phases: Vec::new(),
        }
    }

    pub fn with_phase(mut self, phase: Phase) -> Self {
        self.phases.push(phase);
        self
    }

    /// Fill in defaults left out of hand-written catalogs: phase `order`
    /// falls back to `number`, activities point at their owning phase.
    pub fn normalize(&mut self) {
        for phase in &mut self.phases {
            if phase.order == 0 {
                phase.order = phase.number;
            }
            for activity in &mut phase.activities {
                activity.phase_id = phase.id;
            }
        }
    }

    /// Check the structural rules of the catalog.
    pub fn validate(&self) -> Result<(), CurriculumError> {
        let mut ids = HashSet::new();
        let mut numbers = HashSet::new();
        let mut orders = HashSet::new();

        for phase in &self.phases {
            if phase.number == 0 {
                return Err(self.invalid(format!("phase '{}' has number 0", phase.name)));
            }
            if !ids.insert(phase.id) {
                return Err(self.invalid(format!("duplicate phase id {}", phase.id)));
            }
            if !numbers.insert(phase.number) {
                return Err(self.invalid(format!("duplicate phase number {}", phase.number)));
            }
            if !orders.insert(phase.order) {
                return Err(self.invalid(format!("duplicate phase order {}", phase.order)));
            }
            for activity in &phase.activities {
                if activity.phase_id != phase.id {
                    return Err(self.invalid(format!(
                        "activity '{}' does not belong to phase '{}'",
                        activity.name, phase.name
                    )));
                }
            }
        }
        Ok(())
    }

    /// Phases in published order (ascending `number`).
    pub fn phases_by_number(&self) -> Vec<&Phase> {
        let mut phases: Vec<&Phase> = self.phases.iter().collect();
        phases.sort_by_key(|p| p.number);
        phases
    }

    pub fn phase(&self, phase_id: Uuid) -> Option<&Phase> {
        self.phases.iter().find(|p| p.id == phase_id)
    }

    /// The phase that unlocks after `phase_id`: the smallest `order`
    /// strictly greater than the current phase's `order`.
    pub fn next_after(&self, phase_id: Uuid) -> Option<&Phase> {
        let current = self.phase(phase_id)?;
        self.phases
            .iter()
            .filter(|p| p.order > current.order)
            .min_by_key(|p| p.order)
    }

    /// Move a phase to a new unlock position. Orders stay unique.
    pub fn reorder(&mut self, phase_id: Uuid, new_order: u32) -> Result<(), CurriculumError> {
        if new_order == 0 {
            return Err(self.invalid("order must be at least 1".to_string()));
        }
        if self
            .phases
            .iter()
            .any(|p| p.id != phase_id && p.order == new_order)
        {
            return Err(self.invalid(format!("order {} is already taken", new_order)));
        }
        let track = self.track;
        let phase = self
            .phases
            .iter_mut()
            .find(|p| p.id == phase_id)
            .ok_or(CurriculumError::PhaseNotFound { track, phase_id })?;
        phase.order = new_order;
        Ok(())
    }

    fn invalid(&self, reason: String) -> CurriculumError {
        CurriculumError::Invalid {
            track: self.track,
            reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn three_phases() -> Curriculum {
        let mut c = Curriculum::new(Track::Residency)
            .with_phase(
                Phase::new(1, "Foundations")
                    .with_activity(Activity::new("Console basics", ActivityKind::Theoretical, 1)),
            )
            .with_phase(
                Phase::new(2, "Simulation")
                    .with_activity(Activity::new("Dry lab", ActivityKind::Practical, 1)),
            )
            .with_phase(
                Phase::new(3, "Bedside")
                    .with_activity(Activity::new("Docking", ActivityKind::Procedure, 1)),
            );
        c.normalize();
        c
    }

    #[test]
    fn next_after_follows_order_not_number() {
        let mut c = three_phases();
        let first = c.phases[0].id;
        let second = c.phases[1].id;
        let third = c.phases[2].id;
        // Move phase 3 ahead of phase 2 in the unlock order.
        c.reorder(third, 2).unwrap_err();
        c.reorder(second, 5).unwrap();
        c.reorder(third, 2).unwrap();

        assert_eq!(c.next_after(first).unwrap().id, third);
    }

    #[test]
    fn last_phase_has_no_successor() {
        let c = three_phases();
        assert!(c.next_after(c.phases[2].id).is_none());
    }

    #[test]
    fn reorder_rejects_taken_order() {
        let mut c = three_phases();
        let id = c.phases[0].id;
        let err = c.reorder(id, 2).unwrap_err();
        assert!(matches!(err, CurriculumError::Invalid { .. }));
    }

    #[test]
    fn reorder_unknown_phase_is_not_found() {
        let mut c = three_phases();
        let err = c.reorder(Uuid::new_v4(), 9).unwrap_err();
        assert!(matches!(err, CurriculumError::PhaseNotFound { .. }));
    }

    #[test]
    fn normalize_defaults_order_to_number() {
        let json = r#"{
            "track": "society",
            "phases": [
                {"number": 2, "name": "B", "activities": [{"name": "x", "kind": "surgery"}]},
                {"number": 1, "name": "A"}
            ]
        }"#;
        let mut c: Curriculum = serde_json::from_str(json).unwrap();
        c.normalize();
        c.validate().unwrap();

        let b = &c.phases[0];
        assert_eq!(b.order, 2);
        assert_eq!(b.activities[0].phase_id, b.id);
        assert_eq!(b.activities[0].kind, ActivityKind::Procedure);
        assert!(b.activities[0].requires_validation);
        let names: Vec<&str> = c.phases_by_number().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B"]);
    }

    #[test]
    fn validate_rejects_duplicate_numbers() {
        let mut c = Curriculum::new(Track::Residency)
            .with_phase(Phase::new(1, "A"))
            .with_phase(Phase::new(1, "B"));
        c.phases[1].order = 2;
        assert!(c.validate().is_err());
    }

    #[test]
    fn ordered_activities_sorts_by_order() {
        let phase = Phase::new(1, "A")
            .with_activity(Activity::new("second", ActivityKind::Practical, 2))
            .with_activity(Activity::new("first", ActivityKind::Theoretical, 1));
        let names: Vec<&str> = phase
            .ordered_activities()
            .iter()
            .map(|a| a.name.as_str())
            .collect();
        assert_eq!(names, vec!["first", "second"]);
    }

    #[test]
    fn track_parses_and_displays() {
        assert_eq!("society".parse::<Track>().unwrap(), Track::Society);
        assert!("hospital".parse::<Track>().is_err());
        assert_eq!(Track::Residency.to_string(), "residency");
    }
}
