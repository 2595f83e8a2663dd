// access.rs — Who may review whose work.
//
// Checked in order:
// 1. Does the reviewer hold validator capability? → No → Deny
// 2. Administrator? → Allow
// 3. Is the reviewer on the trainee's track? → No → Deny
// 4. Role scope:
//      tutor       — same hospital and specialty
//      coordinator — same zone
//      professor   — same society
// 5. No match → Deny

use serde::{Deserialize, Serialize};

use crate::user::{Role, User};

/// Outcome of a review-scope check.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum ReviewDecision {
    Allow,
    Deny { reason: String },
}

impl ReviewDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, ReviewDecision::Allow)
    }
}

/// Decide whether `reviewer` may validate or reject work owned by `trainee`.
pub fn review_decision(reviewer: &User, trainee: &User) -> ReviewDecision {
    if !reviewer.role.has_validator_capability() {
        return deny(format!("role '{}' cannot validate activities", reviewer.role));
    }
    if reviewer.role == Role::Administrator {
        return ReviewDecision::Allow;
    }
    if reviewer.track != trainee.track {
        return deny(format!(
            "reviewer follows the {} track, trainee follows {}",
            reviewer.track, trainee.track
        ));
    }

    match reviewer.role {
        Role::Tutor => match same("hospital", &reviewer.hospital, &trainee.hospital) {
            ReviewDecision::Allow => same("specialty", &reviewer.specialty, &trainee.specialty),
            denied => denied,
        },
        Role::Coordinator => same("zone", &reviewer.zone, &trainee.zone),
        Role::Professor => same("society", &reviewer.society, &trainee.society),
        _ => deny(format!("role '{}' has no review scope", reviewer.role)),
    }
}

/// Whether `actor` may act on work owned by `owner_id` as its owner.
pub fn acts_as_owner(actor: &User, owner_id: uuid::Uuid) -> bool {
    actor.id == owner_id || actor.role == Role::Administrator
}

fn same(field: &str, reviewer: &Option<String>, trainee: &Option<String>) -> ReviewDecision {
    match (reviewer, trainee) {
        (Some(a), Some(b)) if a == b => ReviewDecision::Allow,
        _ => deny(format!("{} mismatch between reviewer and trainee", field)),
    }
}

fn deny(reason: String) -> ReviewDecision {
    ReviewDecision::Deny { reason }
}
