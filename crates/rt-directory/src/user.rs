// user.rs — User records and roles.
//
// Every user has exactly one role. Trainee roles (resident, participant) own
// progress records; the remaining roles review or administer them. Which
// curriculum a user follows is recorded as their `track`.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use rt_curriculum::Track;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DirectoryError;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Hospital resident on the residency track.
    Resident,
    /// Society member on the society track.
    Participant,
    /// Reviews residents of one hospital and specialty.
    Tutor,
    /// Surgical coordinator for a zone (CSM).
    #[serde(alias = "csm")]
    Coordinator,
    /// Reviews participants of one society.
    Professor,
    Administrator,
}

impl Role {
    /// Roles that may validate or reject completed activities.
    pub fn has_validator_capability(&self) -> bool {
        matches!(
            self,
            Role::Tutor | Role::Coordinator | Role::Professor | Role::Administrator
        )
    }

    /// Roles that follow a curriculum and own progress records.
    pub fn is_trainee(&self) -> bool {
        matches!(self, Role::Resident | Role::Participant)
    }

    /// The track a user of this role follows by default.
    pub fn default_track(&self) -> Track {
        match self {
            Role::Participant | Role::Professor => Track::Society,
            Role::Resident | Role::Tutor | Role::Coordinator | Role::Administrator => {
                Track::Residency
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Resident => "resident",
            Role::Participant => "participant",
            Role::Tutor => "tutor",
            Role::Coordinator => "coordinator",
            Role::Professor => "professor",
            Role::Administrator => "administrator",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "resident" => Ok(Role::Resident),
            "participant" => Ok(Role::Participant),
            "tutor" => Ok(Role::Tutor),
            "coordinator" | "csm" => Ok(Role::Coordinator),
            "professor" => Ok(Role::Professor),
            "administrator" | "admin" => Ok(Role::Administrator),
            other => Err(format!("unknown role '{}'", other)),
        }
    }
}

/// A registered user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,

    /// Curriculum followed (program type).
    pub track: Track,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hospital: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specialty: Option<String>,

    /// Geographic zone; for residents it is the zone of their hospital.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zone: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub society: Option<String>,

    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(name: impl Into<String>, email: impl Into<String>, role: Role) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            email: email.into(),
            role,
            track: role.default_track(),
            hospital: None,
            specialty: None,
            zone: None,
            society: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_hospital(
        mut self,
        hospital: impl Into<String>,
        specialty: impl Into<String>,
        zone: impl Into<String>,
    ) -> Self {
        self.hospital = Some(hospital.into());
        self.specialty = Some(specialty.into());
        self.zone = Some(zone.into());
        self
    }

    pub fn with_zone(mut self, zone: impl Into<String>) -> Self {
        self.zone = Some(zone.into());
        self
    }

    pub fn with_society(mut self, society: impl Into<String>) -> Self {
        self.society = Some(society.into());
        self
    }

    /// Check the fields a user of this role needs.
    ///
    /// - residents and tutors: hospital and specialty
    /// - participants and professors: society
    /// - coordinators: zone
    pub fn validate(&self) -> Result<(), DirectoryError> {
        if self.name.trim().is_empty() {
            return Err(self.invalid("name is empty"));
        }
        if !email_pattern().is_match(&self.email) {
            return Err(self.invalid("malformed e-mail address"));
        }
        match self.role {
            Role::Resident | Role::Tutor => {
                if self.hospital.is_none() || self.specialty.is_none() {
                    return Err(self.invalid("hospital and specialty are required"));
                }
            }
            Role::Participant | Role::Professor => {
                if self.society.is_none() {
                    return Err(self.invalid("society is required"));
                }
            }
            Role::Coordinator => {
                if self.zone.is_none() {
                    return Err(self.invalid("zone is required"));
                }
            }
            Role::Administrator => {}
        }
        if self.role.is_trainee() && self.track != self.role.default_track() {
            return Err(self.invalid("track does not match role"));
        }
        Ok(())
    }

    fn invalid(&self, reason: &str) -> DirectoryError {
        DirectoryError::InvalidUser {
            email: self.email.clone(),
            reason: reason.to_string(),
        }
    }
}

fn email_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("e-mail pattern is a valid regex")
    })
}
