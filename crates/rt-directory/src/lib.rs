//! # rt-directory
//!
//! Users, roles and review scopes for the Residency Tracker.
//!
//! - [`User`] / [`Role`] — who someone is and which curriculum they follow
//! - [`Role::has_validator_capability`] — the single check for "may validate"
//! - [`review_decision`] — whether a reviewer's hospital, zone or society
//!   covers a given trainee
//! - [`UserStore`] — JSON file-based persistence for user records

pub mod access;
pub mod error;
pub mod store;
pub mod user;

pub use access::{acts_as_owner, review_decision, ReviewDecision};
pub use error::DirectoryError;
pub use store::UserStore;
pub use user::{Role, User};
