//! # rt-curriculum
//!
//! Phase and activity catalog for the Residency Tracker.
//!
//! Two curricula exist side by side, one per [`Track`]: hospital residents and
//! society participants. Both are an ordered list of [`Phase`]s, each owning
//! ordered [`Activity`] entries. From the progress engine's point of view the
//! catalog is read-only; administrators edit it through [`CurriculumStore`].

pub mod catalog;
pub mod error;
pub mod store;

pub use catalog::{Activity, ActivityKind, Curriculum, Phase, Track};
pub use error::CurriculumError;
pub use store::CurriculumStore;
