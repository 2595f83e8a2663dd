//! # rt-audit
//!
//! Append-only, hash-chained audit trail for the Residency Tracker.
//!
//! Every progress transition (completion, validation, rejection, phase state
//! change, unlock) is recorded as one [`AuditEntry`] line in a JSONL file.
//! Each line carries the SHA-256 of the line before it, and
//! [`AuditTrail::verify`] walks the chain to detect tampering.

pub mod entry;
pub mod error;
pub mod hasher;
pub mod trail;

pub use entry::AuditEntry;
pub use error::AuditError;
pub use trail::AuditTrail;
