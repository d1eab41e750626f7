//! Snapshot wire/boundary support for the ANC engine.
//!
//! This crate provides **wire models** and **translation helpers** for read-only exports of the
//! dashboard's application state:
//! - `users[]`: patients (role `USER`) and staff accounts
//! - `ancVisits[]`: antenatal control visits
//!
//! This crate focuses on:
//! - strict deserialisation of JSON or YAML (`deny_unknown_fields`, errors carry a field path)
//! - translation of wire records into `anc_core` domain types
//!
//! Snapshots are never written back.

pub mod state;
pub mod users;
pub mod visits;

pub use state::{Snapshot, SnapshotFormat};
pub use users::{StaffMember, UserRole};

/// Errors returned by the `anc-snapshot` boundary crate.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("translation error: {0}")]
    Translation(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("unsupported snapshot format: .{0} (expected .json, .yaml or .yml)")]
    UnsupportedFormat(String),
}

/// Type alias for Results that can fail with a [`SnapshotError`].
pub type SnapshotResult<T> = Result<T, SnapshotError>;
