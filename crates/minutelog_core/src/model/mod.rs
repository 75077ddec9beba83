//! Domain model for the meeting-minutes store.
//!
//! # Responsibility
//! - Define the canonical records shared by repositories and the migration.
//! - Keep one value-typed shape for topics embedded in minutes and for the
//!   flat topic collection.
//!
//! # Invariants
//! - Every record carries a stable identifier that is never reused.
//! - Backfillable timestamps are optional so the reversal pass can remove
//!   them from persisted documents.

pub mod minutes;
pub mod series;
pub mod topic;
