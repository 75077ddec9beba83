//! One-time data migrations over the minutes store.
//!
//! # Responsibility
//! - House forward/reverse data migrations that rewrite stored documents.
//!
//! # Invariants
//! - Migrations run single-threaded and sequentially; a failed write aborts
//!   the whole run with no partial-failure recovery.

pub mod timestamp_backfill;

pub use timestamp_backfill::{apply, revert, BackfillSummary, ReversalSummary};
