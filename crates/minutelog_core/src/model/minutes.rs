//! Minutes (revision) domain model.
//!
//! # Invariants
//! - `created_at` is intrinsic to the revision and always present.
//! - `topics` embeds topic records **by value**; the same logical topic may
//!   appear, by value, inside multiple revisions of one series.
//! - `next_minutes_id` establishes chronological order within a series.

use crate::model::series::SeriesId;
use crate::model::topic::Topic;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for one minutes revision.
pub type MinutesId = Uuid;

/// One versioned snapshot in a series' revision chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Minutes {
    /// Stable global ID.
    pub id: MinutesId,
    /// Owning series.
    pub series_id: SeriesId,
    /// Unix epoch milliseconds. When this revision was authored.
    pub created_at: i64,
    /// Marks the revision as the authoritative, closed version.
    pub is_finalized: bool,
    /// Link to the chronologically next revision. `None` ends the chain.
    pub next_minutes_id: Option<MinutesId>,
    /// Topic records embedded by value.
    pub topics: Vec<Topic>,
}

impl Minutes {
    /// Creates a draft revision with a generated stable ID and no topics.
    pub fn new(series_id: SeriesId, created_at: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            series_id,
            created_at,
            is_finalized: false,
            next_minutes_id: None,
            topics: Vec::new(),
        }
    }
}
