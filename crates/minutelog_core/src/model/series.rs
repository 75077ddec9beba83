//! Meeting series domain model.
//!
//! # Invariants
//! - `id` is stable and never reused for another series.
//! - Revision order is defined by the minutes link chain starting at
//!   `first_minutes_id`, never by any array position.

use crate::model::minutes::MinutesId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for a meeting series.
pub type SeriesId = Uuid;

/// A named owner of an ordered, singly-linked chain of minutes revisions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeetingSeries {
    /// Stable global ID.
    pub id: SeriesId,
    /// Display name of the series.
    pub name: String,
    /// Head of the revision chain. `None` means the series has no minutes.
    pub first_minutes_id: Option<MinutesId>,
}

impl MeetingSeries {
    /// Creates a series with a generated stable ID and no minutes yet.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            first_minutes_id: None,
        }
    }
}
