//! Chronological traversal over a series' minutes chain.
//!
//! # Responsibility
//! - Resolve the `first_minutes_id`/`next_minutes_id` link fields into
//!   loaded revisions, in authoring order.
//!
//! # Invariants
//! - `Ok(None)` means end of chain, never an error.
//! - A link id that resolves to no stored revision is a fatal
//!   `MinutesNotFound`; chains must not dangle.

use crate::model::minutes::{Minutes, MinutesId};
use crate::model::series::MeetingSeries;
use crate::repo::minutes_repo::MinutesRepository;
use crate::repo::{RepoError, RepoResult};

/// Link-chasing reader over the minutes collection.
pub struct MinutesFinder<'repo, R: MinutesRepository> {
    repo: &'repo R,
}

impl<'repo, R: MinutesRepository> MinutesFinder<'repo, R> {
    /// Creates a finder using the provided repository implementation.
    pub fn new(repo: &'repo R) -> Self {
        Self { repo }
    }

    /// Returns the chronologically first revision of a series.
    pub fn first_minutes_of_series(&self, series: &MeetingSeries) -> RepoResult<Option<Minutes>> {
        self.resolve_link(series.first_minutes_id)
    }

    /// Returns the revision authored directly after the given one.
    pub fn next_minutes(&self, minutes: &Minutes) -> RepoResult<Option<Minutes>> {
        self.resolve_link(minutes.next_minutes_id)
    }

    fn resolve_link(&self, link: Option<MinutesId>) -> RepoResult<Option<Minutes>> {
        let Some(id) = link else {
            return Ok(None);
        };
        match self.repo.get_minutes(id)? {
            Some(minutes) => Ok(Some(minutes)),
            None => Err(RepoError::MinutesNotFound(id)),
        }
    }
}
