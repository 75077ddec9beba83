//! Core domain logic for the minutelog minutes store.
//! This crate is the single source of truth for the timestamp backfill
//! migration and its storage contracts.

pub mod db;
pub mod logging;
pub mod migrate;
pub mod model;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status};
pub use migrate::{apply, revert, BackfillSummary, ReversalSummary};
pub use model::minutes::{Minutes, MinutesId};
pub use model::series::{MeetingSeries, SeriesId};
pub use model::topic::{Detail, InfoItem, Topic, TopicValidationError};
pub use repo::minutes_repo::{MinutesRepository, SqliteMinutesRepository};
pub use repo::series_repo::{SeriesRepository, SqliteSeriesRepository};
pub use repo::topic_repo::{SqliteTopicRepository, TopicRepository};
pub use repo::{RepoError, RepoResult};
pub use service::minutes_finder::MinutesFinder;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
