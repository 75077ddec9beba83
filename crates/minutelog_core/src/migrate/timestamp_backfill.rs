//! Hierarchical timestamp backfill over every series' minutes chain.
//!
//! # Responsibility
//! - Assign `created_at`/`updated_at` to every topic, info item and detail,
//!   nested or flat, across all revisions of all series.
//! - Provide the exact inverse: strip both fields everywhere.
//!
//! # Invariants
//! - Once a record id has been seen inside a *finalized* revision of a
//!   series, its stamp pair is fixed for the rest of that series' walk;
//!   every later sighting reuses it verbatim, even when the enclosing
//!   revision's own `created_at` differs. Timestamps track "first finalized
//!   appearance", not "last revision seen".
//! - A record never seen in a finalized revision of the current series gets
//!   both fields from the enclosing revision's `created_at`.
//! - Per-kind stamp memory is scoped to exactly one series; identical ids
//!   in different series are independent.
//! - Every revision visit persists the full rebuilt `topics` field through
//!   the raw write path, drafts included.

use crate::model::minutes::Minutes;
use crate::model::topic::{Detail, InfoItem, Topic};
use crate::repo::minutes_repo::{MinutesRepository, SqliteMinutesRepository};
use crate::repo::series_repo::{SeriesRepository, SqliteSeriesRepository};
use crate::repo::topic_repo::{SqliteTopicRepository, TopicRepository};
use crate::repo::{RepoError, RepoResult};
use crate::service::minutes_finder::MinutesFinder;
use log::{error, info};
use rusqlite::Connection;
use std::collections::HashMap;
use std::time::Instant;

/// A resolved `created_at`/`updated_at` assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StampPair {
    pub created_at: i64,
    pub updated_at: i64,
}

impl StampPair {
    fn at(epoch_ms: i64) -> Self {
        Self {
            created_at: epoch_ms,
            updated_at: epoch_ms,
        }
    }
}

/// One stampable record kind.
///
/// Implemented for the three nested kinds so one stamper serves all of
/// them; each kind keeps its own identity namespace and memory map.
trait StampRecord: Clone {
    fn record_id(&self) -> &str;
    fn stamp_pair(&self) -> Option<StampPair>;
    fn set_stamp_pair(&mut self, pair: StampPair);
}

macro_rules! impl_stamp_record {
    ($record:ty) => {
        impl StampRecord for $record {
            fn record_id(&self) -> &str {
                &self.id
            }

            fn stamp_pair(&self) -> Option<StampPair> {
                Some(StampPair {
                    created_at: self.created_at?,
                    updated_at: self.updated_at?,
                })
            }

            fn set_stamp_pair(&mut self, pair: StampPair) {
                self.created_at = Some(pair.created_at);
                self.updated_at = Some(pair.updated_at);
            }
        }
    };
}

impl_stamp_record!(Topic);
impl_stamp_record!(InfoItem);
impl_stamp_record!(Detail);

/// Decides one record's stamp pair against the per-kind memory.
///
/// Known id: the memorized pair is copied verbatim. Unknown id: both fields
/// become `fallback_ms`. In a finalized context the memory entry is then
/// written (or overwritten) with the full stamped record, so topic memory
/// carries the `info_items` the flush needs.
fn stamp<R: StampRecord>(
    mut record: R,
    memory: &mut HashMap<String, R>,
    fallback_ms: i64,
    finalized: bool,
) -> R {
    let pair = memory
        .get(record.record_id())
        .and_then(R::stamp_pair)
        .unwrap_or_else(|| StampPair::at(fallback_ms));
    record.set_stamp_pair(pair);
    if finalized {
        memory.insert(record.record_id().to_owned(), record.clone());
    }
    record
}

/// Per-series stamp memory, one map per record kind.
///
/// Owned by the series walk and passed by `&mut` into every revision;
/// cleared before the next series starts so ids never leak across series.
#[derive(Debug, Default)]
struct SeriesStampContext {
    topics: HashMap<String, Topic>,
    items: HashMap<String, InfoItem>,
    details: HashMap<String, Detail>,
}

impl SeriesStampContext {
    fn clear(&mut self) {
        self.topics.clear();
        self.items.clear();
        self.details.clear();
    }
}

/// Stamps every record nested in one revision and persists the result.
///
/// Rebuilds the topic tree from stamped children instead of mutating shared
/// structures; details are stamped before their item, items before their
/// topic, so a memorized topic embeds its already-stamped children.
fn process_minutes<M: MinutesRepository>(
    repo: &M,
    ctx: &mut SeriesStampContext,
    minutes: &Minutes,
) -> RepoResult<()> {
    let fallback_ms = minutes.created_at;
    let finalized = minutes.is_finalized;

    let stamped: Vec<Topic> = minutes
        .topics
        .iter()
        .cloned()
        .map(|mut topic| {
            topic.info_items = topic
                .info_items
                .into_iter()
                .map(|mut item| {
                    item.details = item
                        .details
                        .into_iter()
                        .map(|detail| stamp(detail, &mut ctx.details, fallback_ms, finalized))
                        .collect();
                    stamp(item, &mut ctx.items, fallback_ms, finalized)
                })
                .collect();
            stamp(topic, &mut ctx.topics, fallback_ms, finalized)
        })
        .collect();

    // Raw path: migrated data may carry empty-string fields that the
    // validated write would reject.
    repo.update_topics_raw(minutes.id, &stamped)
}

/// Writes the authoritative stamped state of every finalized topic back to
/// the flat collection.
///
/// Only topics flush; items and details travel inside `info_items`. A topic
/// id with no flat row is skipped, matching the collection's update-if-
/// present semantics.
fn flush_finalized_topics<T: TopicRepository>(
    repo: &T,
    topics: &HashMap<String, Topic>,
) -> RepoResult<usize> {
    let mut flushed = 0;
    for (id, topic) in topics {
        let pair = topic.stamp_pair().ok_or_else(|| {
            RepoError::InvalidData(format!("finalized topic `{id}` carries no stamp pair"))
        })?;
        if repo.apply_backfill(id, pair.created_at, pair.updated_at, &topic.info_items)? {
            flushed += 1;
        }
    }
    Ok(flushed)
}

/// Outcome counts of one forward run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BackfillSummary {
    pub series_walked: usize,
    pub minutes_processed: usize,
    pub topics_flushed: usize,
}

/// Outcome counts of one reversal run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReversalSummary {
    pub flat_topics_stripped: usize,
    pub minutes_stripped: usize,
}

/// Forward entry point: walks every series and backfills timestamps.
///
/// # Side effects
/// - One raw `topics` write per revision visited, one direct flat-topic
///   update per finalized topic per series.
/// - Emits `timestamp_backfill` logging events.
///
/// # Errors
/// - Any storage or malformed-record failure aborts the run as-is; a rerun
///   must start from scratch after investigation.
pub fn apply(conn: &Connection) -> RepoResult<BackfillSummary> {
    let started_at = Instant::now();
    info!("event=timestamp_backfill module=migrate status=start");

    match walk_all_series(conn) {
        Ok(summary) => {
            info!(
                "event=timestamp_backfill module=migrate status=ok series={} minutes={} topics_flushed={} duration_ms={}",
                summary.series_walked,
                summary.minutes_processed,
                summary.topics_flushed,
                started_at.elapsed().as_millis()
            );
            Ok(summary)
        }
        Err(err) => {
            error!(
                "event=timestamp_backfill module=migrate status=error duration_ms={} error={}",
                started_at.elapsed().as_millis(),
                err
            );
            Err(err)
        }
    }
}

fn walk_all_series(conn: &Connection) -> RepoResult<BackfillSummary> {
    let series_repo = SqliteSeriesRepository::try_new(conn)?;
    let minutes_repo = SqliteMinutesRepository::try_new(conn)?;
    let topic_repo = SqliteTopicRepository::try_new(conn)?;
    let finder = MinutesFinder::new(&minutes_repo);

    let mut summary = BackfillSummary::default();
    let mut ctx = SeriesStampContext::default();

    for series in series_repo.list_series()? {
        let mut current = finder.first_minutes_of_series(&series)?;
        while let Some(minutes) = current {
            process_minutes(&minutes_repo, &mut ctx, &minutes)?;
            summary.minutes_processed += 1;
            current = finder.next_minutes(&minutes)?;
        }
        summary.topics_flushed += flush_finalized_topics(&topic_repo, &ctx.topics)?;
        ctx.clear();
        summary.series_walked += 1;
    }

    Ok(summary)
}

/// Reverse entry point: strips both stamp fields from every record.
///
/// Field removal is idempotent and order-independent, so no memory tracking
/// is needed. Every flat topic and every revision's `topics` field is
/// persisted unconditionally.
pub fn revert(conn: &Connection) -> RepoResult<ReversalSummary> {
    let started_at = Instant::now();
    info!("event=timestamp_reversal module=migrate status=start");

    match strip_all(conn) {
        Ok(summary) => {
            info!(
                "event=timestamp_reversal module=migrate status=ok flat_topics={} minutes={} duration_ms={}",
                summary.flat_topics_stripped,
                summary.minutes_stripped,
                started_at.elapsed().as_millis()
            );
            Ok(summary)
        }
        Err(err) => {
            error!(
                "event=timestamp_reversal module=migrate status=error duration_ms={} error={}",
                started_at.elapsed().as_millis(),
                err
            );
            Err(err)
        }
    }
}

fn strip_all(conn: &Connection) -> RepoResult<ReversalSummary> {
    let minutes_repo = SqliteMinutesRepository::try_new(conn)?;
    let topic_repo = SqliteTopicRepository::try_new(conn)?;

    let mut summary = ReversalSummary::default();

    for topic in topic_repo.list_topics()? {
        let stripped = strip_topic(&topic);
        topic_repo.clear_backfill(&topic.id, &stripped.info_items)?;
        summary.flat_topics_stripped += 1;
    }

    for minutes in minutes_repo.list_minutes()? {
        let stripped: Vec<Topic> = minutes.topics.iter().map(strip_topic).collect();
        minutes_repo.update_topics_raw(minutes.id, &stripped)?;
        summary.minutes_stripped += 1;
    }

    Ok(summary)
}

fn strip_topic(topic: &Topic) -> Topic {
    Topic {
        id: topic.id.clone(),
        subject: topic.subject.clone(),
        created_at: None,
        updated_at: None,
        info_items: topic
            .info_items
            .iter()
            .map(|item| InfoItem {
                id: item.id.clone(),
                text: item.text.clone(),
                created_at: None,
                updated_at: None,
                details: item
                    .details
                    .iter()
                    .map(|detail| Detail {
                        id: detail.id.clone(),
                        text: detail.text.clone(),
                        created_at: None,
                        updated_at: None,
                    })
                    .collect(),
            })
            .collect(),
    }
}
