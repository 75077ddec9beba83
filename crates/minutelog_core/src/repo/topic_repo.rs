//! Flat topic repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide persistence APIs over the flat, id-addressable `topics`
//!   collection (the authoritative copy of every topic).
//! - Own the `info_items` JSON column encoding.
//!
//! # Invariants
//! - Topics are the only record kind with a flat collection; info items and
//!   details exist solely nested inside a topic's `info_items` document.
//! - `apply_backfill`/`clear_backfill` are direct field updates used by the
//!   timestamp migration; they bypass shape validation and tolerate missing
//!   rows (a topic seen only inside minutes may have no flat counterpart).

use crate::model::topic::{InfoItem, Topic};
use crate::repo::{ensure_migrated, RepoError, RepoResult};
use rusqlite::{params, Connection, Row};

const TOPIC_SELECT_SQL: &str = "SELECT id, subject, created_at, updated_at, info_items FROM topics";

/// Repository interface for the flat topic collection.
pub trait TopicRepository {
    /// Inserts one flat topic row after shape validation.
    fn create_topic(&self, topic: &Topic) -> RepoResult<()>;
    /// Returns one flat topic by stable ID.
    fn get_topic(&self, id: &str) -> RepoResult<Option<Topic>>;
    /// Returns every flat topic, in `id ASC` order.
    fn list_topics(&self) -> RepoResult<Vec<Topic>>;
    /// Replaces one flat topic after shape validation.
    fn update_topic(&self, topic: &Topic) -> RepoResult<()>;
    /// Directly sets the stamp pair and `info_items` of one flat topic.
    ///
    /// Returns whether a row was updated; a missing row is not an error.
    fn apply_backfill(
        &self,
        id: &str,
        created_at: i64,
        updated_at: i64,
        info_items: &[InfoItem],
    ) -> RepoResult<bool>;
    /// Directly removes the stamp pair and replaces `info_items` (with the
    /// stamp-stripped nested records) of one flat topic.
    fn clear_backfill(&self, id: &str, info_items: &[InfoItem]) -> RepoResult<bool>;
}

/// SQLite-backed flat topic repository.
pub struct SqliteTopicRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTopicRepository<'conn> {
    /// Wraps a migrated connection, refusing unmigrated ones.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_migrated(
            conn,
            "topics",
            &["id", "subject", "created_at", "updated_at", "info_items"],
        )?;
        Ok(Self { conn })
    }
}

impl TopicRepository for SqliteTopicRepository<'_> {
    fn create_topic(&self, topic: &Topic) -> RepoResult<()> {
        topic.validate()?;
        self.conn.execute(
            "INSERT INTO topics (id, subject, created_at, updated_at, info_items)
             VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                topic.id.as_str(),
                topic.subject.as_str(),
                topic.created_at,
                topic.updated_at,
                encode_info_items(&topic.info_items)?,
            ],
        )?;
        Ok(())
    }

    fn get_topic(&self, id: &str) -> RepoResult<Option<Topic>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{TOPIC_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_topic_row(row)?));
        }
        Ok(None)
    }

    fn list_topics(&self) -> RepoResult<Vec<Topic>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{TOPIC_SELECT_SQL} ORDER BY id ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut topics = Vec::new();
        while let Some(row) = rows.next()? {
            topics.push(parse_topic_row(row)?);
        }
        Ok(topics)
    }

    fn update_topic(&self, topic: &Topic) -> RepoResult<()> {
        topic.validate()?;
        let changed = self.conn.execute(
            "UPDATE topics
             SET subject = ?1, created_at = ?2, updated_at = ?3, info_items = ?4
             WHERE id = ?5;",
            params![
                topic.subject.as_str(),
                topic.created_at,
                topic.updated_at,
                encode_info_items(&topic.info_items)?,
                topic.id.as_str(),
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::TopicNotFound(topic.id.clone()));
        }
        Ok(())
    }

    fn apply_backfill(
        &self,
        id: &str,
        created_at: i64,
        updated_at: i64,
        info_items: &[InfoItem],
    ) -> RepoResult<bool> {
        let changed = self.conn.execute(
            "UPDATE topics
             SET created_at = ?1, updated_at = ?2, info_items = ?3
             WHERE id = ?4;",
            params![created_at, updated_at, encode_info_items(info_items)?, id],
        )?;
        Ok(changed > 0)
    }

    fn clear_backfill(&self, id: &str, info_items: &[InfoItem]) -> RepoResult<bool> {
        let changed = self.conn.execute(
            "UPDATE topics
             SET created_at = NULL, updated_at = NULL, info_items = ?1
             WHERE id = ?2;",
            params![encode_info_items(info_items)?, id],
        )?;
        Ok(changed > 0)
    }
}

fn parse_topic_row(row: &Row<'_>) -> RepoResult<Topic> {
    Ok(Topic {
        id: row.get("id")?,
        subject: row.get("subject")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
        info_items: decode_info_items(&row.get::<_, String>("info_items")?)?,
    })
}

fn encode_info_items(info_items: &[InfoItem]) -> RepoResult<String> {
    serde_json::to_string(info_items)
        .map_err(|err| RepoError::InvalidData(format!("cannot encode info items: {err}")))
}

fn decode_info_items(json: &str) -> RepoResult<Vec<InfoItem>> {
    serde_json::from_str(json).map_err(|err| {
        RepoError::InvalidData(format!("invalid info_items document in topics.info_items: {err}"))
    })
}
