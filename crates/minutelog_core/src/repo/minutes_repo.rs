//! Minutes repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide persistence APIs over the `minutes` collection.
//! - Own the embedded-`topics` JSON column encoding.
//!
//! # Invariants
//! - `update_topics` enforces `Topic::validate()` on every topic before SQL.
//! - `update_topics_raw` bypasses validation; it is the only write path the
//!   timestamp migration may use, because migrated records legitimately
//!   contain empty-string fields.
//! - Both update paths replace the whole `topics` field in one statement.

use crate::model::minutes::{Minutes, MinutesId};
use crate::model::topic::Topic;
use crate::repo::series_repo::parse_uuid;
use crate::repo::{ensure_migrated, RepoError, RepoResult};
use rusqlite::{params, Connection, Row};

const MINUTES_SELECT_SQL: &str = "SELECT
    id,
    series_id,
    created_at,
    is_finalized,
    next_minutes_id,
    topics
FROM minutes";

/// Repository interface for minutes revision access.
pub trait MinutesRepository {
    /// Inserts one minutes row.
    fn create_minutes(&self, minutes: &Minutes) -> RepoResult<MinutesId>;
    /// Returns one revision by stable ID.
    fn get_minutes(&self, id: MinutesId) -> RepoResult<Option<Minutes>>;
    /// Returns every revision across all series, in `id ASC` order.
    fn list_minutes(&self) -> RepoResult<Vec<Minutes>>;
    /// Replaces the embedded `topics` field after shape validation.
    fn update_topics(&self, id: MinutesId, topics: &[Topic]) -> RepoResult<()>;
    /// Replaces the embedded `topics` field without shape validation.
    fn update_topics_raw(&self, id: MinutesId, topics: &[Topic]) -> RepoResult<()>;
}

/// SQLite-backed minutes repository.
pub struct SqliteMinutesRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteMinutesRepository<'conn> {
    /// Wraps a migrated connection, refusing unmigrated ones.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_migrated(
            conn,
            "minutes",
            &[
                "id",
                "series_id",
                "created_at",
                "is_finalized",
                "next_minutes_id",
                "topics",
            ],
        )?;
        Ok(Self { conn })
    }

    fn replace_topics(&self, id: MinutesId, topics: &[Topic]) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE minutes SET topics = ?1 WHERE id = ?2;",
            params![encode_topics(topics)?, id.to_string()],
        )?;
        if changed == 0 {
            return Err(RepoError::MinutesNotFound(id));
        }
        Ok(())
    }
}

impl MinutesRepository for SqliteMinutesRepository<'_> {
    fn create_minutes(&self, minutes: &Minutes) -> RepoResult<MinutesId> {
        self.conn.execute(
            "INSERT INTO minutes (
                id,
                series_id,
                created_at,
                is_finalized,
                next_minutes_id,
                topics
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                minutes.id.to_string(),
                minutes.series_id.to_string(),
                minutes.created_at,
                i64::from(minutes.is_finalized),
                minutes.next_minutes_id.map(|id| id.to_string()),
                encode_topics(&minutes.topics)?,
            ],
        )?;
        Ok(minutes.id)
    }

    fn get_minutes(&self, id: MinutesId) -> RepoResult<Option<Minutes>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{MINUTES_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_minutes_row(row)?));
        }
        Ok(None)
    }

    fn list_minutes(&self) -> RepoResult<Vec<Minutes>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{MINUTES_SELECT_SQL} ORDER BY id ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut minutes = Vec::new();
        while let Some(row) = rows.next()? {
            minutes.push(parse_minutes_row(row)?);
        }
        Ok(minutes)
    }

    fn update_topics(&self, id: MinutesId, topics: &[Topic]) -> RepoResult<()> {
        for topic in topics {
            topic.validate()?;
        }
        self.replace_topics(id, topics)
    }

    fn update_topics_raw(&self, id: MinutesId, topics: &[Topic]) -> RepoResult<()> {
        self.replace_topics(id, topics)
    }
}

fn parse_minutes_row(row: &Row<'_>) -> RepoResult<Minutes> {
    let is_finalized = match row.get::<_, i64>("is_finalized")? {
        0 => false,
        1 => true,
        other => {
            return Err(RepoError::InvalidData(format!(
                "invalid is_finalized value `{other}` in minutes.is_finalized"
            )));
        }
    };

    Ok(Minutes {
        id: parse_uuid(&row.get::<_, String>("id")?, "minutes.id")?,
        series_id: parse_uuid(&row.get::<_, String>("series_id")?, "minutes.series_id")?,
        created_at: row.get("created_at")?,
        is_finalized,
        next_minutes_id: row
            .get::<_, Option<String>>("next_minutes_id")?
            .map(|text| parse_uuid(&text, "minutes.next_minutes_id"))
            .transpose()?,
        topics: decode_topics(&row.get::<_, String>("topics")?, "minutes.topics")?,
    })
}

pub(crate) fn encode_topics(topics: &[Topic]) -> RepoResult<String> {
    serde_json::to_string(topics)
        .map_err(|err| RepoError::InvalidData(format!("cannot encode topics: {err}")))
}

pub(crate) fn decode_topics(json: &str, source: &str) -> RepoResult<Vec<Topic>> {
    serde_json::from_str(json)
        .map_err(|err| RepoError::InvalidData(format!("invalid topics document in {source}: {err}")))
}
