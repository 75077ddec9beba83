//! Meeting series repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide read APIs over the `meeting_series` collection.
//! - Keep SQL and id-encoding details inside the repository boundary.
//!
//! # Invariants
//! - `list_series` order is deterministic: `id ASC`.

use crate::model::series::{MeetingSeries, SeriesId};
use crate::repo::{ensure_migrated, RepoError, RepoResult};
use rusqlite::{params, Connection, Row};
use uuid::Uuid;

const SERIES_SELECT_SQL: &str = "SELECT id, name, first_minutes_id FROM meeting_series";

/// Repository interface for meeting series access.
pub trait SeriesRepository {
    /// Inserts one series row.
    fn create_series(&self, series: &MeetingSeries) -> RepoResult<SeriesId>;
    /// Returns one series by stable ID.
    fn get_series(&self, id: SeriesId) -> RepoResult<Option<MeetingSeries>>;
    /// Returns every series. Order across series carries no meaning for the
    /// migration; it is fixed only to keep runs reproducible.
    fn list_series(&self) -> RepoResult<Vec<MeetingSeries>>;
}

/// SQLite-backed series repository.
pub struct SqliteSeriesRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteSeriesRepository<'conn> {
    /// Wraps a migrated connection, refusing unmigrated ones.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_migrated(conn, "meeting_series", &["id", "name", "first_minutes_id"])?;
        Ok(Self { conn })
    }
}

impl SeriesRepository for SqliteSeriesRepository<'_> {
    fn create_series(&self, series: &MeetingSeries) -> RepoResult<SeriesId> {
        self.conn.execute(
            "INSERT INTO meeting_series (id, name, first_minutes_id)
             VALUES (?1, ?2, ?3);",
            params![
                series.id.to_string(),
                series.name.as_str(),
                series.first_minutes_id.map(|id| id.to_string()),
            ],
        )?;
        Ok(series.id)
    }

    fn get_series(&self, id: SeriesId) -> RepoResult<Option<MeetingSeries>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{SERIES_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_series_row(row)?));
        }
        Ok(None)
    }

    fn list_series(&self) -> RepoResult<Vec<MeetingSeries>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{SERIES_SELECT_SQL} ORDER BY id ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut series = Vec::new();
        while let Some(row) = rows.next()? {
            series.push(parse_series_row(row)?);
        }
        Ok(series)
    }
}

fn parse_series_row(row: &Row<'_>) -> RepoResult<MeetingSeries> {
    Ok(MeetingSeries {
        id: parse_uuid(&row.get::<_, String>("id")?, "meeting_series.id")?,
        name: row.get("name")?,
        first_minutes_id: row
            .get::<_, Option<String>>("first_minutes_id")?
            .map(|text| parse_uuid(&text, "meeting_series.first_minutes_id"))
            .transpose()?,
    })
}

pub(crate) fn parse_uuid(text: &str, source: &str) -> RepoResult<Uuid> {
    Uuid::parse_str(text)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid value `{text}` in {source}")))
}
