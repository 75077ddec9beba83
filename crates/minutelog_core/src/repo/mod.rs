//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define collection-oriented data access contracts for the minutes store.
//! - Isolate SQLite query and JSON-column details from the migration logic.
//!
//! # Invariants
//! - Validated write paths enforce `Topic::validate()` before SQL mutations.
//! - Raw write paths persist records verbatim; they exist for migrated data
//!   that legitimately fails shape validation.
//! - Repositories refuse connections whose schema is not fully migrated.

use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::model::minutes::MinutesId;
use crate::model::topic::TopicValidationError;
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod minutes_repo;
pub mod series_repo;
pub mod topic_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Errors from minutes-store repository operations.
#[derive(Debug)]
pub enum RepoError {
    /// Underlying SQLite/bootstrap error.
    Db(DbError),
    /// Record failed normal-path shape validation.
    Validation(TopicValidationError),
    /// Target minutes revision does not exist.
    MinutesNotFound(MinutesId),
    /// Target flat topic does not exist.
    TopicNotFound(String),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Required table is missing.
    MissingRequiredTable(&'static str),
    /// Required column is missing from expected table.
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
    /// Persisted data cannot be converted to a valid read model.
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::MinutesNotFound(id) => write!(f, "minutes not found: {id}"),
            Self::TopicNotFound(id) => write!(f, "flat topic not found: {id}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "repository requires table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => write!(
                f,
                "repository requires column `{column}` in table `{table}`"
            ),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Validation(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<TopicValidationError> for RepoError {
    fn from(value: TopicValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Verifies the connection carries the migrated schema a repository needs.
///
/// Checked on repository construction so later operations can assume their
/// table and columns exist.
pub(crate) fn ensure_migrated(
    conn: &Connection,
    table: &'static str,
    columns: &[&'static str],
) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version = conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    let table_count: u32 = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1;",
        [table],
        |row| row.get(0),
    )?;
    if table_count == 0 {
        return Err(RepoError::MissingRequiredTable(table));
    }

    for column in columns {
        let mut stmt = conn.prepare(&format!("SELECT name FROM pragma_table_info('{table}');"))?;
        let mut rows = stmt.query([])?;
        let mut found = false;
        while let Some(row) = rows.next()? {
            if row.get::<_, String>(0)? == *column {
                found = true;
                break;
            }
        }
        if !found {
            return Err(RepoError::MissingRequiredColumn { table, column });
        }
    }

    Ok(())
}
