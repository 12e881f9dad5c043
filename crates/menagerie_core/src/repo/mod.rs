//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts.
//! - Isolate SQLite query details from simulation/import orchestration.
//! - Classify raw storage failures into semantic error kinds at this
//!   boundary; no raw `rusqlite::Error` escapes a public repository API
//!   undiagnosed.
//!
//! # Invariants
//! - Repository reads re-validate persisted state instead of masking it.
//! - Repository construction verifies the connection is migrated and the
//!   required tables/columns exist.

use crate::db::DbError;
use crate::db::migrations::latest_version;
use crate::model::specimen::SpecimenValidationError;
use rusqlite::{Connection, ErrorCode};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io;
use std::path::PathBuf;

pub mod species_repo;
pub mod specimen_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Persistence and query error for the repository layer.
#[derive(Debug)]
pub enum RepoError {
    /// A record failed domain validation before or after persistence.
    Validation(SpecimenValidationError),
    /// The store cannot be reached or is refusing service.
    Unavailable(rusqlite::Error),
    /// An insert/update was rejected by referential or uniqueness checks.
    Constraint(rusqlite::Error),
    /// Any other storage transport failure.
    Db(DbError),
    /// Persisted state does not decode into a valid record.
    InvalidData(String),
    /// Writing an exported asset to disk failed.
    AssetWrite { path: PathBuf, source: io::Error },
    /// The connection has not been migrated to the expected schema.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Unavailable(err) => write!(f, "storage unavailable: {err}"),
            Self::Constraint(err) => write!(f, "storage constraint violated: {err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
            Self::AssetWrite { path, source } => {
                write!(f, "failed to write asset `{}`: {source}", path.display())
            }
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} does not match expected {expected_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "required table `{table}` is missing")
            }
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "required column `{table}.{column}` is missing")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Unavailable(err) | Self::Constraint(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::AssetWrite { source, .. } => Some(source),
            Self::InvalidData(_)
            | Self::UninitializedConnection { .. }
            | Self::MissingRequiredTable(_)
            | Self::MissingRequiredColumn { .. } => None,
        }
    }
}

impl From<SpecimenValidationError> for RepoError {
    fn from(value: SpecimenValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        let code = match &value {
            rusqlite::Error::SqliteFailure(err, _) => Some(err.code),
            _ => None,
        };
        match code {
            Some(ErrorCode::ConstraintViolation) => Self::Constraint(value),
            Some(
                ErrorCode::CannotOpen
                | ErrorCode::DatabaseBusy
                | ErrorCode::DatabaseLocked
                | ErrorCode::NotADatabase
                | ErrorCode::DiskFull
                | ErrorCode::SystemIoFailure,
            ) => Self::Unavailable(value),
            _ => Self::Db(DbError::Sqlite(value)),
        }
    }
}

/// Verifies `PRAGMA user_version` matches the migrations this binary knows.
pub(crate) fn ensure_schema_current(conn: &Connection) -> RepoResult<()> {
    let actual_version = conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?;
    let expected_version = latest_version();
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }
    Ok(())
}

pub(crate) fn ensure_table_with_columns(
    conn: &Connection,
    table: &'static str,
    columns: &[&'static str],
) -> RepoResult<()> {
    if !table_exists(conn, table)? {
        return Err(RepoError::MissingRequiredTable(table));
    }
    for &column in columns {
        if !table_has_column(conn, table, column)? {
            return Err(RepoError::MissingRequiredColumn { table, column });
        }
    }
    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}
