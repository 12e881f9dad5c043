//! Bulk import of attack association records from external row files.
//!
//! # Responsibility
//! - Load known-attack rows as one all-or-nothing transaction.
//! - Load learnable-attack rows best-effort, row by row.
//!
//! # Invariants
//! - The known-attack batch is the only multi-row transaction in the
//!   store-facing surface: either every row of the batch is persisted or
//!   none are, and no partial state is ever observable to readers.
//! - An empty batch returns zero rows without touching the store.
//! - A failed rollback is reported distinctly from a clean rollback, so
//!   callers can tell "safely not committed" from "store state unknown".
//! - The learnable-attack loader never aborts on a single bad row; each
//!   failure is logged and skipped.

use crate::model::attack_links::{KnownAttack, LearnableAttack, RecordParseError};
use crate::repo::{RepoError, RepoResult};
use log::{info, warn};
use rusqlite::{params, Connection, TransactionBehavior};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub type ImportResult<T> = Result<T, ImportError>;

/// Failures surfaced by the import entry points.
#[derive(Debug)]
pub enum ImportError {
    /// The source file could not be read at all.
    Source { path: PathBuf, source: io::Error },
    /// Storage failed outside any batch transaction scope.
    Repo(RepoError),
    /// The batch aborted and the rollback itself failed; the store is in
    /// an unverified state.
    RollbackFailed {
        cause: BatchFailure,
        rollback_error: rusqlite::Error,
    },
}

impl Display for ImportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Source { path, source } => {
                write!(f, "cannot read import source `{}`: {source}", path.display())
            }
            Self::Repo(err) => write!(f, "{err}"),
            Self::RollbackFailed {
                cause,
                rollback_error,
            } => write!(
                f,
                "batch rollback failed after {cause}; store state is unverified: {rollback_error}"
            ),
        }
    }
}

impl Error for ImportError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Source { source, .. } => Some(source),
            Self::Repo(err) => Some(err),
            Self::RollbackFailed { rollback_error, .. } => Some(rollback_error),
        }
    }
}

impl From<RepoError> for ImportError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// The first failure that aborted an atomic batch.
#[derive(Debug)]
pub enum BatchFailure {
    /// A source row did not parse into a record.
    Record {
        line: usize,
        error: RecordParseError,
    },
    /// A record insert was rejected inside the transaction.
    Insert { line: usize, error: RepoError },
    /// Every insert succeeded but the final commit failed.
    Commit(RepoError),
}

impl Display for BatchFailure {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Record { line, error } => write!(f, "malformed row at line {line}: {error}"),
            Self::Insert { line, error } => write!(f, "insert failed at line {line}: {error}"),
            Self::Commit(error) => write!(f, "commit failed: {error}"),
        }
    }
}

/// Outcome of one atomic batch import.
#[derive(Debug)]
pub enum BatchOutcome {
    /// Every record in the batch was persisted.
    Committed { rows: usize },
    /// The batch aborted and was cleanly rolled back; zero rows persisted.
    RolledBack { cause: BatchFailure },
}

impl BatchOutcome {
    /// Number of rows visible to readers after the call.
    pub fn rows_loaded(&self) -> usize {
        match self {
            Self::Committed { rows } => *rows,
            Self::RolledBack { .. } => 0,
        }
    }
}

/// Imports known-attack rows from `path` as a single transaction.
///
/// Any parse or insert failure aborts and rolls back the whole batch; a
/// malformed row counts as an insertion failure. An empty source commits
/// nothing and reports zero rows.
pub fn load_known_attacks(
    conn: &mut Connection,
    path: impl AsRef<Path>,
) -> ImportResult<BatchOutcome> {
    let path = path.as_ref();
    let rows = read_rows(path)?;
    if rows.is_empty() {
        info!("event=import_known module=import status=ok rows=0 note=empty_source");
        return Ok(BatchOutcome::Committed { rows: 0 });
    }

    let tx = conn
        .transaction_with_behavior(TransactionBehavior::Immediate)
        .map_err(RepoError::from)?;

    let mut inserted = 0usize;
    let mut failure = None;
    for (line, raw) in &rows {
        match KnownAttack::parse_record(raw) {
            Ok(record) => match insert_known_attack(&tx, &record) {
                Ok(()) => inserted += 1,
                Err(error) => {
                    failure = Some(BatchFailure::Insert { line: *line, error });
                    break;
                }
            },
            Err(error) => {
                failure = Some(BatchFailure::Record { line: *line, error });
                break;
            }
        }
    }

    let failure = match failure {
        None => match tx.commit() {
            Ok(()) => {
                info!(
                    "event=import_known module=import status=ok rows={}",
                    inserted
                );
                return Ok(BatchOutcome::Committed { rows: inserted });
            }
            // A failed commit leaves nothing behind; the open transaction
            // unwinds when the handle drops.
            Err(error) => return rolled_back(BatchFailure::Commit(error.into())),
        },
        Some(failure) => failure,
    };

    match tx.rollback() {
        Ok(()) => rolled_back(failure),
        Err(rollback_error) => {
            warn!(
                "event=import_known module=import status=rollback_failed cause=\"{failure}\" error={rollback_error}"
            );
            Err(ImportError::RollbackFailed {
                cause: failure,
                rollback_error,
            })
        }
    }
}

/// Imports learnable-attack rows from `path`, best effort.
///
/// Each row succeeds or fails on its own; parse and insert failures are
/// logged and skipped. Returns the number of rows actually inserted.
pub fn load_learnable_attacks(conn: &Connection, path: impl AsRef<Path>) -> ImportResult<usize> {
    let path = path.as_ref();
    let rows = read_rows(path)?;

    let mut inserted = 0usize;
    let mut skipped = 0usize;
    for (line, raw) in &rows {
        match LearnableAttack::parse_record(raw) {
            Ok(record) => match insert_learnable_attack(conn, &record) {
                Ok(()) => inserted += 1,
                Err(error) => {
                    skipped += 1;
                    warn!(
                        "event=import_learnable_row module=import status=skipped line={line} error={error}"
                    );
                }
            },
            Err(error) => {
                skipped += 1;
                warn!(
                    "event=import_learnable_row module=import status=skipped line={line} error={error}"
                );
            }
        }
    }

    info!(
        "event=import_learnable module=import status=ok inserted={} skipped={}",
        inserted, skipped
    );
    Ok(inserted)
}

fn rolled_back(cause: BatchFailure) -> ImportResult<BatchOutcome> {
    warn!("event=import_known module=import status=rolled_back cause=\"{cause}\" rows=0");
    Ok(BatchOutcome::RolledBack { cause })
}

fn read_rows(path: &Path) -> ImportResult<Vec<(usize, String)>> {
    let text = fs::read_to_string(path).map_err(|source| ImportError::Source {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(text
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(index, line)| (index + 1, line.to_string()))
        .collect())
}

fn insert_known_attack(conn: &Connection, record: &KnownAttack) -> RepoResult<()> {
    conn.execute(
        "INSERT INTO known_attack (encounter, species_id, attack_id)
         VALUES (?1, ?2, ?3);",
        params![record.encounter, record.species_id, record.attack_id],
    )?;
    Ok(())
}

fn insert_learnable_attack(conn: &Connection, record: &LearnableAttack) -> RepoResult<()> {
    conn.execute(
        "INSERT INTO learnable_attack (species_id, attack_id, level)
         VALUES (?1, ?2, ?3);",
        params![record.species_id, record.attack_id, record.level],
    )?;
    Ok(())
}
