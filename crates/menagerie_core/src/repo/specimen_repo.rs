//! Specimen repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Load the full specimen population in its canonical order.
//! - Persist single-field infection updates, one row per call.
//!
//! # Invariants
//! - `load_all` orders by `(species_id ASC, encounter ASC)` regardless of
//!   insertion order.
//! - `update_infection` commits independently; it is never enrolled in a
//!   caller-held transaction by this API. The per-day simulation scope
//!   reaches the same statement through [`exec_update_infection`].
//! - A zero-row update is a silent no-op, matching the best-effort
//!   storage contract for single-record writes.

use crate::model::specimen::{Specimen, SpecimenKey};
use crate::repo::{ensure_schema_current, ensure_table_with_columns, RepoError, RepoResult};
use rusqlite::{params, Connection, Row};

const SPECIMEN_SELECT_SQL: &str = "SELECT
    species_id,
    encounter,
    nickname,
    sex,
    level,
    infected
FROM specimen";

const SPECIMEN_COLUMNS: &[&str] = &[
    "species_id",
    "encounter",
    "nickname",
    "sex",
    "level",
    "infected",
];

/// Repository interface for specimen persistence.
pub trait SpecimenRepository {
    /// Loads every specimen, ordered by species id then encounter number.
    fn load_all(&self) -> RepoResult<Vec<Specimen>>;
    /// Persists the infection flag for exactly one specimen.
    fn update_infection(&self, key: SpecimenKey, infected: bool) -> RepoResult<()>;
}

/// SQLite-backed specimen repository.
pub struct SqliteSpecimenRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteSpecimenRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_schema_current(conn)?;
        ensure_table_with_columns(conn, "specimen", SPECIMEN_COLUMNS)?;
        Ok(Self { conn })
    }
}

impl SpecimenRepository for SqliteSpecimenRepository<'_> {
    fn load_all(&self) -> RepoResult<Vec<Specimen>> {
        let mut stmt = self.conn.prepare(&format!(
            "{SPECIMEN_SELECT_SQL} ORDER BY species_id ASC, encounter ASC;"
        ))?;

        let mut rows = stmt.query([])?;
        let mut specimens = Vec::new();
        while let Some(row) = rows.next()? {
            specimens.push(parse_specimen_row(row)?);
        }

        Ok(specimens)
    }

    fn update_infection(&self, key: SpecimenKey, infected: bool) -> RepoResult<()> {
        let changed = exec_update_infection(self.conn, key, infected)?;
        if changed == 0 {
            log::debug!(
                "event=infection_update module=repo status=no_row species_id={} encounter={}",
                key.species_id,
                key.encounter
            );
        }
        Ok(())
    }
}

/// Runs the single-row infection update on any connection-like handle.
///
/// The simulator calls this through its per-day transaction; the
/// repository method calls it in autocommit mode.
pub(crate) fn exec_update_infection(
    conn: &Connection,
    key: SpecimenKey,
    infected: bool,
) -> RepoResult<usize> {
    let changed = conn.execute(
        "UPDATE specimen
         SET infected = ?3
         WHERE species_id = ?1
           AND encounter = ?2;",
        params![key.species_id, key.encounter, bool_to_int(infected)],
    )?;
    Ok(changed)
}

fn parse_specimen_row(row: &Row<'_>) -> RepoResult<Specimen> {
    let sex_text: String = row.get("sex")?;
    let sex = single_char(&sex_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid sex code `{sex_text}` in specimen.sex"))
    })?;

    let infected = match row.get::<_, i64>("infected")? {
        0 => false,
        1 => true,
        other => {
            return Err(RepoError::InvalidData(format!(
                "invalid infected value `{other}` in specimen.infected"
            )));
        }
    };

    let specimen = Specimen {
        species_id: row.get("species_id")?,
        encounter: row.get("encounter")?,
        nickname: row.get("nickname")?,
        sex,
        level: row.get("level")?,
        infected,
    };
    specimen.validate()?;
    Ok(specimen)
}

fn single_char(value: &str) -> Option<char> {
    let mut chars = value.chars();
    let first = chars.next()?;
    if chars.next().is_some() {
        return None;
    }
    Some(first)
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}
