//! Species catalog repository and sprite asset export.
//!
//! # Responsibility
//! - List the species catalog in id order.
//! - Export a species sprite blob to a named file.
//!
//! # Invariants
//! - A species without a stored sprite (missing row or NULL blob) is the
//!   defined `NotFound` outcome, not an error.

use crate::model::species::Species;
use crate::repo::{ensure_schema_current, ensure_table_with_columns, RepoError, RepoResult};
use log::info;
use rusqlite::Connection;
use std::fs;
use std::path::Path;

const SPECIES_COLUMNS: &[&str] = &["id", "name", "description", "evolves_into", "sprite"];

/// Result of one sprite export attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpriteOutcome {
    /// The sprite was fetched and written to the requested path.
    Written { bytes: u64 },
    /// No sprite is stored for that species.
    NotFound,
}

/// Repository interface for the species catalog.
pub trait SpeciesRepository {
    /// Lists catalog entries ordered by id.
    fn list_species(&self) -> RepoResult<Vec<Species>>;
    /// Fetches the sprite blob for one species and writes it to `path`.
    fn export_sprite(&self, species_id: u32, path: &Path) -> RepoResult<SpriteOutcome>;
}

/// SQLite-backed species repository.
pub struct SqliteSpeciesRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteSpeciesRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_schema_current(conn)?;
        ensure_table_with_columns(conn, "species", SPECIES_COLUMNS)?;
        Ok(Self { conn })
    }
}

impl SpeciesRepository for SqliteSpeciesRepository<'_> {
    fn list_species(&self) -> RepoResult<Vec<Species>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, description, evolves_into
             FROM species
             ORDER BY id ASC;",
        )?;

        let mut rows = stmt.query([])?;
        let mut species = Vec::new();
        while let Some(row) = rows.next()? {
            species.push(Species {
                id: row.get("id")?,
                name: row.get("name")?,
                description: row.get("description")?,
                evolves_into: row.get("evolves_into")?,
            });
        }

        Ok(species)
    }

    fn export_sprite(&self, species_id: u32, path: &Path) -> RepoResult<SpriteOutcome> {
        let mut stmt = self
            .conn
            .prepare("SELECT sprite FROM species WHERE id = ?1;")?;
        let mut rows = stmt.query([species_id])?;

        let Some(row) = rows.next()? else {
            return Ok(SpriteOutcome::NotFound);
        };
        let Some(data) = row.get::<_, Option<Vec<u8>>>("sprite")? else {
            return Ok(SpriteOutcome::NotFound);
        };

        fs::write(path, &data).map_err(|source| RepoError::AssetWrite {
            path: path.to_path_buf(),
            source,
        })?;

        info!(
            "event=sprite_export module=repo status=ok species_id={} bytes={}",
            species_id,
            data.len()
        );
        Ok(SpriteOutcome::Written {
            bytes: data.len() as u64,
        })
    }
}
