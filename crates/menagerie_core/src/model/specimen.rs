//! Specimen domain model.
//!
//! # Responsibility
//! - Define the canonical record for one captured creature.
//! - Provide validation for persisted field constraints.
//!
//! # Invariants
//! - `(species_id, encounter)` is immutable once the specimen exists.
//! - `infected` transitions only from `false` to `true`; there is no
//!   recovery in this model.
//! - `level` is at least 1.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Composite identity of one capture event.
///
/// Two captures of the same species get distinct encounter numbers, so the
/// pair is unique across the whole population.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SpecimenKey {
    pub species_id: u32,
    pub encounter: u32,
}

impl Display for SpecimenKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "species {} encounter {}", self.species_id, self.encounter)
    }
}

/// Validation failures for specimen field constraints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecimenValidationError {
    LevelOutOfRange { level: u32 },
    InvalidSexCode { sex: char },
}

impl Display for SpecimenValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LevelOutOfRange { level } => {
                write!(f, "specimen level must be at least 1, got {level}")
            }
            Self::InvalidSexCode { sex } => {
                write!(f, "specimen sex must be an ascii letter code, got `{sex}`")
            }
        }
    }
}

impl Error for SpecimenValidationError {}

/// One captured individual creature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Specimen {
    pub species_id: u32,
    pub encounter: u32,
    /// Optional trainer-assigned name.
    pub nickname: Option<String>,
    /// Single-character sex code, persisted as one-character text.
    pub sex: char,
    pub level: u32,
    /// Contagion flag, stored as 0/1.
    pub infected: bool,
}

impl Specimen {
    /// Creates a healthy, unnamed specimen for the given capture event.
    pub fn new(species_id: u32, encounter: u32, sex: char, level: u32) -> Self {
        Self {
            species_id,
            encounter,
            nickname: None,
            sex,
            level,
            infected: false,
        }
    }

    /// Returns the immutable composite identity of this specimen.
    pub fn key(&self) -> SpecimenKey {
        SpecimenKey {
            species_id: self.species_id,
            encounter: self.encounter,
        }
    }

    /// Checks persisted field constraints.
    ///
    /// Write paths must call this before SQL mutations; read paths use it
    /// to reject invalid persisted state instead of masking it.
    pub fn validate(&self) -> Result<(), SpecimenValidationError> {
        if self.level == 0 {
            return Err(SpecimenValidationError::LevelOutOfRange { level: self.level });
        }
        if !self.sex.is_ascii_alphabetic() {
            return Err(SpecimenValidationError::InvalidSexCode { sex: self.sex });
        }
        Ok(())
    }
}
