//! Attack association records and their import-row parsing.
//!
//! # Responsibility
//! - Define the two association shapes: per-encounter known attacks and
//!   per-species learnable attacks.
//! - Parse one external import row into one record.
//!
//! # Invariants
//! - Import rows are field-delimited text, one association per line;
//!   fields may be separated by whitespace or commas.
//! - A malformed row is a typed parse error, never a silently skipped or
//!   half-read record.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Per-encounter association of a specimen to an attack it knows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnownAttack {
    pub encounter: u32,
    pub species_id: u32,
    pub attack_id: u32,
}

/// Per-species association of an attack learnable at a minimum level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LearnableAttack {
    pub species_id: u32,
    pub attack_id: u32,
    pub level: u32,
}

/// Parse failures for one import row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordParseError {
    FieldCount { expected: usize, found: usize },
    InvalidField { field: &'static str, value: String },
}

impl Display for RecordParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FieldCount { expected, found } => {
                write!(f, "expected {expected} fields per row, found {found}")
            }
            Self::InvalidField { field, value } => {
                write!(f, "field `{field}` is not a valid number: `{value}`")
            }
        }
    }
}

impl Error for RecordParseError {}

impl KnownAttack {
    /// Parses one `encounter species attack` import row.
    pub fn parse_record(line: &str) -> Result<Self, RecordParseError> {
        let [encounter, species_id, attack_id] = split_fields::<3>(line)?;
        Ok(Self {
            encounter: parse_field("encounter", encounter)?,
            species_id: parse_field("species_id", species_id)?,
            attack_id: parse_field("attack_id", attack_id)?,
        })
    }
}

impl LearnableAttack {
    /// Parses one `species attack level` import row.
    pub fn parse_record(line: &str) -> Result<Self, RecordParseError> {
        let [species_id, attack_id, level] = split_fields::<3>(line)?;
        Ok(Self {
            species_id: parse_field("species_id", species_id)?,
            attack_id: parse_field("attack_id", attack_id)?,
            level: parse_field("level", level)?,
        })
    }
}

fn split_fields<const N: usize>(line: &str) -> Result<[&str; N], RecordParseError> {
    let mut fields = line
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|field| !field.is_empty());

    let mut out = [""; N];
    for slot in out.iter_mut() {
        *slot = fields.next().ok_or_else(|| count_error::<N>(line))?;
    }
    if fields.next().is_some() {
        return Err(count_error::<N>(line));
    }
    Ok(out)
}

fn count_error<const N: usize>(line: &str) -> RecordParseError {
    let found = line
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|field| !field.is_empty())
        .count();
    RecordParseError::FieldCount {
        expected: N,
        found,
    }
}

fn parse_field(field: &'static str, value: &str) -> Result<u32, RecordParseError> {
    value.parse().map_err(|_| RecordParseError::InvalidField {
        field,
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::{KnownAttack, LearnableAttack, RecordParseError};

    #[test]
    fn known_attack_parses_whitespace_row() {
        let record = KnownAttack::parse_record("3 25 17").unwrap();
        assert_eq!(
            record,
            KnownAttack {
                encounter: 3,
                species_id: 25,
                attack_id: 17
            }
        );
    }

    #[test]
    fn known_attack_parses_comma_row() {
        let record = KnownAttack::parse_record("1,4,9").unwrap();
        assert_eq!(record.encounter, 1);
        assert_eq!(record.attack_id, 9);
    }

    #[test]
    fn learnable_attack_parses_row() {
        let record = LearnableAttack::parse_record("25 17 20").unwrap();
        assert_eq!(
            record,
            LearnableAttack {
                species_id: 25,
                attack_id: 17,
                level: 20
            }
        );
    }

    #[test]
    fn short_row_reports_field_count() {
        let err = KnownAttack::parse_record("3 25").unwrap_err();
        assert_eq!(
            err,
            RecordParseError::FieldCount {
                expected: 3,
                found: 2
            }
        );
    }

    #[test]
    fn long_row_reports_field_count() {
        let err = LearnableAttack::parse_record("1 2 3 4").unwrap_err();
        assert_eq!(
            err,
            RecordParseError::FieldCount {
                expected: 3,
                found: 4
            }
        );
    }

    #[test]
    fn non_numeric_field_is_rejected() {
        let err = KnownAttack::parse_record("3 ember 17").unwrap_err();
        assert!(matches!(
            err,
            RecordParseError::InvalidField {
                field: "species_id",
                ..
            }
        ));
    }
}
