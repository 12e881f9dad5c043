//! Contagion simulation over the captured population.
//!
//! # Responsibility
//! - Step the infection spread one simulated day at a time.
//! - Mirror every infection to the backing store while keeping the
//!   in-memory snapshot in sync.
//!
//! # Invariants
//! - The persisted store, not the snapshot, decides each day's branch.
//! - Infection is monotonic; nothing recovers.
//! - A failed day never leaves the snapshot claiming an infection the
//!   store does not hold.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod outbreak;

pub type SimResult<T> = Result<T, SimError>;

/// Simulation-level failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimError {
    /// A random draw was requested against an empty population.
    EmptyPopulation,
}

impl Display for SimError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyPopulation => {
                write!(f, "cannot draw a specimen from an empty population")
            }
        }
    }
}

impl Error for SimError {}
