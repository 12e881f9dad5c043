//! Outbreak use-case driver.
//!
//! # Responsibility
//! - Load the population snapshot through the repository and hand it to
//!   the simulator.
//! - Report what one run changed, counting only committed infections.

use crate::model::specimen::Specimen;
use crate::repo::specimen_repo::{SpecimenRepository, SqliteSpecimenRepository};
use crate::repo::RepoError;
use crate::sim::outbreak::OutbreakSimulator;
use crate::sim::SimError;
use rand::Rng;
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Summary of one simulation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutbreakReport {
    /// Population size the run operated on.
    pub population: usize,
    /// Specimens newly infected by this run.
    pub newly_infected: u32,
    /// Specimens infected after the run, including pre-existing cases.
    pub infected_total: usize,
}

/// Failures surfaced by the outbreak driver.
#[derive(Debug)]
pub enum OutbreakError {
    Repo(RepoError),
    Sim(SimError),
}

impl Display for OutbreakError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Repo(err) => write!(f, "{err}"),
            Self::Sim(err) => write!(f, "{err}"),
        }
    }
}

impl Error for OutbreakError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::Sim(err) => Some(err),
        }
    }
}

impl From<RepoError> for OutbreakError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<SimError> for OutbreakError {
    fn from(value: SimError) -> Self {
        Self::Sim(value)
    }
}

/// Loads the specimen snapshot and simulates `days` days of spread.
pub fn run_outbreak<R: Rng>(
    conn: &mut Connection,
    days: u32,
    rng: R,
) -> Result<OutbreakReport, OutbreakError> {
    let mut specimens: Vec<Specimen> = {
        let repo = SqliteSpecimenRepository::try_new(conn)?;
        repo.load_all()?
    };

    let mut simulator = OutbreakSimulator::new(rng);
    let newly_infected = simulator.run(conn, &mut specimens, days)?;

    Ok(OutbreakReport {
        population: specimens.len(),
        newly_infected,
        infected_total: specimens.iter().filter(|s| s.infected).count(),
    })
}
