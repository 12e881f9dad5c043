//! Day-stepped contagion spread across the specimen snapshot.
//!
//! # Responsibility
//! - Run the daily infection policy for a requested number of days.
//! - Keep snapshot and store in sync through an explicit two-write order:
//!   mark the snapshot, then persist.
//!
//! # Invariants
//! - Every draw picks uniformly from the full population, infected
//!   specimens included; a draw landing on an infected specimen is spent,
//!   not redrawn. Drawing from the susceptible pool instead would change
//!   the spread dynamics.
//! - Each day runs in its own transaction scope; a failed day is logged,
//!   reverted in the snapshot, and the loop still advances.
//! - The returned total counts only committed infections.

use crate::model::specimen::Specimen;
use crate::repo::specimen_repo::exec_update_infection;
use crate::repo::RepoResult;
use crate::sim::{SimError, SimResult};
use log::{debug, info, warn};
use rand::Rng;
use rusqlite::{Connection, Transaction, TransactionBehavior};

/// Progressive infection simulator over a population snapshot.
///
/// Generic over the random source so tests and callers can fix a seed.
pub struct OutbreakSimulator<R: Rng> {
    rng: R,
}

/// Outcome of one random draw over the snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DrawOutcome {
    /// The draw landed on a susceptible specimen at this snapshot index.
    Susceptible(usize),
    /// The draw landed on an already-infected specimen; the draw is spent.
    AlreadyInfected,
}

impl<R: Rng> OutbreakSimulator<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    /// Simulates `days` days of spread over `specimens`.
    ///
    /// Returns the total number of specimens newly infected across the
    /// run. The snapshot is mutated in place alongside the store.
    ///
    /// # Errors
    /// - [`SimError::EmptyPopulation`] when at least one day would have to
    ///   draw from an empty snapshot.
    pub fn run(
        &mut self,
        conn: &mut Connection,
        specimens: &mut [Specimen],
        days: u32,
    ) -> SimResult<u32> {
        if days > 0 && specimens.is_empty() {
            return Err(SimError::EmptyPopulation);
        }

        let mut total_newly = 0u32;
        for day in 1..=days {
            match self.run_day(conn, specimens) {
                Ok(newly) => {
                    total_newly += newly;
                    debug!(
                        "event=sim_day module=sim status=ok day={day} newly_infected={newly}"
                    );
                }
                Err(err) => {
                    warn!("event=sim_day module=sim status=error day={day} error={err}");
                }
            }
        }

        info!(
            "event=sim_run module=sim status=ok days={} population={} newly_infected={}",
            days,
            specimens.len(),
            total_newly
        );
        Ok(total_newly)
    }

    /// Runs one day inside its own transaction scope.
    ///
    /// On any failure the day's snapshot marks are reverted, so the
    /// snapshot never diverges from what the store committed.
    fn run_day(&mut self, conn: &mut Connection, specimens: &mut [Specimen]) -> RepoResult<u32> {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let mut marked: Vec<usize> = Vec::new();

        match self.spread_day(&tx, specimens, &mut marked) {
            Ok(newly) => match tx.commit() {
                Ok(()) => Ok(newly),
                Err(err) => {
                    revert_marks(specimens, &marked);
                    Err(err.into())
                }
            },
            Err(err) => {
                revert_marks(specimens, &marked);
                if let Err(rollback_err) = tx.rollback() {
                    warn!(
                        "event=sim_day_rollback module=sim status=error error={rollback_err}"
                    );
                }
                Err(err)
            }
        }
    }

    /// One day of spread: the persisted infected count picks the branch.
    fn spread_day(
        &mut self,
        tx: &Transaction<'_>,
        specimens: &mut [Specimen],
        marked: &mut Vec<usize>,
    ) -> RepoResult<u32> {
        let infected = persisted_infected_count(tx)?;
        let mut newly = 0u32;

        if infected == 0 {
            // Patient zero: one unconditional draw seeds the outbreak.
            let index = self.rng.gen_range(0..specimens.len());
            infect(tx, specimens, index, marked)?;
            newly += 1;
        } else {
            // As many draws as there are infected specimens today.
            for _ in 0..infected {
                match self.draw(specimens) {
                    DrawOutcome::AlreadyInfected => continue,
                    DrawOutcome::Susceptible(index) => {
                        infect(tx, specimens, index, marked)?;
                        newly += 1;
                    }
                }
            }
        }

        Ok(newly)
    }

    fn draw(&mut self, specimens: &[Specimen]) -> DrawOutcome {
        let index = self.rng.gen_range(0..specimens.len());
        if specimens[index].infected {
            DrawOutcome::AlreadyInfected
        } else {
            DrawOutcome::Susceptible(index)
        }
    }
}

/// Infected count as the store sees it, read through the day transaction.
fn persisted_infected_count(conn: &Connection) -> RepoResult<u32> {
    let count =
        conn.query_row("SELECT COUNT(*) FROM specimen WHERE infected = 1;", [], |row| {
            row.get::<_, u32>(0)
        })?;
    Ok(count)
}

/// Marks the snapshot first, then mirrors the flag to the store.
fn infect(
    tx: &Transaction<'_>,
    specimens: &mut [Specimen],
    index: usize,
    marked: &mut Vec<usize>,
) -> RepoResult<()> {
    specimens[index].infected = true;
    marked.push(index);
    exec_update_infection(tx, specimens[index].key(), true)?;
    Ok(())
}

fn revert_marks(specimens: &mut [Specimen], marked: &[usize]) {
    for &index in marked {
        specimens[index].infected = false;
    }
}
