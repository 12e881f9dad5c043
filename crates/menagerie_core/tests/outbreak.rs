use menagerie_core::db::open_db_in_memory;
use menagerie_core::{
    run_outbreak, OutbreakError, OutbreakSimulator, SimError, SpecimenRepository,
    SqliteSpecimenRepository,
};
use rand_chacha::rand_core::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rusqlite::{params, Connection};
use std::collections::BTreeSet;

#[test]
fn first_day_from_zero_infected_infects_exactly_one() {
    let mut conn = population_db(5);

    let report = run_outbreak(&mut conn, 1, ChaCha8Rng::seed_from_u64(7)).unwrap();

    assert_eq!(report.population, 5);
    assert_eq!(report.newly_infected, 1);
    assert_eq!(report.infected_total, 1);
    assert_eq!(stored_infected(&conn).len(), 1);
}

#[test]
fn zero_days_is_a_no_op() {
    let mut conn = population_db(5);

    let report = run_outbreak(&mut conn, 0, ChaCha8Rng::seed_from_u64(7)).unwrap();

    assert_eq!(report.newly_infected, 0);
    assert_eq!(report.infected_total, 0);
    assert!(stored_infected(&conn).is_empty());
}

#[test]
fn empty_population_is_rejected_when_days_would_draw() {
    let mut conn = population_db(0);

    let err = run_outbreak(&mut conn, 1, ChaCha8Rng::seed_from_u64(7)).unwrap_err();
    assert!(matches!(
        err,
        OutbreakError::Sim(SimError::EmptyPopulation)
    ));
}

#[test]
fn empty_population_with_zero_days_is_fine() {
    let mut conn = population_db(0);

    let report = run_outbreak(&mut conn, 0, ChaCha8Rng::seed_from_u64(7)).unwrap();
    assert_eq!(report.population, 0);
    assert_eq!(report.newly_infected, 0);
}

#[test]
fn infection_is_monotonic_across_longer_runs() {
    // Same seed on identical databases replays the shared day prefix, so
    // every longer run must contain the shorter run's infected set.
    for days in 1..=4u32 {
        let mut shorter = population_db(6);
        let mut longer = population_db(6);

        run_outbreak(&mut shorter, days, ChaCha8Rng::seed_from_u64(99)).unwrap();
        run_outbreak(&mut longer, days + 1, ChaCha8Rng::seed_from_u64(99)).unwrap();

        let shorter_set = stored_infected(&shorter);
        let longer_set = stored_infected(&longer);
        assert!(
            longer_set.is_superset(&shorter_set),
            "run of {} days lost infections from run of {days} days",
            days + 1
        );
    }
}

#[test]
fn identical_seeds_produce_identical_outbreaks() {
    let mut first = population_db(6);
    let mut second = population_db(6);

    run_outbreak(&mut first, 3, ChaCha8Rng::seed_from_u64(1234)).unwrap();
    run_outbreak(&mut second, 3, ChaCha8Rng::seed_from_u64(1234)).unwrap();

    assert_eq!(stored_infected(&first), stored_infected(&second));
}

#[test]
fn saturated_population_yields_no_new_infections() {
    let mut conn = population_db(3);
    conn.execute("UPDATE specimen SET infected = 1;", []).unwrap();
    let before = stored_infected(&conn);

    let report = run_outbreak(&mut conn, 4, ChaCha8Rng::seed_from_u64(5)).unwrap();

    assert_eq!(report.newly_infected, 0);
    assert_eq!(report.infected_total, 3);
    assert_eq!(stored_infected(&conn), before);
}

#[test]
fn three_day_outbreak_stays_within_spread_bounds() {
    // Day 1 infects exactly one; day 2 draws once; day 3 draws at most
    // twice. Whatever the seed does, the total stays in 1..=4.
    for seed in [0u64, 1, 2, 42, 1000] {
        let mut conn = population_db(5);

        let report = run_outbreak(&mut conn, 3, ChaCha8Rng::seed_from_u64(seed)).unwrap();

        assert!(report.newly_infected >= 1, "seed {seed}");
        assert!(report.infected_total <= 4, "seed {seed}");
        assert_eq!(
            report.infected_total as u32, report.newly_infected,
            "seed {seed}: run started from zero infected"
        );
        assert_eq!(
            stored_infected(&conn).len(),
            report.infected_total,
            "seed {seed}: store and report disagree"
        );
    }
}

#[test]
fn snapshot_and_store_agree_after_a_run() {
    let mut conn = population_db(6);

    let mut specimens = {
        let repo = SqliteSpecimenRepository::try_new(&conn).unwrap();
        repo.load_all().unwrap()
    };
    let mut simulator = OutbreakSimulator::new(ChaCha8Rng::seed_from_u64(21));
    simulator.run(&mut conn, &mut specimens, 4).unwrap();

    let snapshot_infected: BTreeSet<(u32, u32)> = specimens
        .iter()
        .filter(|s| s.infected)
        .map(|s| (s.species_id, s.encounter))
        .collect();
    assert_eq!(snapshot_infected, stored_infected(&conn));
}

#[test]
fn infected_count_never_exceeds_population() {
    let mut conn = population_db(4);

    let report = run_outbreak(&mut conn, 12, ChaCha8Rng::seed_from_u64(3)).unwrap();

    assert!(report.infected_total <= 4);
    assert!(stored_infected(&conn).len() <= 4);
}

fn population_db(count: u32) -> Connection {
    let conn = open_db_in_memory().unwrap();
    conn.execute_batch(
        "INSERT INTO species (id, name) VALUES (1, 'flarevole');
         INSERT INTO species (id, name) VALUES (2, 'mosskit');",
    )
    .unwrap();
    for index in 0..count {
        let species_id = 1 + index % 2;
        let encounter = 1 + index / 2;
        conn.execute(
            "INSERT INTO specimen (species_id, encounter, nickname, sex, level, infected)
             VALUES (?1, ?2, NULL, 'F', 5, 0);",
            params![species_id, encounter],
        )
        .unwrap();
    }
    conn
}

fn stored_infected(conn: &Connection) -> BTreeSet<(u32, u32)> {
    let mut stmt = conn
        .prepare("SELECT species_id, encounter FROM specimen WHERE infected = 1;")
        .unwrap();
    let rows = stmt
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))
        .unwrap();
    rows.map(|row| row.unwrap()).collect()
}
