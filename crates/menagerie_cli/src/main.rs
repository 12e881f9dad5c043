//! CLI entry point for the menagerie store.
//!
//! # Responsibility
//! - Expose the seeding and simulation use-cases over a database path.
//! - Keep output line-oriented for quick local runs.

use menagerie_core::db::open_db;
use menagerie_core::{run_outbreak, load_known_attacks, load_learnable_attacks};
use rand_chacha::rand_core::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::process::ExitCode;
use std::time::{SystemTime, UNIX_EPOCH};

const USAGE: &str = "usage:
  menagerie_cli version
  menagerie_cli simulate <db> <days> [seed]
  menagerie_cli load-known <db> <file>
  menagerie_cli load-learnable <db> <file>";

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("{message}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &[String]) -> Result<(), String> {
    match args.first().map(String::as_str) {
        Some("version") => {
            println!("menagerie_core version={}", menagerie_core::core_version());
            Ok(())
        }
        Some("simulate") => simulate(&args[1..]),
        Some("load-known") => load_known(&args[1..]),
        Some("load-learnable") => load_learnable(&args[1..]),
        _ => Err(USAGE.to_string()),
    }
}

fn simulate(args: &[String]) -> Result<(), String> {
    let [db_path, days, rest @ ..] = args else {
        return Err(USAGE.to_string());
    };
    let days: u32 = days
        .parse()
        .map_err(|_| format!("invalid day count `{days}`"))?;
    let seed = match rest {
        [] => entropy_seed(),
        [seed] => seed.parse().map_err(|_| format!("invalid seed `{seed}`"))?,
        _ => return Err(USAGE.to_string()),
    };

    let mut conn = open_db(db_path).map_err(|err| err.to_string())?;
    let report = run_outbreak(&mut conn, days, ChaCha8Rng::seed_from_u64(seed))
        .map_err(|err| err.to_string())?;

    println!(
        "simulated days={days} seed={seed} population={} newly_infected={} infected_total={}",
        report.population, report.newly_infected, report.infected_total
    );
    Ok(())
}

fn load_known(args: &[String]) -> Result<(), String> {
    let [db_path, file] = args else {
        return Err(USAGE.to_string());
    };

    let mut conn = open_db(db_path).map_err(|err| err.to_string())?;
    let outcome = load_known_attacks(&mut conn, file).map_err(|err| err.to_string())?;

    println!("known attacks loaded rows={}", outcome.rows_loaded());
    Ok(())
}

fn load_learnable(args: &[String]) -> Result<(), String> {
    let [db_path, file] = args else {
        return Err(USAGE.to_string());
    };

    let conn = open_db(db_path).map_err(|err| err.to_string())?;
    let inserted = load_learnable_attacks(&conn, file).map_err(|err| err.to_string())?;

    println!("learnable attacks loaded rows={inserted}");
    Ok(())
}

fn entropy_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_nanos() as u64)
        .unwrap_or(0)
}
