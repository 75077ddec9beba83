//! Migration runner entry point.
//!
//! # Responsibility
//! - Dispatch the two parameterless migration procedures, "apply" and
//!   "revert", against one database file.
//! - Stay frameworkless: two fixed subcommands, no flag parsing.

use minutelog_core::db::open_db;
use std::process::ExitCode;

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let (command, db_path) = match args.as_slice() {
        [command, db_path] => (command.as_str(), db_path.as_str()),
        _ => {
            eprintln!("usage: minutelog <apply|revert> <db-path>");
            return ExitCode::FAILURE;
        }
    };

    match run(command, db_path) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("minutelog {command} failed: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run(command: &str, db_path: &str) -> Result<(), String> {
    let conn = open_db(db_path).map_err(|err| err.to_string())?;
    match command {
        "apply" => {
            let summary = minutelog_core::apply(&conn).map_err(|err| err.to_string())?;
            println!(
                "backfilled timestamps: series={} minutes={} topics_flushed={}",
                summary.series_walked, summary.minutes_processed, summary.topics_flushed
            );
            Ok(())
        }
        "revert" => {
            let summary = minutelog_core::revert(&conn).map_err(|err| err.to_string())?;
            println!(
                "stripped timestamps: flat_topics={} minutes={}",
                summary.flat_topics_stripped, summary.minutes_stripped
            );
            Ok(())
        }
        other => Err(format!("unknown command `{other}`; expected apply|revert")),
    }
}
