#![forbid(unsafe_code)]

//! Scenario replay CLI.
//!
//! ```sh
//! snapsheet-harness scenario.json
//! SNAPSHEET_LOG=debug snapsheet-harness scenario.json
//! ```
//!
//! Prints one JSON frame per line on stdout, then a final
//! `{"checksum": "..."}` line. Logs go to stderr.

use std::io::{self, Write};
use std::process::ExitCode;

use snapsheet_harness::{Scenario, run_scenario};
use tracing::error;
use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "SNAPSHEET_LOG";

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn run(path: &str) -> Result<(), Box<dyn std::error::Error>> {
    let scenario = Scenario::from_file(path)?;
    let run = run_scenario(&scenario)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    for frame in &run.frames {
        serde_json::to_writer(&mut out, frame)?;
        writeln!(out)?;
    }
    writeln!(
        out,
        "{}",
        serde_json::json!({ "checksum": run.checksum_hex() })
    )?;
    Ok(())
}

fn main() -> ExitCode {
    init_tracing();

    let mut args = std::env::args().skip(1);
    let (Some(path), None) = (args.next(), args.next()) else {
        eprintln!("usage: snapsheet-harness <scenario.json>");
        return ExitCode::from(2);
    };

    match run(&path) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(%err, path = %path, "scenario failed");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
