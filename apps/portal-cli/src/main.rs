//! Portal - command line front end
//!
//! Lists, searches, edits, imports and exports the portal's record pages.

mod cli;
mod commands;
mod error;
mod render;

use std::process::ExitCode;

use chrono::Utc;
use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use cli::Cli;

const DEFAULT_FILTER: &str = "warn,portal_core::notify=info";

fn main() -> ExitCode {
    init_logging();

    let cli = Cli::parse();
    match commands::run(cli, Utc::now()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) if err.is_declined() => ExitCode::SUCCESS,
        Err(err) => {
            if err.is_reported() {
                debug!(error = %err, "Command failed");
            } else {
                eprintln!("Error: {err}");
            }
            ExitCode::FAILURE
        }
    }
}

/// Log to stderr so exports on stdout stay clean. `PORTAL_LOG` wins over
/// `RUST_LOG`.
fn init_logging() {
    let filter = EnvFilter::try_from_env("PORTAL_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}
