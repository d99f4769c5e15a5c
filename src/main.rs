//! svx-keywords - keyword listing and search across Survex source trees
//!
//! svx-keywords provides:
//! - Lazy depth-first reading of a survey file and everything it includes
//! - Per-file encoding detection (UTF-8, falling back to ISO-8859-1)
//! - Survey path tracking through *begin / *end blocks
//! - Keyword listing, totals and export, plus regex search
//! - Output as text, jsonl, json or tsv

use anyhow::Result;
use clap::Parser;
use std::process::ExitCode;

mod cli;
mod core;
mod reports;
mod survex;

fn main() -> Result<ExitCode> {
    let cli = cli::Cli::parse();
    init_tracing(cli.verbose);
    cli::run(cli)
}

/// Diagnostics go to stderr; RUST_LOG wins over the -v default
fn init_tracing(verbose: bool) {
    use tracing_subscriber::{EnvFilter, FmtSubscriber};

    let default_level = if verbose { "info" } else { "warn" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .finish();

    if let Err(err) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("failed to set tracing subscriber: {}", err);
    }
}
