//! `roster` command-line entry point.
//!
//! # Responsibility
//! - Parse flags, start optional file logging, open the database.
//! - Print command results as JSON on stdout.

use anyhow::Context;
use clap::Parser;

mod cli;
mod commands;

fn main() {
    if let Err(error) = run() {
        eprintln!("roster error: {error:#}");
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();

    if let Some(log_dir) = &cli.log_dir {
        roster_core::init_logging(cli.log_level(), log_dir).context("failed to start logging")?;
    }

    let conn = roster_core::open_db(&cli.db)
        .with_context(|| format!("failed to open database `{}`", cli.db.display()))?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    commands::dispatch(&cli.command, &conn, &mut out)
}
