//! Enlist maintenance command.
//!
//! Usage:
//!   enlist --config enlist.toml register --username alice --email alice@example.com --password ...
//!   enlist --config enlist.toml activate <KEY>
//!   enlist --config enlist.toml purge
//!
//! `purge` is meant to run from cron. It exits non-zero only when the store
//! cannot be opened or read.

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use enlist_cli::{build_service, execute, load_config, Args, Outcome};
use tracing::{debug, Level};
use tracing_subscriber::FmtSubscriber;

fn main() -> Result<ExitCode> {
    let args = Args::parse();
    let log_level = if args.verbose { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let config = load_config(args.config.as_ref())?;
    debug!("using database {}", config.database.display());
    let service = build_service(config)?;

    let mut stdout = std::io::stdout().lock();
    match execute(&service, &args.command, &mut stdout)? {
        Outcome::Success => Ok(ExitCode::SUCCESS),
        Outcome::Rejected => Ok(ExitCode::from(1)),
    }
}
