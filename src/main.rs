//! lmod-cache - Lmod system cache maintenance
//!
//! lmod-cache provides:
//! - Per-architecture rebuild of the Lmod spider cache
//! - Freshness check of the oldest cache against a threshold
//! - Nagios-style status reporting (OK/WARNING/CRITICAL)

use clap::Parser;
use std::process::ExitCode;

mod backends;
mod cache;
mod cli;
mod core;

fn main() -> ExitCode {
    let cli = cli::Cli::parse();

    let ansi = crate::core::logging::use_ansi(cli.no_color);
    let subscriber = crate::core::logging::subscriber(cli.verbose, cli.quiet, ansi);
    tracing::subscriber::with_default(subscriber, || cli::run(cli))
}
