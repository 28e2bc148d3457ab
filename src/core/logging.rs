//! Log subscriber setup
//!
//! Logs go to stderr so stdout stays reserved for the status line and the
//! `--check-cache-age` value. `RUST_LOG` overrides the level picked from flags.

use std::io::IsTerminal;
use tracing::level_filters::LevelFilter;
use tracing::Subscriber;
use tracing_subscriber::EnvFilter;

/// Level used when `RUST_LOG` is not set
pub fn default_level(verbose: bool, quiet: bool) -> LevelFilter {
    if verbose {
        LevelFilter::DEBUG
    } else if quiet {
        LevelFilter::WARN
    } else {
        LevelFilter::INFO
    }
}

/// Whether log lines may carry ANSI colors: not with `--no-color`, a non-empty
/// `NO_COLOR`, or when stderr is not a terminal (cron, pipes)
pub fn ansi_enabled(no_color_flag: bool, no_color_env: bool, stderr_is_terminal: bool) -> bool {
    !no_color_flag && !no_color_env && stderr_is_terminal
}

/// [`ansi_enabled`] for the current process
pub fn use_ansi(no_color_flag: bool) -> bool {
    let no_color_env = std::env::var_os("NO_COLOR").is_some_and(|v| !v.is_empty());
    ansi_enabled(no_color_flag, no_color_env, std::io::stderr().is_terminal())
}

/// Build the subscriber for one run; the caller decides its scope
pub fn subscriber(verbose: bool, quiet: bool, ansi: bool) -> impl Subscriber + Send + Sync {
    let filter = EnvFilter::builder()
        .with_default_directive(default_level(verbose, quiet).into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(ansi)
        .with_target(false)
        .finish()
}
