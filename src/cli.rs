//! CLI module - Command-line interface definitions and handlers

use anyhow::Result;
use clap::Parser;
use std::ffi::OsString;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::SystemTime;

use crate::backends::lmod_config::read_lmod_config;
use crate::backends::update::refresh;
use crate::cache::age::{cache_age, is_stale, oldest_cache_time};
use crate::core::report::{Report, Status};
use crate::core::settings::{
    LmodSettings, Settings, DEFAULT_FRESHNESS_THRESHOLD, DEFAULT_MODULE_BASEDIR,
};
use crate::core::util::format_time;

/// lmod-cache - rebuild Lmod system caches and check their freshness.
#[derive(Parser, Debug)]
#[command(name = "lmod-cache")]
#[command(
    author,
    version,
    about,
    long_about = r#"lmod-cache runs Lmod's update_lmod_system_cache_files for every architecture
under the module base directory and reports how old the oldest cache is.

Layout per architecture:
    <basedir>/<arch>/modules/20YY[a|b]/all   module paths handed to Lmod
    <basedir>/<arch>/cacheDir/system.txt     cache timestamp

The result is reported Nagios style: one status line on stdout and exit code
0 (OK), 1 (WARNING, cache older than --freshness-threshold) or 2 (CRITICAL).

Examples:
    lmod-cache --create-cache
    lmod-cache --architecture skylake --architecture broadwell --create-cache
    lmod-cache --check-cache-age
    lmod-cache --freshness-threshold 180
"#
)]
pub struct Cli {
    /// Create the Lmod cache.
    #[arg(
        long,
        long_help = "Rebuild the Lmod cache of every selected architecture before checking\n\
its freshness. Requires $LMOD_DIR (or --lmod-dir).\n\n\
Architectures are processed in order and the run stops at the first failure."
    )]
    pub create_cache: bool,

    /// Architecture to work on (repeatable). Default: all architectures.
    #[arg(
        long = "architecture",
        value_name = "ARCH",
        value_delimiter = ',',
        long_help = "Restrict the run to the named architectures. Repeat the flag or pass a\n\
comma-separated list.\n\n\
If omitted, every entry of --module-basedir is treated as an architecture."
    )]
    pub architectures: Vec<OsString>,

    /// Minutes for which the cache is considered fresh.
    #[arg(
        long,
        default_value_t = DEFAULT_FRESHNESS_THRESHOLD,
        value_name = "MINUTES",
        long_help = "Report a warning when the oldest cache is older than this many minutes.\n\n\
An age exactly equal to the threshold is still fresh."
    )]
    pub freshness_threshold: u64,

    /// Base directory of the module trees.
    #[arg(long, default_value = DEFAULT_MODULE_BASEDIR, value_name = "DIR")]
    pub module_basedir: PathBuf,

    /// Show age in seconds of the oldest cache and exit.
    #[arg(
        long,
        long_help = "Print the age in seconds of the oldest cache as a bare integer and exit 0.\n\n\
No cache is created and no freshness warning is raised, even with --create-cache."
    )]
    pub check_cache_age: bool,

    /// Show the modules root and cache location from the Lmod config and exit.
    #[arg(
        long,
        long_help = "Run `$LMOD_CMD bash --config-json` and print the modules root, cache\n\
directory and cache timestamp file as JSON. Requires $LMOD_CMD (or --lmod-cmd)."
    )]
    pub show_lmod_config: bool,

    /// Lmod libexec directory containing update_lmod_system_cache_files.
    #[arg(long, env = "LMOD_DIR", value_name = "DIR")]
    pub lmod_dir: Option<PathBuf>,

    /// Lmod launcher command.
    #[arg(long, env = "LMOD_CMD", value_name = "PATH")]
    pub lmod_cmd: Option<PathBuf>,

    /// Disable colored output.
    #[arg(long)]
    pub no_color: bool,

    /// Quiet mode (warnings and errors only).
    #[arg(short, long)]
    pub quiet: bool,

    /// Verbose mode (debug logging).
    #[arg(
        short,
        long,
        long_help = "Enable debug logging, including the exact Lmod command line per\n\
architecture. RUST_LOG takes precedence when set."
    )]
    pub verbose: bool,
}

impl Cli {
    /// Collect the run settings from flags and environment
    pub fn settings(&self) -> Settings {
        Settings {
            module_basedir: self.module_basedir.clone(),
            architectures: self.architectures.clone(),
            freshness_threshold: self.freshness_threshold,
            lmod: LmodSettings::new(self.lmod_dir.clone(), self.lmod_cmd.clone()),
        }
    }
}

/// What a run produced
#[derive(Debug)]
enum Outcome {
    /// Output already printed (`--check-cache-age`, `--show-lmod-config`)
    Printed,
    /// `--check-cache-age` could not compute an age; stdout stays empty
    AgeUnknown,
    Report(Report),
}

/// Run the CLI with parsed arguments
pub fn run(cli: Cli) -> ExitCode {
    if cli.no_color {
        colored::control::set_override(false);
    }

    let settings = cli.settings();

    let report = match execute(&cli, &settings) {
        Ok(Outcome::Printed) => return ExitCode::SUCCESS,
        Ok(Outcome::AgeUnknown) => return ExitCode::from(Status::Critical.code()),
        Ok(Outcome::Report(report)) => report,
        Err(err) => {
            tracing::error!("Failed to update Lmod cache: {err:#}");
            Report::critical("Failed to update Lmod cache. See logs.")
        }
    };

    println!("{}", report);
    report.exit_code()
}

fn execute(cli: &Cli, settings: &Settings) -> Result<Outcome> {
    if cli.show_lmod_config {
        let config = read_lmod_config(settings)?;
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(Outcome::Printed);
    }

    let oldest = match oldest_cache_time(&settings.module_basedir, &settings.architectures) {
        Ok(oldest) => oldest,
        Err(err) => {
            let err = anyhow::Error::from(err);
            tracing::error!("Failed to determine the Lmod cache age: {err:#}");
            if cli.check_cache_age {
                return Ok(Outcome::AgeUnknown);
            }
            return Ok(Outcome::Report(Report::critical(
                "Failed to determine the Lmod cache age. See logs.",
            )));
        }
    };
    let age = cache_age(oldest, SystemTime::now());

    if cli.check_cache_age {
        println!("{}", age.as_secs());
        return Ok(Outcome::Printed);
    }

    if cli.create_cache {
        tracing::info!("Updating the Lmod cache");
        let status = refresh(settings)?;
        if !status.is_success() {
            tracing::error!(
                code = status.code,
                "Lmod cache update failed: {}",
                status.output.trim_end()
            );
            return Ok(Outcome::Report(Report::critical("Lmod cache update failed")));
        }
    }

    tracing::info!("Checking the Lmod cache freshness");
    let report = if is_stale(age, settings.freshness_threshold) {
        let errmsg = "Lmod cache is not fresh";
        tracing::warn!(
            age_secs = age.as_secs(),
            oldest = %format_time(oldest),
            threshold_minutes = settings.freshness_threshold,
            "{errmsg}"
        );
        Report::warning(errmsg)
    } else {
        Report::ok(format!("Lmod cache age is {}s", age.as_secs()))
    };

    if cli.create_cache {
        tracing::info!("Lmod cache updated.");
    } else {
        tracing::info!("Lmod cache is still fresh.");
    }

    Ok(Outcome::Report(report))
}
