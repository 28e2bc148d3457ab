//! Error types shared by the cache backends

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while talking to Lmod or scanning the module tree
#[derive(Debug, Error)]
pub enum CacheError {
    /// A required setting was not provided (flag or environment variable)
    #[error("cannot find ${0} in the environment")]
    MissingSetting(&'static str),

    /// Several required settings were not provided
    #[error("missing required settings: {}", .0.iter().map(|s| format!("${s}")).collect::<Vec<_>>().join(", "))]
    MissingSettings(Vec<&'static str>),

    /// The module base directory could not be listed
    #[error("cannot list architectures in {}", .path.display())]
    ListArchitectures {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A cache timestamp file exists but its modification time cannot be read
    #[error("cannot read cache timestamp {}", .path.display())]
    Timestamp {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An external command could not be started
    #[error("failed to run {command}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// Module subpaths could not be joined into a path list
    #[error("cannot build module path list")]
    JoinPaths(#[from] std::env::JoinPathsError),

    /// `$LMOD_CMD bash --config-json` exited non-zero
    #[error("failed to get Lmod configuration: {0}")]
    ConfigQuery(String),

    /// The Lmod configuration was not valid JSON or had the wrong shape
    #[error("failed to parse the Lmod configuration")]
    ConfigParse(#[source] serde_json::Error),

    /// The Lmod configuration lists no cache locations
    #[error("failed to parse the Lmod configuration: no cache entry with directory and timestamp")]
    NoCacheEntry,
}
