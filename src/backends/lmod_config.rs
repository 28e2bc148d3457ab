//! Lmod configuration query
//!
//! Runs `$LMOD_CMD bash --config-json` and extracts the modules root and the
//! location of the first system cache.

use serde::Deserialize;
use std::process::Command;

use crate::core::error::CacheError;
use crate::core::model::LmodConfig;
use crate::core::settings::{Required, Settings};
use crate::core::util::run_command;

/// Subset of the `--config-json` document
#[derive(Debug, Deserialize)]
struct ConfigJson {
    #[serde(rename = "configT")]
    config_t: ConfigTable,
    /// `[cache_dir, timestamp_file]` pairs
    cache: Vec<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct ConfigTable {
    mpath_root: String,
}

/// Parse the JSON emitted by `lmod bash --config-json`
pub fn parse_lmod_config(text: &str) -> Result<LmodConfig, CacheError> {
    let raw: ConfigJson = serde_json::from_str(text).map_err(CacheError::ConfigParse)?;

    let (cache_dir, cache_timestamp) = match raw.cache.into_iter().next().as_deref() {
        Some([dir, timestamp, ..]) => (dir.clone(), timestamp.clone()),
        _ => return Err(CacheError::NoCacheEntry),
    };

    Ok(LmodConfig {
        modules_root: raw.config_t.mpath_root,
        cache_dir,
        cache_timestamp,
    })
}

/// Ask Lmod for its configuration
pub fn read_lmod_config(settings: &Settings) -> Result<LmodConfig, CacheError> {
    settings.lmod.require(&[Required::LmodCmd])?;
    let lmod_cmd = settings.lmod.lmod_cmd()?;

    let mut cmd = Command::new(lmod_cmd);
    cmd.arg("bash").arg("--config-json");

    let status = run_command(&mut cmd)?;
    if !status.is_success() {
        return Err(CacheError::ConfigQuery(status.output));
    }

    let config = parse_lmod_config(&status.output)?;
    tracing::debug!(?config, "Found Lmod config");
    Ok(config)
}
