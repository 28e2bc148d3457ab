//! Run settings
//!
//! Everything the backends need is collected once at startup into [`Settings`]
//! and passed down explicitly. Lmod locations come from `$LMOD_DIR` and
//! `$LMOD_CMD` (or the matching flags) and are validated on demand with
//! [`LmodSettings::require`].

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::core::error::CacheError;

/// Default root of the per-architecture module trees
pub const DEFAULT_MODULE_BASEDIR: &str = "/apps/brussel/CO7";

/// Default freshness threshold in minutes (the cron job runs every 3 hours)
pub const DEFAULT_FRESHNESS_THRESHOLD: u64 = 60 * 4;

/// A setting that some operation cannot work without
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Required {
    /// Lmod libexec directory holding `update_lmod_system_cache_files`
    LmodDir,
    /// Lmod launcher used for `bash --config-json`
    LmodCmd,
}

impl Required {
    /// Environment variable the setting is read from
    pub fn env_var(self) -> &'static str {
        match self {
            Required::LmodDir => "LMOD_DIR",
            Required::LmodCmd => "LMOD_CMD",
        }
    }
}

/// Locations of the Lmod installation
#[derive(Debug, Clone, Default)]
pub struct LmodSettings {
    pub lmod_dir: Option<PathBuf>,
    pub lmod_cmd: Option<PathBuf>,
}

impl LmodSettings {
    pub fn new(lmod_dir: Option<PathBuf>, lmod_cmd: Option<PathBuf>) -> Self {
        // An exported but empty variable counts as unset
        let non_empty = |p: Option<PathBuf>| p.filter(|p| !p.as_os_str().is_empty());
        Self {
            lmod_dir: non_empty(lmod_dir),
            lmod_cmd: non_empty(lmod_cmd),
        }
    }

    fn get(&self, setting: Required) -> Option<&Path> {
        match setting {
            Required::LmodDir => self.lmod_dir.as_deref(),
            Required::LmodCmd => self.lmod_cmd.as_deref(),
        }
    }

    /// Check that every listed setting is present, reporting all missing ones at once
    pub fn require(&self, needs: &[Required]) -> Result<(), CacheError> {
        let mut missing: Vec<&'static str> = needs
            .iter()
            .filter(|s| self.get(**s).is_none())
            .map(|s| s.env_var())
            .collect();

        match missing.len() {
            0 => Ok(()),
            1 => Err(CacheError::MissingSetting(missing.remove(0))),
            _ => Err(CacheError::MissingSettings(missing)),
        }
    }

    /// Lmod libexec directory
    pub fn lmod_dir(&self) -> Result<&Path, CacheError> {
        self.get(Required::LmodDir)
            .ok_or(CacheError::MissingSetting(Required::LmodDir.env_var()))
    }

    /// Lmod launcher
    pub fn lmod_cmd(&self) -> Result<&Path, CacheError> {
        self.get(Required::LmodCmd)
            .ok_or(CacheError::MissingSetting(Required::LmodCmd.env_var()))
    }
}

/// Everything a single run works with
#[derive(Debug, Clone)]
pub struct Settings {
    /// Root directory containing one subdirectory per architecture
    pub module_basedir: PathBuf,

    /// Architectures to work on; empty means every entry of `module_basedir`
    pub architectures: Vec<OsString>,

    /// Cache age in minutes beyond which the cache is reported as stale
    pub freshness_threshold: u64,

    pub lmod: LmodSettings,
}

impl Settings {
    pub fn new(module_basedir: impl Into<PathBuf>) -> Self {
        Self {
            module_basedir: module_basedir.into(),
            architectures: Vec::new(),
            freshness_threshold: DEFAULT_FRESHNESS_THRESHOLD,
            lmod: LmodSettings::default(),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::new(DEFAULT_MODULE_BASEDIR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_nothing_missing() {
        let lmod = LmodSettings::new(
            Some("/opt/lmod/libexec".into()),
            Some("/opt/lmod/lmod".into()),
        );
        assert!(lmod.require(&[Required::LmodDir, Required::LmodCmd]).is_ok());
    }

    #[test]
    fn test_require_reports_single_missing() {
        let lmod = LmodSettings::new(None, Some("/opt/lmod/lmod".into()));
        let err = lmod.require(&[Required::LmodDir, Required::LmodCmd]).unwrap_err();
        assert!(matches!(err, CacheError::MissingSetting("LMOD_DIR")));
    }

    #[test]
    fn test_require_reports_all_missing() {
        let lmod = LmodSettings::default();
        let err = lmod.require(&[Required::LmodDir, Required::LmodCmd]).unwrap_err();
        match err {
            CacheError::MissingSettings(names) => {
                assert_eq!(names, vec!["LMOD_DIR", "LMOD_CMD"])
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_empty_values_count_as_unset() {
        let lmod = LmodSettings::new(Some(PathBuf::new()), None);
        assert!(lmod.lmod_dir().is_err());
        assert!(lmod.lmod_cmd().is_err());
    }

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.module_basedir, PathBuf::from("/apps/brussel/CO7"));
        assert_eq!(settings.freshness_threshold, 240);
        assert!(settings.architectures.is_empty());
    }
}
