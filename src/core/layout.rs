//! Module tree layout
//!
//! Each architecture lives in its own directory under the module base dir:
//!
//! ```text
//! <basedir>/<arch>/modules/2023a/all     module subpaths handed to Lmod
//! <basedir>/<arch>/cacheDir/             spider cache written by Lmod
//! <basedir>/<arch>/cacheDir/system.txt   cache timestamp file
//! ```

use once_cell::sync::Lazy;
use regex::Regex;
use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::core::error::CacheError;

/// Name of the per-architecture module directory
pub const MODULES_DIR: &str = "modules";

/// Name of the per-architecture cache directory
pub const CACHE_DIR: &str = "cacheDir";

/// Cache timestamp file inside the cache directory
pub const SYSTEM_FILE: &str = "system.txt";

/// Toolchain generation directories: `20YY` followed by `a` or `b`
pub static GENERATION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^20[0-9]{2}[ab]$").expect("Invalid GENERATION_RE regex"));

/// `<basedir>/<arch>/modules`
pub fn modules_dir(basedir: &Path, arch: impl AsRef<Path>) -> PathBuf {
    basedir.join(arch).join(MODULES_DIR)
}

/// `<basedir>/<arch>/cacheDir`
pub fn cache_dir(basedir: &Path, arch: impl AsRef<Path>) -> PathBuf {
    basedir.join(arch).join(CACHE_DIR)
}

/// `<basedir>/<arch>/cacheDir/system.txt`
pub fn system_file(basedir: &Path, arch: impl AsRef<Path>) -> PathBuf {
    cache_dir(basedir, arch).join(SYSTEM_FILE)
}

/// List every entry of the base directory, sorted by name
///
/// Names are kept as raw OS strings; architecture directories need not be UTF-8.
pub fn list_architectures(basedir: &Path) -> Result<Vec<OsString>, CacheError> {
    let mut archs = Vec::new();

    for entry in WalkDir::new(basedir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|e| {
            // walkdir's message already embeds the I/O cause; keep only the cause as source
            let message = e.to_string();
            CacheError::ListArchitectures {
                path: basedir.to_path_buf(),
                source: e
                    .into_io_error()
                    .unwrap_or_else(|| io::Error::other(message)),
            }
        })?;
        archs.push(entry.file_name().to_os_string());
    }

    Ok(archs)
}

/// Use the requested architectures, or every entry of the base directory when none were given
pub fn resolve_architectures(
    basedir: &Path,
    requested: &[OsString],
) -> Result<Vec<OsString>, CacheError> {
    if requested.is_empty() {
        list_architectures(basedir)
    } else {
        Ok(requested.to_vec())
    }
}

/// Existing `<modules>/20YY[ab]/all` paths, sorted lexicographically
pub fn module_subpaths(modules: &Path) -> Vec<PathBuf> {
    let mut subpaths: Vec<PathBuf> = WalkDir::new(modules)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| {
            e.file_name()
                .to_str()
                .map(|name| GENERATION_RE.is_match(name))
                .unwrap_or(false)
        })
        .map(|e| e.path().join("all"))
        .filter(|p| p.exists())
        .collect();

    subpaths.sort();
    subpaths
}

/// Join paths with the platform path-list separator (`:` on Unix)
pub fn join_path_list(paths: &[PathBuf]) -> Result<OsString, CacheError> {
    Ok(std::env::join_paths(paths)?)
}
