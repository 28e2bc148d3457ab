//! Lmod system cache rebuild
//!
//! Calls `$LMOD_DIR/update_lmod_system_cache_files` once per architecture,
//! stopping at the first failure.

use std::path::Path;
use std::process::Command;

use crate::core::error::CacheError;
use crate::core::layout::{
    cache_dir, join_path_list, module_subpaths, modules_dir, resolve_architectures, system_file,
};
use crate::core::model::ToolStatus;
use crate::core::settings::{Required, Settings};
use crate::core::util::{describe_command, run_command};

/// Lmod script that rebuilds the spider cache
pub const UPDATE_SCRIPT: &str = "update_lmod_system_cache_files";

/// Build the cache update command for one architecture
///
/// Returns `None` when the architecture has no module directory.
pub fn update_command(
    lmod_dir: &Path,
    basedir: &Path,
    arch: impl AsRef<Path>,
) -> Result<Option<Command>, CacheError> {
    let arch = arch.as_ref();
    let modules = modules_dir(basedir, arch);
    if !modules.is_dir() {
        return Ok(None);
    }

    let subpaths = join_path_list(&module_subpaths(&modules))?;

    let mut cmd = Command::new(lmod_dir.join(UPDATE_SCRIPT));
    cmd.arg("-d")
        .arg(cache_dir(basedir, arch))
        .arg("-t")
        .arg(system_file(basedir, arch));
    if !subpaths.is_empty() {
        cmd.arg(subpaths);
    }

    Ok(Some(cmd))
}

/// Rebuild the cache of every configured architecture
///
/// Returns the status of the first failing architecture, or `(0, "")` when all succeed.
pub fn refresh(settings: &Settings) -> Result<ToolStatus, CacheError> {
    settings.lmod.require(&[Required::LmodDir])?;
    let lmod_dir = settings.lmod.lmod_dir()?;
    let basedir = settings.module_basedir.as_path();

    for arch in resolve_architectures(basedir, &settings.architectures)? {
        let Some(mut cmd) = update_command(lmod_dir, basedir, &arch)? else {
            tracing::debug!(arch = %arch.to_string_lossy(), "No module directory, skipping");
            continue;
        };

        tracing::debug!(
            arch = %arch.to_string_lossy(),
            command = %describe_command(&cmd),
            "Creating cache"
        );
        let status = run_command(&mut cmd)?;
        if !status.is_success() {
            tracing::debug!(
                arch = %arch.to_string_lossy(),
                code = status.code,
                "Cache update failed"
            );
            return Ok(status);
        }
    }

    Ok(ToolStatus::success())
}
