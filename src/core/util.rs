//! Common utilities

use chrono::{DateTime, Local};
use std::process::Command;
use std::time::SystemTime;

use crate::core::error::CacheError;
use crate::core::model::ToolStatus;

/// Format a timestamp in local time for logs and reports
pub fn format_time(time: SystemTime) -> String {
    DateTime::<Local>::from(time)
        .format("%Y-%m-%d %H:%M:%S")
        .to_string()
}

/// Render a command line for logging
pub fn describe_command(cmd: &Command) -> String {
    std::iter::once(cmd.get_program())
        .chain(cmd.get_args())
        .map(|part| part.to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Run a command to completion, capturing exit code and combined output
pub fn run_command(cmd: &mut Command) -> Result<ToolStatus, CacheError> {
    let output = cmd.output().map_err(|source| CacheError::Spawn {
        command: describe_command(cmd),
        source,
    })?;

    let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
    combined.push_str(&String::from_utf8_lossy(&output.stderr));

    Ok(ToolStatus {
        code: output.status.code().unwrap_or(-1),
        output: combined,
    })
}
