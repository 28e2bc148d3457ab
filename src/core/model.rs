//! Result types produced by the backends

use serde::{Deserialize, Serialize};

/// Exit code and combined output of an external command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolStatus {
    /// Process exit code, `-1` when the process was killed by a signal
    pub code: i32,

    /// stdout followed by stderr
    pub output: String,
}

impl ToolStatus {
    /// The `(0, "")` status reported when every command succeeded
    pub fn success() -> Self {
        Self {
            code: 0,
            output: String::new(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.code == 0
    }
}

/// The parts of the Lmod configuration this tool cares about
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LmodConfig {
    /// `configT.mpath_root`
    pub modules_root: String,

    /// Directory of the first system cache
    pub cache_dir: String,

    /// Timestamp file of the first system cache
    pub cache_timestamp: String,
}
