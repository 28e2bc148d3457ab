//! Backends module - External tool integrations
//!
//! Provides:
//! - update: Lmod system cache rebuild (update_lmod_system_cache_files)
//! - lmod_config: Lmod configuration query (lmod bash --config-json)

pub mod lmod_config;
pub mod update;
