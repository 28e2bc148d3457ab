//! Core module - Shared types and helpers
//!
//! This module provides:
//! - Error types
//! - Run settings (flags and environment)
//! - Module tree layout (architectures, subpaths, cache files)
//! - Result and report types
//! - Logging setup
//! - Common utilities

pub mod error;
pub mod layout;
pub mod logging;
pub mod model;
pub mod report;
pub mod settings;
pub mod util;
