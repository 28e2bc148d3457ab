//! Cache module - Inspects the Lmod caches on disk
//!
//! Provides:
//! - Oldest cache timestamp across architectures
//! - Age and freshness checks

pub mod age;
