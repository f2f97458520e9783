//! Data-driven boost configuration.
//!
//! Reads the TOML configuration file and resolves it into the immutable
//! [`boost_core::BoostConfig`] consumed by the runtime. Malformed entries are
//! skipped (or replaced by their defaults) with a warning instead of failing
//! startup.

pub mod loaders;

pub use loaders::{BoostConfigSpec, ConfigLoader, DEFAULT_CONFIG, LoadResult};
