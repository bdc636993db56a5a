//! Default values for legacy-link configuration.
//!
//! This module provides centralized default values used across commands,
//! ensuring consistency and avoiding duplication.

use std::path::PathBuf;

/// Name of the configuration file looked up in the project root.
///
/// Can be overridden by the `--config` CLI flag or the `LEGACY_LINK_CONFIG`
/// environment variable.
pub const CONFIG_FILE: &str = ".legacy-link.yaml";

/// Name of the base overlay layer shared by every environment.
pub const COMMON_LAYER: &str = "common";

/// Suffix appended to a displaced real entry's file name.
pub const BACKUP_SUFFIX: &str = ".bak";

/// Returns the default configuration file path (relative to the current
/// directory).
pub fn default_config_path() -> PathBuf {
    PathBuf::from(CONFIG_FILE)
}
