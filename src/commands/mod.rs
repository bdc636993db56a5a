//! # CLI Command Implementations
//!
//! This module contains the implementation for each subcommand of the
//! `legacy-link` command-line tool. Each subcommand is defined in its own
//! file to keep the logic separated and maintainable.
//!
//! ## Structure
//!
//! Each command module typically contains:
//! - An `Args` struct that defines the command-specific arguments and
//!   options, derived using `clap`.
//! - An `execute` function that takes the parsed `Args` (and the shared
//!   CLI context) and performs the command's logic, returning the process
//!   exit code.
//!
//! The `execute` function is the main entry point for the command and is
//! responsible for orchestrating the necessary operations, calling into
//! the `legacy_link` library to perform the core logic.

pub mod adopt;
pub mod check;
pub mod completions;
pub mod deploy;
pub mod init;
pub mod ls;

use std::path::{Path, PathBuf};

use anyhow::Result;

use legacy_link::config::{self, Config};
use legacy_link::defaults;
use legacy_link::suggestions;

/// Resolve the configuration path, load the configuration, and determine
/// the project root (the directory holding the configuration file).
///
/// Shared by every command that reads the configuration.
pub fn load_config(config_arg: Option<PathBuf>) -> Result<(Config, PathBuf)> {
    let config_path = config_arg.unwrap_or_else(defaults::default_config_path);
    if !config_path.exists() {
        return Err(suggestions::config_not_found(&config_path));
    }

    let config = config::from_file(&config_path)?;

    let absolute = std::fs::canonicalize(&config_path)?;
    let project_root = absolute
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));

    Ok((config, project_root))
}
