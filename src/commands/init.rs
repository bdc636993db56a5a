//! # Init Command Implementation
//!
//! Creates a starter `.legacy-link.yaml` configuration file with a
//! commented example task list. When the file already exists the command
//! asks for confirmation before overwriting (or proceeds directly with
//! `--force`).

use std::fs;
use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use dialoguer::{theme::ColorfulTheme, Confirm};

use legacy_link::defaults;
use legacy_link::exit_codes;

use crate::cli::Context;

/// Starter configuration written by `legacy-link init`.
const STARTER_CONFIG: &str = r#"# legacy-link configuration
#
# Each task reconciles one layered source tree into a target tree via
# symlinks. A source root holds a 'common/' layer plus one directory per
# environment; the environment layer wins for identical relative paths.

environment: dev
# Or resolve the environment from a project file:
# environment_from:
#   file: app/config/parameters.yml
#   key: parameters.environment

tasks:
  - name: settings
    source: deploy/settings
    target: runtime/settings
    granularity: file
    overwrite: preserve

  # - name: siteaccesses
  #   source: deploy/siteaccess
  #   target: runtime/settings/siteaccess
  #   granularity: directory

# required_folders:
#   - path: runtime
#     hint: "move the legacy runtime tree here before deploying"
"#;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Where to write the configuration file
    #[arg(long, value_name = "PATH")]
    pub path: Option<PathBuf>,

    /// Overwrite an existing configuration file without asking
    #[arg(short, long)]
    pub force: bool,
}

/// Execute the `init` command.
pub fn execute(args: InitArgs, context: &Context) -> Result<i32> {
    let config_path = args.path.unwrap_or_else(defaults::default_config_path);

    if config_path.exists() && !args.force {
        let confirmed = Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(format!(
                "'{}' already exists. Overwrite?",
                config_path.display()
            ))
            .default(false)
            .interact()?;
        if !confirmed {
            println!("Aborted; existing configuration left untouched.");
            return Ok(exit_codes::SUCCESS);
        }
    }

    fs::write(&config_path, STARTER_CONFIG)?;

    if !context.quiet {
        println!(
            "{} Created {}",
            context.output.emoji("✅", "[OK]"),
            config_path.display()
        );
        println!("   Edit the task list, then run 'legacy-link check'");
    }

    Ok(exit_codes::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starter_config_is_valid() {
        let config = legacy_link::config::parse(STARTER_CONFIG).unwrap();
        assert_eq!(config.environment.as_deref(), Some("dev"));
        assert_eq!(config.tasks.len(), 1);
        assert_eq!(config.tasks[0].name, "settings");
    }
}
