//! # Check Command Implementation
//!
//! This module implements the `check` subcommand, a safe, read-only
//! operation that never modifies any files.
//!
//! ## Functionality
//!
//! - **Configuration Validation**: parses and validates the configuration
//!   file and reports a summary of the loaded tasks.
//!
//! - **Required Folders**: verifies that every folder listed under
//!   `required_folders` exists, printing the configured hint for each
//!   missing one. A missing required folder is a configuration error.
//!
//! - **Target Tree Inspection**: classifies every entry of every task
//!   (the same classify/resolve pipeline the deploy command uses, in
//!   dry-run mode) and reports what a deploy would do. Conflicts are
//!   reflected in the exit code (3) without touching anything.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use legacy_link::exit_codes;
use legacy_link::session::{Session, SessionOptions, SessionStatus};

use crate::cli::Context;

/// Arguments for the check command
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Path to the configuration file
    #[arg(short, long, value_name = "FILE", env = "LEGACY_LINK_CONFIG")]
    pub config: Option<PathBuf>,

    /// Environment whose overlay layer takes precedence
    #[arg(short, long, value_name = "NAME", env = "LEGACY_LINK_ENV")]
    pub env: Option<String>,
}

/// Execute the `check` command.
pub fn execute(args: CheckArgs, context: &Context) -> Result<i32> {
    let (config, project_root) = super::load_config(args.config)?;

    if !context.quiet {
        println!(
            "{} Configuration loaded successfully",
            context.output.emoji("✅", "[OK]")
        );
        println!("   Tasks: {}", config.tasks.len());
    }

    // Folder existence check before anything else; a missing required
    // folder means the project layout is not ready for deployment.
    let mut missing = Vec::new();
    for folder in &config.required_folders {
        let path = project_root.join(&folder.path);
        if path.is_dir() {
            if !context.quiet {
                println!("   Required folder: {} is present", folder.path.display());
            }
        } else {
            missing.push(folder);
        }
    }
    if !missing.is_empty() {
        let mut message = String::from("Missing required folders:\n");
        for folder in &missing {
            message.push_str(&format!("  - {}", folder.path.display()));
            if let Some(hint) = &folder.hint {
                message.push_str(&format!(" ({})", hint));
            }
            message.push('\n');
        }
        return Err(anyhow::anyhow!("{}", message.trim_end()));
    }

    let environment = config.resolve_environment(args.env.as_deref(), &project_root)?;
    let session = Session::from_config(&config, &project_root, &environment)?;

    let options = SessionOptions {
        dry_run: true,
        task_filter: None,
    };
    let report = session.run(&options)?;

    if !context.quiet {
        println!();
        for summary in &report.summaries {
            println!(
                "   {}: {} entries ({} to create, {} already linked, {} conflicts)",
                summary.task,
                summary.attempted,
                summary.created,
                summary.already_linked,
                summary.blocked + summary.failed
            );
            if context.verbose {
                for entry in &summary.entries {
                    println!("      {}: {}", entry.path.display(), entry.outcome.describe());
                }
            }
        }
    }

    match report.status() {
        SessionStatus::Clean => {
            if !context.quiet {
                println!();
                println!(
                    "{} Target tree is deployable without conflicts",
                    context.output.emoji("✅", "[OK]")
                );
            }
            Ok(exit_codes::SUCCESS)
        }
        SessionStatus::Conflicts => {
            if !context.quiet {
                println!();
                println!(
                    "{} Conflicts would block a deploy:",
                    context.output.emoji("⚠️", "[WARN]")
                );
                for (task, path, cause) in report.all_errors() {
                    println!("   [{}] {}: {}", task, path, cause);
                }
            }
            Ok(exit_codes::CONFLICTS)
        }
    }
}
