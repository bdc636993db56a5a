//! Adopt command implementation
//!
//! Moves real (non-link) entries found in a task's target root into a
//! source layer and symlinks them back. This is how content that grew in
//! place inside the runtime tree (a siteaccess edited directly, a config
//! file dropped next to the links) is brought under the project's source
//! tree without losing anything.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use legacy_link::adopt::adopt;
use legacy_link::defaults::COMMON_LAYER;
use legacy_link::exit_codes;
use legacy_link::session::Session;
use legacy_link::suggestions;

use crate::cli::Context;

/// Arguments for the adopt command
#[derive(Args, Debug)]
pub struct AdoptArgs {
    /// Path to the configuration file
    #[arg(short, long, value_name = "FILE", env = "LEGACY_LINK_CONFIG")]
    pub config: Option<PathBuf>,

    /// Environment whose overlay layer takes precedence
    #[arg(short, long, value_name = "NAME", env = "LEGACY_LINK_ENV")]
    pub env: Option<String>,

    /// The task whose target root is scanned
    #[arg(long, value_name = "NAME")]
    pub task: String,

    /// The source layer adopted entries are moved into
    #[arg(long, value_name = "LAYER", default_value = COMMON_LAYER)]
    pub layer: String,

    /// Show what would be adopted without moving anything
    #[arg(short = 'n', long)]
    pub dry_run: bool,
}

/// Execute the adopt command
pub fn execute(args: AdoptArgs, context: &Context) -> Result<i32> {
    let (config, project_root) = super::load_config(args.config)?;
    let environment = config.resolve_environment(args.env.as_deref(), &project_root)?;

    if args.layer != COMMON_LAYER && args.layer != environment {
        return Err(suggestions::unknown_layer(&args.layer, &environment));
    }

    let session = Session::from_config(&config, &project_root, &environment)?;
    let Some(task) = session.task(&args.task) else {
        return Err(suggestions::unknown_task(&args.task, &session.task_names()));
    };

    let report = adopt(task, &args.layer, args.dry_run)?;

    if !context.quiet {
        println!(
            "{} Adopt '{}' into layer '{}'{}",
            context.output.emoji("📥", "[ADOPT]"),
            report.task,
            report.layer,
            if report.dry_run { " (dry run)" } else { "" }
        );
        for name in &report.adopted {
            println!(
                "   {}: {}",
                name.display(),
                if report.dry_run {
                    "would be moved and linked back"
                } else {
                    "moved and linked back"
                }
            );
        }
        for (name, reason) in &report.skipped {
            println!("   {}: skipped ({})", name.display(), reason);
        }
        println!(
            "   {} adopted, {} skipped",
            report.adopted.len(),
            report.skipped.len()
        );
    }

    if report.has_skips() {
        Ok(exit_codes::CONFLICTS)
    } else {
        Ok(exit_codes::SUCCESS)
    }
}
