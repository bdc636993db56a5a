//! Ls command implementation
//!
//! Lists the configured tasks with their resolved roots, granularity and
//! overwrite policy. Read-only; useful for sanity-checking a
//! configuration before deploying.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use legacy_link::exit_codes;
use legacy_link::reconcile::Granularity;

use crate::cli::Context;

/// Arguments for the ls command
#[derive(Args, Debug)]
pub struct LsArgs {
    /// Path to the configuration file
    #[arg(short, long, value_name = "FILE", env = "LEGACY_LINK_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Execute the ls command
pub fn execute(args: LsArgs, context: &Context) -> Result<i32> {
    let (config, project_root) = super::load_config(args.config)?;

    let environment = config
        .resolve_environment(None, &project_root)
        .map(|env| env.to_string())
        .unwrap_or_else(|_| "(unresolved; pass --env at deploy time)".to_string());

    println!(
        "{} Configured tasks (environment: {})",
        context.output.emoji("📋", "[TASKS]"),
        environment
    );

    for task in &config.tasks {
        let granularity = match task.granularity {
            Granularity::File => "file",
            Granularity::Directory => "directory",
        };
        println!("   {}", task.name);
        println!("      source:      {}", task.source.display());
        println!("      target:      {}", task.target.display());
        println!("      granularity: {}", granularity);
        println!("      overwrite:   {:?}", task.overwrite);
        if !task.patterns.is_empty() {
            println!("      patterns:    {}", task.patterns.join(", "));
        }
    }

    if !config.required_folders.is_empty() {
        println!(
            "   {} required folder(s) checked by 'legacy-link check'",
            config.required_folders.len()
        );
    }

    Ok(exit_codes::SUCCESS)
}
