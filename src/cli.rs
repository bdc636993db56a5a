//! CLI argument parsing and command dispatch

use anyhow::Result;
use clap::{Parser, Subcommand};
use env_logger::{Builder, Env};

use legacy_link::output::OutputConfig;

use crate::commands;

/// Legacy Link - Deploy legacy CMS settings and extensions via symlinks
#[derive(Parser, Debug)]
#[command(name = "legacy-link")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Colorize output (always, never, auto)
    #[arg(long, global = true, value_name = "WHEN", default_value = "auto")]
    color: String,

    /// Set log level (error, warn, info, debug, trace)
    #[arg(long, global = true, value_name = "LEVEL", default_value = "warn")]
    log_level: String,

    /// Show detailed per-entry output
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Reconcile every configured task against the runtime tree
    Deploy(commands::deploy::DeployArgs),

    /// Validate the configuration and report the target tree state (read-only)
    Check(commands::check::CheckArgs),

    /// Move real entries from a task's target into a source layer and link them back
    Adopt(commands::adopt::AdoptArgs),

    /// List the configured tasks
    Ls(commands::ls::LsArgs),

    /// Create a starter .legacy-link.yaml configuration
    Init(commands::init::InitArgs),

    /// Generate shell completion scripts
    Completions(commands::completions::CompletionsArgs),
}

/// Shared state every command receives: output preferences and verbosity.
pub struct Context {
    pub output: OutputConfig,
    pub quiet: bool,
    pub verbose: bool,
}

impl Cli {
    /// Execute the CLI command, returning the process exit code.
    pub fn execute(self) -> Result<i32> {
        init_logging(&self.log_level);

        let context = Context {
            output: OutputConfig::from_env_and_flag(&self.color),
            quiet: self.quiet,
            verbose: self.verbose,
        };

        match self.command {
            Commands::Deploy(args) => commands::deploy::execute(args, &context),
            Commands::Check(args) => commands::check::execute(args, &context),
            Commands::Adopt(args) => commands::adopt::execute(args, &context),
            Commands::Ls(args) => commands::ls::execute(args, &context),
            Commands::Init(args) => commands::init::execute(args, &context),
            Commands::Completions(args) => commands::completions::execute(args),
        }
    }
}

/// Initialize the `env_logger` backend from the `--log-level` flag.
///
/// `RUST_LOG` still wins when set, so `RUST_LOG=legacy_link=trace` works
/// for targeted debugging.
fn init_logging(level: &str) {
    Builder::from_env(Env::default().default_filter_or(level))
        .format_timestamp(None)
        .try_init()
        .ok();
}
