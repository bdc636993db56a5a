//! Deploy command implementation
//!
//! The deploy command runs the full reconciliation session: every
//! configured task is walked layer by layer and the target tree is
//! converged onto the source tree via symlinks. Per-entry conflicts never
//! abort the run; they are printed at the end and reflected in the exit
//! code (3). A fatal task error (missing source root) aborts with exit
//! code 1.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::Result;
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};

use legacy_link::exit_codes;
use legacy_link::reconcile::{EntryOutcome, RunSummary};
use legacy_link::session::{Session, SessionOptions, SessionReport, SessionStatus};
use legacy_link::suggestions;

use crate::cli::Context;

/// Arguments for the deploy command
#[derive(Args, Debug)]
pub struct DeployArgs {
    /// Path to the configuration file
    #[arg(short, long, value_name = "FILE", env = "LEGACY_LINK_CONFIG")]
    pub config: Option<PathBuf>,

    /// Environment whose overlay layer takes precedence
    #[arg(short, long, value_name = "NAME", env = "LEGACY_LINK_ENV")]
    pub env: Option<String>,

    /// Run only the named task (repeatable)
    #[arg(long = "task", value_name = "NAME")]
    pub tasks: Vec<String>,

    /// Show what would be done without making changes
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Emit the session report as JSON
    #[arg(long)]
    pub json: bool,
}

/// Execute the deploy command
pub fn execute(args: DeployArgs, context: &Context) -> Result<i32> {
    let start_time = Instant::now();

    let (config, project_root) = super::load_config(args.config)?;
    let environment = config.resolve_environment(args.env.as_deref(), &project_root)?;
    let session = Session::from_config(&config, &project_root, &environment)?;

    let task_filter = validate_task_filter(&args.tasks, &session)?;

    let banner = !context.quiet && !args.json;
    if banner {
        println!(
            "{} Legacy Link Deploy (environment: {})",
            context.output.emoji("🔗", "[DEPLOY]"),
            environment
        );
        if args.dry_run {
            println!(
                "{} DRY RUN MODE - No changes will be made",
                context.output.emoji("🔎", "[DRY-RUN]")
            );
        }
        println!();
    }

    let spinner = if banner && !context.verbose {
        let bar = ProgressBar::new_spinner();
        bar.set_style(ProgressStyle::with_template("{spinner} {msg}").unwrap_or_else(|_| ProgressStyle::default_spinner()));
        bar.set_message("Reconciling tasks...");
        bar.enable_steady_tick(std::time::Duration::from_millis(120));
        Some(bar)
    } else {
        None
    };

    let options = SessionOptions {
        dry_run: args.dry_run,
        task_filter,
    };
    let result = session.run(&options);

    if let Some(bar) = spinner {
        bar.finish_and_clear();
    }

    let report = result?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(status_code(&report));
    }

    for summary in &report.summaries {
        print_summary(summary, context);
    }

    let errors = report.all_errors();
    if !errors.is_empty() && !context.quiet {
        println!();
        println!(
            "{} {} entries need attention:",
            context.output.emoji("⚠️", "[WARN]"),
            errors.len()
        );
        for (task, path, cause) in &errors {
            println!("   [{}] {}: {}", task, path, cause);
        }
    }

    if !context.quiet {
        println!();
        match report.status() {
            SessionStatus::Clean => println!(
                "{} Deployed successfully in {:.2}s ({} links created, {} entries checked)",
                context.output.emoji("✅", "[OK]"),
                start_time.elapsed().as_secs_f64(),
                report.total_created(),
                report.total_attempted()
            ),
            SessionStatus::Conflicts => println!(
                "{} Deploy completed with conflicts in {:.2}s",
                context.output.emoji("⚠️", "[WARN]"),
                start_time.elapsed().as_secs_f64()
            ),
        }
    }

    Ok(status_code(&report))
}

/// Reject unknown `--task` names up front, with a did-you-mean hint.
fn validate_task_filter(requested: &[String], session: &Session) -> Result<Option<Vec<String>>> {
    if requested.is_empty() {
        return Ok(None);
    }
    let configured = session.task_names();
    for name in requested {
        if !configured.contains(&name.as_str()) {
            return Err(suggestions::unknown_task(name, &configured));
        }
    }
    Ok(Some(requested.to_vec()))
}

fn status_code(report: &SessionReport) -> i32 {
    match report.status() {
        SessionStatus::Clean => exit_codes::SUCCESS,
        SessionStatus::Conflicts => exit_codes::CONFLICTS,
    }
}

/// Print one task's per-entry lines and summary line.
fn print_summary(summary: &RunSummary, context: &Context) {
    if context.quiet {
        return;
    }

    println!(
        "{} {}",
        context.output.emoji("📦", "[TASK]"),
        summary.task
    );

    let prefix = if summary.dry_run { "would be " } else { "" };
    for entry in &summary.entries {
        let quiet_outcome = matches!(entry.outcome, EntryOutcome::AlreadyLinked);
        if quiet_outcome && !context.verbose {
            continue;
        }
        println!(
            "   {}: {}{}",
            entry.path.display(),
            if quiet_outcome { "" } else { prefix },
            entry.outcome.describe()
        );
    }

    println!(
        "   {} attempted, {} created, {} already linked, {} backed up, {} blocked, {} failed",
        summary.attempted,
        summary.created,
        summary.already_linked,
        summary.backed_up,
        summary.blocked,
        summary.failed
    );
}
