//! # Reconciliation Session
//!
//! Runs an ordered list of named reconciliation tasks against a project
//! layout and aggregates their summaries. Tasks run sequentially; each is
//! independently idempotent. A fatal task error (a source root with no
//! layers, or an I/O failure under `strict`) aborts the session with the
//! task name attached; per-entry conflicts are collected across all tasks
//! and reported at the end without aborting anything.
//!
//! Tasks declare disjoint target subtrees; the configuration loader
//! rejects overlapping target roots before a session is ever built, so no
//! locking is needed between tasks.

use std::path::Path;

use log::debug;
use serde::Serialize;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::reconcile::{reconcile, ReconcileOptions, ReconciliationTask, RunSummary};

/// Options applied to a whole session run.
#[derive(Debug, Clone, Default)]
pub struct SessionOptions {
    /// Classify and resolve everything but mutate nothing.
    pub dry_run: bool,
    /// Restrict the run to these task names (in configuration order).
    pub task_filter: Option<Vec<String>>,
}

/// Overall result classification of a completed session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    /// Every entry converged; nothing needs attention.
    Clean,
    /// The session completed but some entries were blocked or failed.
    Conflicts,
}

/// Aggregated result of a completed session.
#[derive(Debug, Clone, Serialize)]
pub struct SessionReport {
    pub dry_run: bool,
    pub summaries: Vec<RunSummary>,
}

impl SessionReport {
    pub fn status(&self) -> SessionStatus {
        if self.summaries.iter().any(RunSummary::needs_attention) {
            SessionStatus::Conflicts
        } else {
            SessionStatus::Clean
        }
    }

    pub fn total_created(&self) -> usize {
        self.summaries.iter().map(|s| s.created).sum()
    }

    pub fn total_attempted(&self) -> usize {
        self.summaries.iter().map(|s| s.attempted).sum()
    }

    /// Every blocked or failed entry across all tasks, with the owning
    /// task name, in run order.
    pub fn all_errors(&self) -> Vec<(String, String, String)> {
        let mut errors = Vec::new();
        for summary in &self.summaries {
            for (path, cause) in &summary.errors {
                errors.push((
                    summary.task.clone(),
                    path.display().to_string(),
                    cause.clone(),
                ));
            }
        }
        errors
    }
}

/// An ordered list of reconciliation tasks sharing one environment.
pub struct Session {
    tasks: Vec<ReconciliationTask>,
    strict: bool,
}

impl Session {
    /// Build a session from a validated configuration.
    ///
    /// Task roots are resolved against `project_root`; the environment has
    /// already been resolved by the caller (flag, config key, or lookup).
    pub fn from_config(config: &Config, project_root: &Path, environment: &str) -> Result<Self> {
        let mut tasks = Vec::with_capacity(config.tasks.len());
        for task_config in &config.tasks {
            tasks.push(ReconciliationTask::new(
                task_config.name.clone(),
                project_root.join(&task_config.source),
                project_root.join(&task_config.target),
                environment,
                task_config.overwrite,
                task_config.granularity,
                &task_config.patterns,
            )?);
        }
        Ok(Self {
            tasks,
            strict: config.strict,
        })
    }

    /// The configured task names, in order.
    pub fn task_names(&self) -> Vec<&str> {
        self.tasks.iter().map(|t| t.name.as_str()).collect()
    }

    /// Look up a task by name.
    pub fn task(&self, name: &str) -> Option<&ReconciliationTask> {
        self.tasks.iter().find(|t| t.name == name)
    }

    /// Run the session.
    ///
    /// Returns the aggregated report, or the first fatal task error
    /// wrapped with its task name.
    pub fn run(&self, options: &SessionOptions) -> Result<SessionReport> {
        let reconcile_options = ReconcileOptions {
            dry_run: options.dry_run,
            strict: self.strict,
        };

        let mut summaries = Vec::new();
        for task in self.selected_tasks(options) {
            debug!("running task '{}'", task.name);
            match reconcile(task, &reconcile_options) {
                Ok(summary) => summaries.push(summary),
                Err(e) => {
                    return Err(Error::TaskFailed {
                        task: task.name.clone(),
                        source: Box::new(e),
                    })
                }
            }
        }

        Ok(SessionReport {
            dry_run: options.dry_run,
            summaries,
        })
    }

    fn selected_tasks<'a>(
        &'a self,
        options: &'a SessionOptions,
    ) -> impl Iterator<Item = &'a ReconciliationTask> {
        self.tasks.iter().filter(move |task| {
            options
                .task_filter
                .as_ref()
                .is_none_or(|names| names.iter().any(|n| n == &task.name))
        })
    }
}
