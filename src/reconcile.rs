//! # Tree Reconciliation
//!
//! Walks a task's layered source tree and converges the target tree to
//! reflect it, one entry at a time: classify the target path, resolve the
//! action, execute it, fold the outcome into the run summary.
//!
//! ## Overlay evaluation
//!
//! A source root holds up to two layer directories, `common/` and one named
//! after the environment. Layers are enumerated in that order and merged by
//! relative path with the later layer winning, so an environment entry
//! always decides where the link points. Merging before linking (rather
//! than linking layer by layer) keeps repeated runs quiet: the second run
//! finds every link already pointing at the winning layer and reports it
//! as already correct instead of churning through replace operations.
//!
//! ## Ownership of existing links
//!
//! A link whose destination lies inside the task's own source root was
//! created by an earlier run (or an earlier layer) and may be retargeted
//! freely; the configured overwrite policy only governs links pointing
//! somewhere foreign.
//!
//! Per-entry conflicts and I/O failures are recorded in the summary and
//! never abort the walk. The only fatal condition is a source root with no
//! layer directory at all: nothing to deploy is a configuration error.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::debug;
use serde::{Deserialize, Serialize};
use walkdir::WalkDir;

use crate::classify::{classify, TargetState};
use crate::conflict::{resolve, Action, OverwritePolicy};
use crate::defaults::COMMON_LAYER;
use crate::error::{Error, Result};
use crate::linker::{self, LinkOutcome};
use crate::path;

/// The unit a task links at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    /// Link every individual file; parent directories are created as real
    /// directories under the target root.
    #[default]
    File,
    /// Link each top-level directory of a layer as one unit (one link per
    /// siteaccess or extension directory). Plain files at the top level of
    /// a layer are skipped.
    Directory,
}

/// One named reconciliation task, immutable during a run.
#[derive(Debug, Clone)]
pub struct ReconciliationTask {
    pub name: String,
    /// Absolute root holding the layer directories.
    pub source_root: PathBuf,
    /// Absolute root the links are created under.
    pub target_root: PathBuf,
    pub environment: String,
    pub overwrite: OverwritePolicy,
    pub granularity: Granularity,
    patterns: Vec<glob::Pattern>,
}

impl ReconciliationTask {
    /// Build a task, compiling its glob patterns up front.
    pub fn new(
        name: impl Into<String>,
        source_root: PathBuf,
        target_root: PathBuf,
        environment: impl Into<String>,
        overwrite: OverwritePolicy,
        granularity: Granularity,
        patterns: &[String],
    ) -> Result<Self> {
        Ok(Self {
            name: name.into(),
            source_root,
            target_root,
            environment: environment.into(),
            overwrite,
            granularity,
            patterns: path::compile_patterns(patterns)?,
        })
    }

    /// Layer names in overlay order, later wins.
    pub fn layers(&self) -> Vec<&str> {
        if self.environment == COMMON_LAYER {
            vec![COMMON_LAYER]
        } else {
            vec![COMMON_LAYER, self.environment.as_str()]
        }
    }
}

/// Options applied to a single reconciliation run.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReconcileOptions {
    /// Classify and resolve every entry but mutate nothing.
    pub dry_run: bool,
    /// Treat per-entry I/O failures as fatal instead of recording them.
    pub strict: bool,
}

/// What happened (or, on a dry run, would happen) at one entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum EntryOutcome {
    /// A new link was created.
    Linked { source: PathBuf },
    /// A stale or broken link was retargeted.
    Relinked { source: PathBuf },
    /// The desired link was already in place.
    AlreadyLinked,
    /// A real entry was renamed aside, then linked over.
    BackedUp { source: PathBuf, backup: PathBuf },
    /// A conflict left the entry untouched.
    Blocked { reason: String },
    /// A link or rename syscall failed.
    Failed { message: String },
}

impl EntryOutcome {
    /// Whether this outcome created (or would create) a link.
    pub fn is_change(&self) -> bool {
        matches!(
            self,
            EntryOutcome::Linked { .. }
                | EntryOutcome::Relinked { .. }
                | EntryOutcome::BackedUp { .. }
        )
    }

    /// One-line description used in per-entry reporting.
    pub fn describe(&self) -> String {
        match self {
            EntryOutcome::Linked { source } => format!("linked -> {}", source.display()),
            EntryOutcome::Relinked { source } => format!("relinked -> {}", source.display()),
            EntryOutcome::AlreadyLinked => "already linked".to_string(),
            EntryOutcome::BackedUp { source, backup } => format!(
                "backed up to '{}', linked -> {}",
                backup.display(),
                source.display()
            ),
            EntryOutcome::Blocked { reason } => format!("blocked: {}", reason),
            EntryOutcome::Failed { message } => format!("failed: {}", message),
        }
    }
}

/// One processed entry: the path relative to the target root plus its
/// outcome.
#[derive(Debug, Clone, Serialize)]
pub struct EntryRecord {
    pub path: PathBuf,
    #[serde(flatten)]
    pub outcome: EntryOutcome,
}

/// Aggregated result of one task run.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub task: String,
    pub dry_run: bool,
    pub attempted: usize,
    pub created: usize,
    pub already_linked: usize,
    pub backed_up: usize,
    pub blocked: usize,
    pub failed: usize,
    /// Every processed entry in walk order.
    pub entries: Vec<EntryRecord>,
    /// Blocked and failed entries with their causes, in walk order.
    pub errors: Vec<(PathBuf, String)>,
}

impl RunSummary {
    fn new(task: &str, dry_run: bool) -> Self {
        Self {
            task: task.to_string(),
            dry_run,
            attempted: 0,
            created: 0,
            already_linked: 0,
            backed_up: 0,
            blocked: 0,
            failed: 0,
            entries: Vec::new(),
            errors: Vec::new(),
        }
    }

    fn record(&mut self, path: PathBuf, outcome: EntryOutcome) {
        self.attempted += 1;
        match &outcome {
            EntryOutcome::Linked { .. } | EntryOutcome::Relinked { .. } => self.created += 1,
            EntryOutcome::AlreadyLinked => self.already_linked += 1,
            EntryOutcome::BackedUp { .. } => {
                self.created += 1;
                self.backed_up += 1;
            }
            EntryOutcome::Blocked { reason } => {
                self.blocked += 1;
                self.errors.push((path.clone(), reason.clone()));
            }
            EntryOutcome::Failed { message } => {
                self.failed += 1;
                self.errors.push((path.clone(), message.clone()));
            }
        }
        self.entries.push(EntryRecord { path, outcome });
    }

    /// Whether any entry was blocked or failed.
    pub fn needs_attention(&self) -> bool {
        self.blocked > 0 || self.failed > 0
    }
}

/// Reconcile one task, returning the aggregated summary.
///
/// Fails fatally only when the source root has no layer directory at all
/// or, under `strict`, when a per-entry I/O failure occurs.
pub fn reconcile(task: &ReconciliationTask, options: &ReconcileOptions) -> Result<RunSummary> {
    let mut summary = RunSummary::new(&task.name, options.dry_run);

    let layer_dirs: Vec<(String, PathBuf)> = task
        .layers()
        .iter()
        .map(|layer| (layer.to_string(), task.source_root.join(layer)))
        .filter(|(_, dir)| dir.is_dir())
        .collect();

    if layer_dirs.is_empty() {
        return Err(Error::MissingSourceRoot {
            task: task.name.clone(),
            source_root: task.source_root.display().to_string(),
        });
    }

    // Merge layers by relative path, later layer wins.
    let mut desired: BTreeMap<PathBuf, PathBuf> = BTreeMap::new();
    for (layer, layer_dir) in &layer_dirs {
        debug!("task '{}': enumerating layer '{}'", task.name, layer);
        for (relative, source) in enumerate_layer(task, layer_dir)? {
            desired.insert(relative, source);
        }
    }

    for (relative, source) in desired {
        let target = task.target_root.join(&relative);
        let outcome = match process_entry(task, &source, &target, options) {
            Ok(outcome) => outcome,
            Err(Error::RaceLost { .. }) => EntryOutcome::Blocked {
                reason: "target changed during reconciliation".to_string(),
            },
            Err(Error::Conflict { message, .. }) => EntryOutcome::Blocked { reason: message },
            Err(e) if options.strict => {
                return Err(e);
            }
            Err(e) => EntryOutcome::Failed {
                message: e.to_string(),
            },
        };
        summary.record(relative, outcome);
    }

    Ok(summary)
}

/// Enumerate one layer directory as (relative path, absolute source) pairs
/// in a deterministic order.
fn enumerate_layer(
    task: &ReconciliationTask,
    layer_dir: &Path,
) -> Result<Vec<(PathBuf, PathBuf)>> {
    let mut entries = Vec::new();
    match task.granularity {
        Granularity::Directory => {
            let mut listed: Vec<_> = fs::read_dir(layer_dir)?.collect::<io::Result<Vec<_>>>()?;
            listed.sort_by_key(|entry| entry.file_name());
            for entry in listed {
                let source = entry.path();
                if !source.is_dir() {
                    // Stray files at the top of a directory-level layer are
                    // not linkable units
                    debug!("skipping non-directory entry {}", source.display());
                    continue;
                }
                entries.push((PathBuf::from(entry.file_name()), source));
            }
        }
        Granularity::File => {
            for entry in WalkDir::new(layer_dir).sort_by_file_name() {
                let entry = match entry {
                    Ok(entry) => entry,
                    Err(e) => {
                        let message = e.to_string();
                        return Err(Error::Io(
                            e.into_io_error().unwrap_or_else(|| io::Error::other(message)),
                        ));
                    }
                };
                if entry.file_type().is_dir() {
                    continue;
                }
                let Ok(relative) = entry.path().strip_prefix(layer_dir) else {
                    continue;
                };
                if !path::matches_any(&task.patterns, relative) {
                    continue;
                }
                entries.push((relative.to_path_buf(), entry.path().to_path_buf()));
            }
        }
    }
    Ok(entries)
}

/// Run the classify -> resolve -> execute sequence for one entry, with one
/// bounded retry when the target changes between classification and
/// mutation.
fn process_entry(
    task: &ReconciliationTask,
    source: &Path,
    target: &Path,
    options: &ReconcileOptions,
) -> Result<EntryOutcome> {
    if !options.dry_run && task.granularity == Granularity::File {
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
    }

    let mut retried = false;
    loop {
        // State is recomputed on every pass; nothing survives a retry.
        let state = classify(target)?;
        let policy = effective_policy(task, &state);
        let action = resolve(target, &state, source, policy);

        if options.dry_run {
            return Ok(planned_outcome(&state, action, source));
        }

        match linker::execute(source, target, &action) {
            Ok(outcome) => return Ok(entry_outcome(outcome, source)),
            Err(Error::RaceLost { .. }) if !retried => {
                debug!("retrying {} after lost race", target.display());
                retried = true;
            }
            Err(e) => return Err(e),
        }
    }
}

/// The overwrite policy that applies to this entry given what currently
/// occupies the target.
///
/// Links pointing into the task's own source root are owned by the
/// reconciler and may always be retargeted; only foreign links are
/// governed by the configured policy.
fn effective_policy(task: &ReconciliationTask, state: &TargetState) -> OverwritePolicy {
    if task.overwrite == OverwritePolicy::Force {
        return OverwritePolicy::Force;
    }
    if let TargetState::ValidSymlink(destination) = state {
        if destination.starts_with(&task.source_root) {
            return OverwritePolicy::Force;
        }
        if let (Ok(dest), Ok(root)) = (
            fs::canonicalize(destination),
            fs::canonicalize(&task.source_root),
        ) {
            if dest.starts_with(root) {
                return OverwritePolicy::Force;
            }
        }
    }
    task.overwrite
}

/// Map a resolved action to the outcome it would produce, without touching
/// the filesystem (dry-run reporting).
fn planned_outcome(state: &TargetState, action: Action, source: &Path) -> EntryOutcome {
    match action {
        Action::AlreadyCorrect => EntryOutcome::AlreadyLinked,
        Action::CreateLink if state.is_link() => EntryOutcome::Relinked {
            source: source.to_path_buf(),
        },
        Action::CreateLink => EntryOutcome::Linked {
            source: source.to_path_buf(),
        },
        Action::BackupThenLink { backup } => EntryOutcome::BackedUp {
            source: source.to_path_buf(),
            backup,
        },
        Action::Blocked(reason) => EntryOutcome::Blocked {
            reason: reason.to_string(),
        },
    }
}

fn entry_outcome(outcome: LinkOutcome, source: &Path) -> EntryOutcome {
    match outcome {
        LinkOutcome::Created => EntryOutcome::Linked {
            source: source.to_path_buf(),
        },
        LinkOutcome::Replaced => EntryOutcome::Relinked {
            source: source.to_path_buf(),
        },
        LinkOutcome::AlreadyLinked => EntryOutcome::AlreadyLinked,
        LinkOutcome::BackedUp { backup } => EntryOutcome::BackedUp {
            source: source.to_path_buf(),
            backup,
        },
        LinkOutcome::Blocked(reason) => EntryOutcome::Blocked {
            reason: reason.to_string(),
        },
    }
}
