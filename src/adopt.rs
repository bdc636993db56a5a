//! # Adopting Target Entries
//!
//! The inverse of deployment: take real (non-link) entries that live in a
//! task's target root, move them into a source layer, and symlink them
//! back. This is how a target tree that grew content in place (a
//! siteaccess edited directly in the runtime, a config file dropped next
//! to the links) is brought under source control without losing anything.
//!
//! Adoption only ever moves an entry when the destination inside the
//! source layer is free; an occupied destination skips the entry and
//! reports why. The move itself is a rename followed by a link-back, and
//! a failed link-back rolls the rename back, so content never ends up
//! unreachable.

use std::fs;
use std::path::PathBuf;

use log::debug;
use serde::Serialize;

use crate::classify::classify;
use crate::error::{Error, Result};
use crate::reconcile::{Granularity, ReconciliationTask};

/// Result of one adopt pass over a task's target root.
#[derive(Debug, Clone, Serialize)]
pub struct AdoptReport {
    pub task: String,
    pub layer: String,
    pub dry_run: bool,
    /// Entries moved into the source layer and linked back.
    pub adopted: Vec<PathBuf>,
    /// Entries left in place, with the reason.
    pub skipped: Vec<(PathBuf, String)>,
}

impl AdoptReport {
    pub fn has_skips(&self) -> bool {
        !self.skipped.is_empty()
    }
}

/// Move every real top-level entry of the task's target root into the
/// given source layer, then symlink it back.
///
/// Entries of the wrong kind for the task's granularity, links, and
/// entries whose destination in the layer is occupied are skipped with a
/// recorded reason. With `dry_run` the report is produced without moving
/// anything.
pub fn adopt(task: &ReconciliationTask, layer: &str, dry_run: bool) -> Result<AdoptReport> {
    if !task.target_root.is_dir() {
        return Err(Error::MissingTargetRoot {
            task: task.name.clone(),
            target_root: task.target_root.display().to_string(),
        });
    }

    let mut report = AdoptReport {
        task: task.name.clone(),
        layer: layer.to_string(),
        dry_run,
        adopted: Vec::new(),
        skipped: Vec::new(),
    };

    let layer_dir = task.source_root.join(layer);

    let mut listed: Vec<_> = fs::read_dir(&task.target_root)?.collect::<std::io::Result<Vec<_>>>()?;
    listed.sort_by_key(|entry| entry.file_name());

    for entry in listed {
        let name = PathBuf::from(entry.file_name());
        let target = entry.path();
        let state = classify(&target)?;

        if state.is_link() {
            debug!("{} is already a link, nothing to adopt", target.display());
            continue;
        }

        // Entries of the wrong kind for the task's granularity are not
        // linkable units; leave them alone, as deploy does
        let wanted = match task.granularity {
            Granularity::Directory => state == crate::classify::TargetState::RealDirectory,
            Granularity::File => state == crate::classify::TargetState::RealFile,
        };
        if !wanted {
            debug!(
                "skipping {} ({}) at {:?} granularity",
                target.display(),
                state.describe(),
                task.granularity
            );
            continue;
        }

        let destination = layer_dir.join(&name);
        if fs::symlink_metadata(&destination).is_ok() {
            report.skipped.push((
                name,
                format!("'{}' already exists in the layer", destination.display()),
            ));
            continue;
        }

        if dry_run {
            report.adopted.push(name);
            continue;
        }

        fs::create_dir_all(&layer_dir)?;
        fs::rename(&target, &destination).map_err(|e| Error::Link {
            path: target.display().to_string(),
            message: format!("could not move into '{}': {}", destination.display(), e),
        })?;
        debug!("moved {} -> {}", target.display(), destination.display());

        if let Err(link_err) = create_symlink(&destination, &target) {
            // Put the entry back rather than leave the target without it
            match fs::rename(&destination, &target) {
                Ok(()) => {
                    return Err(Error::Link {
                        path: target.display().to_string(),
                        message: link_err.to_string(),
                    })
                }
                Err(_) => {
                    return Err(Error::BackupStranded {
                        path: target.display().to_string(),
                        backup: destination.display().to_string(),
                        message: link_err.to_string(),
                    })
                }
            }
        }

        report.adopted.push(name);
    }

    Ok(report)
}

#[cfg(unix)]
fn create_symlink(source: &std::path::Path, target: &std::path::Path) -> std::io::Result<()> {
    std::os::unix::fs::symlink(source, target)
}

#[cfg(windows)]
fn create_symlink(source: &std::path::Path, target: &std::path::Path) -> std::io::Result<()> {
    if source.is_dir() {
        std::os::windows::fs::symlink_dir(source, target)
    } else {
        std::os::windows::fs::symlink_file(source, target)
    }
}
