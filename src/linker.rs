//! # Atomic Link Execution
//!
//! Performs the single filesystem mutation a resolved action calls for:
//! a link creation, or a rename-aside followed by a link creation. The
//! linker knows nothing about overlay layers or tasks; it receives an
//! absolute source, a target path, and the action to execute.
//!
//! Filesystems here have no native "replace symlink" primitive, so the
//! rename-then-link sequence is a best-effort approximation of an atomic
//! move-in, not a transactional guarantee. When the link step fails after
//! a successful rename, the rename is rolled back if possible; when even
//! the rollback fails, the error names the backup path prominently so the
//! operator can recover the content by hand.

use std::fs;
use std::io;
use std::path::Path;

use log::{debug, warn};

use crate::conflict::Action;
use crate::error::{Error, Result};

/// What actually happened at a target path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkOutcome {
    /// A new link was created where nothing existed.
    Created,
    /// A stale or broken link was replaced by the desired one.
    Replaced,
    /// The desired link was already in place; nothing changed.
    AlreadyLinked,
    /// A real entry was renamed to the backup slot, then linked over.
    BackedUp { backup: std::path::PathBuf },
    /// The resolver blocked the entry; nothing changed.
    Blocked(crate::conflict::BlockReason),
}

/// Execute a resolved action.
///
/// For `CreateLink` and `BackupThenLink`, a target that turns out to be
/// occupied by an unexpected entry surfaces as `Error::RaceLost`; the
/// caller re-classifies and retries once before recording a conflict.
pub fn execute(source: &Path, target: &Path, action: &Action) -> Result<LinkOutcome> {
    match action {
        Action::AlreadyCorrect => Ok(LinkOutcome::AlreadyLinked),
        Action::Blocked(reason) => Ok(LinkOutcome::Blocked(reason.clone())),
        Action::CreateLink => create(source, target),
        Action::BackupThenLink { backup } => backup_then_link(source, target, backup),
    }
}

/// Create the link, removing a stale link first when one is present.
fn create(source: &Path, target: &Path) -> Result<LinkOutcome> {
    let mut replaced = false;
    match fs::symlink_metadata(target) {
        Ok(meta) => {
            // Only a link may be removed here. A real entry at this point
            // means the target changed after resolution.
            if !meta.file_type().is_symlink() {
                return Err(Error::RaceLost {
                    path: target.display().to_string(),
                });
            }
            remove_link(target).map_err(|e| Error::Link {
                path: target.display().to_string(),
                message: format!("failed to remove stale link: {}", e),
            })?;
            replaced = true;
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err(Error::Io(e)),
    }

    match create_symlink(source, target) {
        Ok(()) => {
            debug!("linked {} -> {}", target.display(), source.display());
            Ok(if replaced {
                LinkOutcome::Replaced
            } else {
                LinkOutcome::Created
            })
        }
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => Err(Error::RaceLost {
            path: target.display().to_string(),
        }),
        Err(e) => Err(Error::Link {
            path: target.display().to_string(),
            message: e.to_string(),
        }),
    }
}

/// Rename the real entry aside, then create the link in its place.
fn backup_then_link(source: &Path, target: &Path, backup: &Path) -> Result<LinkOutcome> {
    // The backup slot was free at resolution time; check again right
    // before the only destructive step.
    if fs::symlink_metadata(backup).is_ok() {
        return Err(Error::Conflict {
            path: target.display().to_string(),
            message: format!("backup path '{}' already exists", backup.display()),
        });
    }

    fs::rename(target, backup).map_err(|e| Error::Conflict {
        path: target.display().to_string(),
        message: format!("could not rename to '{}': {}", backup.display(), e),
    })?;
    debug!("renamed {} -> {}", target.display(), backup.display());

    match create_symlink(source, target) {
        Ok(()) => {
            debug!("linked {} -> {}", target.display(), source.display());
            Ok(LinkOutcome::BackedUp {
                backup: backup.to_path_buf(),
            })
        }
        Err(link_err) => {
            // The rename went through but the link did not. Try to put the
            // entry back; either way the content still exists on disk.
            match fs::rename(backup, target) {
                Ok(()) => {
                    warn!(
                        "rolled back rename of {} after link failure",
                        target.display()
                    );
                    Err(Error::Link {
                        path: target.display().to_string(),
                        message: link_err.to_string(),
                    })
                }
                Err(rollback_err) => {
                    warn!(
                        "could not roll back rename of {}: {}",
                        target.display(),
                        rollback_err
                    );
                    Err(Error::BackupStranded {
                        path: target.display().to_string(),
                        backup: backup.display().to_string(),
                        message: link_err.to_string(),
                    })
                }
            }
        }
    }
}

/// Create a symbolic link at `target` pointing to `source`.
///
/// The source path is linked literally; it is never dereferenced or
/// re-resolved here.
#[cfg(unix)]
fn create_symlink(source: &Path, target: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(source, target)
}

/// Create a symbolic link at `target` pointing to `source`.
#[cfg(windows)]
fn create_symlink(source: &Path, target: &Path) -> io::Result<()> {
    if source.is_dir() {
        std::os::windows::fs::symlink_dir(source, target)
    } else {
        std::os::windows::fs::symlink_file(source, target)
    }
}

/// Remove a link without touching what it points at.
fn remove_link(target: &Path) -> io::Result<()> {
    #[cfg(windows)]
    {
        if fs::symlink_metadata(target)?.is_dir() {
            return fs::remove_dir(target);
        }
    }
    fs::remove_file(target)
}
