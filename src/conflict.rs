//! # Conflict Resolution
//!
//! Decides, for a single target path, whether an existing entry may be
//! replaced, must be renamed aside, or blocks the operation. This is the
//! core decision table of the reconciliation engine:
//!
//! | target state                        | decision                       |
//! |-------------------------------------|--------------------------------|
//! | missing                             | create the link                |
//! | link to the desired source          | already correct (no-op)        |
//! | link elsewhere, policy `force`      | create the link (replace)      |
//! | link elsewhere, policy `preserve`   | blocked                        |
//! | real entry, backup slot free        | rename aside, then link        |
//! | real entry, backup slot occupied    | blocked                        |
//! | broken link                         | create the link (replace)      |
//!
//! Real entries are never deleted: the rename aside is the only step that
//! touches their content, and it only runs when the backup slot is free.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::classify::TargetState;
use crate::path::backup_path;

/// What to do when the target path is already linked somewhere else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverwritePolicy {
    /// Leave a foreign link in place and record a conflict.
    #[default]
    Preserve,
    /// Replace a foreign link with the desired one.
    Force,
}

/// Why an entry could not be reconciled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockReason {
    /// The target is already a link, but it points somewhere else and the
    /// policy forbids replacing it.
    LinkedElsewhere { points_to: PathBuf },
    /// A real entry occupies the target and its backup slot is taken too.
    BackupOccupied { backup: PathBuf },
    /// The target kept changing underneath the reconciler.
    Raced,
}

impl fmt::Display for BlockReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockReason::LinkedElsewhere { points_to } => {
                write!(f, "already linked elsewhere (-> {})", points_to.display())
            }
            BlockReason::BackupOccupied { backup } => {
                write!(f, "backup path '{}' already exists", backup.display())
            }
            BlockReason::Raced => write!(f, "target changed during reconciliation"),
        }
    }
}

/// The resolved action for one target path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Create the link (replacing a stale or broken link if one is there).
    CreateLink,
    /// The desired link already exists; nothing to do.
    AlreadyCorrect,
    /// Rename the real entry to the backup slot, then create the link.
    BackupThenLink { backup: PathBuf },
    /// No safe action exists; record the reason and move on.
    Blocked(BlockReason),
}

/// Resolve the action for `target`, currently in `state`, that should end
/// up linking to `desired`.
///
/// Probes the backup slot on disk when a real entry is in the way; all
/// other decisions are pure. The caller re-classifies immediately before
/// executing, so the answer is only as fresh as the state handed in.
pub fn resolve(
    target: &Path,
    state: &TargetState,
    desired: &Path,
    policy: OverwritePolicy,
) -> Action {
    match state {
        TargetState::Missing => Action::CreateLink,
        TargetState::BrokenSymlink(_) => Action::CreateLink,
        TargetState::ValidSymlink(points_to) => {
            if points_at(points_to, desired) {
                Action::AlreadyCorrect
            } else if policy == OverwritePolicy::Force {
                Action::CreateLink
            } else {
                Action::Blocked(BlockReason::LinkedElsewhere {
                    points_to: points_to.clone(),
                })
            }
        }
        TargetState::RealFile | TargetState::RealDirectory => {
            let backup = backup_path(target);
            if fs::symlink_metadata(&backup).is_ok() {
                Action::Blocked(BlockReason::BackupOccupied { backup })
            } else {
                Action::BackupThenLink { backup }
            }
        }
    }
}

/// Whether an existing link destination denotes the desired source.
///
/// Compares literally first; falls back to comparing canonical forms so
/// that `deploy/../deploy/settings` and `deploy/settings` count as the
/// same source when both resolve.
fn points_at(current: &Path, desired: &Path) -> bool {
    if current == desired {
        return true;
    }
    match (fs::canonicalize(current), fs::canonicalize(desired)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use tempfile::TempDir;

    fn desired() -> PathBuf {
        PathBuf::from("/project/deploy/settings/common/override")
    }

    #[test]
    fn test_missing_creates_link() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("override");
        let action = resolve(
            &target,
            &TargetState::Missing,
            &desired(),
            OverwritePolicy::Preserve,
        );
        assert_eq!(action, Action::CreateLink);
    }

    #[test]
    fn test_correct_link_is_noop() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("override");
        let action = resolve(
            &target,
            &TargetState::ValidSymlink(desired()),
            &desired(),
            OverwritePolicy::Preserve,
        );
        assert_eq!(action, Action::AlreadyCorrect);
    }

    #[test]
    fn test_foreign_link_blocked_under_preserve() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("override");
        let elsewhere = PathBuf::from("/somewhere/else");
        let action = resolve(
            &target,
            &TargetState::ValidSymlink(elsewhere.clone()),
            &desired(),
            OverwritePolicy::Preserve,
        );
        assert_eq!(
            action,
            Action::Blocked(BlockReason::LinkedElsewhere {
                points_to: elsewhere
            })
        );
    }

    #[test]
    fn test_foreign_link_replaced_under_force() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("override");
        let action = resolve(
            &target,
            &TargetState::ValidSymlink(PathBuf::from("/somewhere/else")),
            &desired(),
            OverwritePolicy::Force,
        );
        assert_eq!(action, Action::CreateLink);
    }

    #[test]
    fn test_broken_link_always_replaced() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("override");
        let action = resolve(
            &target,
            &TargetState::BrokenSymlink(PathBuf::from("/gone")),
            &desired(),
            OverwritePolicy::Preserve,
        );
        assert_eq!(action, Action::CreateLink);
    }

    #[test]
    fn test_real_entry_backed_up_when_slot_free() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("override");
        fs::create_dir(&target).unwrap();
        let action = resolve(
            &target,
            &TargetState::RealDirectory,
            &desired(),
            OverwritePolicy::Preserve,
        );
        assert_eq!(
            action,
            Action::BackupThenLink {
                backup: dir.path().join("override.bak")
            }
        );
    }

    #[test]
    fn test_real_entry_blocked_when_slot_occupied() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("override");
        fs::create_dir(&target).unwrap();
        File::create(dir.path().join("override.bak")).unwrap();
        let action = resolve(
            &target,
            &TargetState::RealDirectory,
            &desired(),
            OverwritePolicy::Force,
        );
        assert_eq!(
            action,
            Action::Blocked(BlockReason::BackupOccupied {
                backup: dir.path().join("override.bak")
            })
        );
    }

    #[test]
    fn test_points_at_through_canonicalization() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("source");
        fs::create_dir(&source).unwrap();
        let via_dot = dir.path().join(".").join("source");

        let action = resolve(
            &dir.path().join("target"),
            &TargetState::ValidSymlink(via_dot),
            &source,
            OverwritePolicy::Preserve,
        );
        assert_eq!(action, Action::AlreadyCorrect);
    }

    #[test]
    fn test_block_reason_display() {
        let reason = BlockReason::BackupOccupied {
            backup: PathBuf::from("/runtime/override.bak"),
        };
        assert!(reason.to_string().contains("override.bak"));
        let reason = BlockReason::LinkedElsewhere {
            points_to: PathBuf::from("/other"),
        };
        assert!(reason.to_string().contains("already linked elsewhere"));
    }

    #[test]
    fn test_overwrite_policy_serde_names() {
        let preserve: OverwritePolicy = serde_yaml::from_str("preserve").unwrap();
        let force: OverwritePolicy = serde_yaml::from_str("force").unwrap();
        assert_eq!(preserve, OverwritePolicy::Preserve);
        assert_eq!(force, OverwritePolicy::Force);
    }
}
