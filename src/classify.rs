//! # Target Path Classification
//!
//! Read-only inspection of a target path, producing the `TargetState` that
//! drives conflict resolution. Classification is always recomputed
//! immediately before a mutation; nothing here is cached.
//!
//! ## Link detection
//!
//! A path counts as a link when the native symlink predicate says so, OR
//! when it exists and its direct (non-dereferencing) stat diverges from its
//! dereferencing stat. Junction-style reparse points on some platforms pass
//! the second test while failing the first; without the fallback they would
//! be classified as real directories and renamed aside on every run. Both
//! checks are kept deliberately.

use std::fs::{self, Metadata};
use std::io;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// The observed state of a target path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetState {
    /// Nothing exists at the path.
    Missing,
    /// A real (non-link) file occupies the path.
    RealFile,
    /// A real (non-link) directory occupies the path.
    RealDirectory,
    /// A link whose destination exists. Carries the raw link destination.
    ValidSymlink(PathBuf),
    /// A link whose destination is gone. Never meaningful data.
    BrokenSymlink(PathBuf),
}

impl TargetState {
    /// Whether the path is occupied by a link of any kind.
    pub fn is_link(&self) -> bool {
        matches!(
            self,
            TargetState::ValidSymlink(_) | TargetState::BrokenSymlink(_)
        )
    }

    /// Whether the path is occupied by a real (non-link) entry.
    pub fn is_real_entry(&self) -> bool {
        matches!(self, TargetState::RealFile | TargetState::RealDirectory)
    }

    /// Short human-readable label used in per-entry reporting.
    pub fn describe(&self) -> &'static str {
        match self {
            TargetState::Missing => "missing",
            TargetState::RealFile => "real file",
            TargetState::RealDirectory => "real directory",
            TargetState::ValidSymlink(_) => "symlink",
            TargetState::BrokenSymlink(_) => "broken symlink",
        }
    }
}

/// Classify a target path.
///
/// Read-only. Fails only when a stat call fails for a reason other than
/// the path not existing (permission denied is propagated, not swallowed).
pub fn classify(path: &Path) -> Result<TargetState> {
    let direct = match fs::symlink_metadata(path) {
        Ok(meta) => meta,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(TargetState::Missing),
        Err(e) => return Err(Error::Io(e)),
    };

    let followed = match fs::metadata(path) {
        Ok(meta) => Some(meta),
        // A dereferencing stat on a dangling link reports NotFound
        Err(e) if e.kind() == io::ErrorKind::NotFound => None,
        Err(e) => return Err(Error::Io(e)),
    };

    let native_link = direct.file_type().is_symlink();
    let divergent = followed
        .as_ref()
        .is_some_and(|meta| stats_diverge(&direct, meta));

    if native_link || divergent {
        let destination = read_link_destination(path)?;
        return Ok(match followed {
            Some(_) => TargetState::ValidSymlink(destination),
            None => TargetState::BrokenSymlink(destination),
        });
    }

    if direct.is_dir() {
        Ok(TargetState::RealDirectory)
    } else {
        Ok(TargetState::RealFile)
    }
}

/// Whether a path is occupied by a link of any kind, using the same dual
/// test as `classify`.
pub fn is_link_like(path: &Path) -> Result<bool> {
    Ok(classify(path)?.is_link())
}

/// Resolve the destination a link points at.
///
/// Junction-style entries may refuse `read_link` while still resolving
/// through a dereferencing canonicalize; fall back to that before giving up.
fn read_link_destination(path: &Path) -> Result<PathBuf> {
    match fs::read_link(path) {
        Ok(destination) => Ok(destination),
        Err(_) => fs::canonicalize(path).map_err(Error::Io),
    }
}

/// Whether the direct stat and the dereferencing stat describe different
/// filesystem objects.
#[cfg(unix)]
fn stats_diverge(direct: &Metadata, followed: &Metadata) -> bool {
    use std::os::unix::fs::MetadataExt;
    direct.ino() != followed.ino() || direct.dev() != followed.dev()
}

/// Whether the direct stat and the dereferencing stat describe different
/// filesystem objects.
///
/// Without inode identity, compare the observable shape of the entry; a
/// real entry stats identically both ways.
#[cfg(not(unix))]
fn stats_diverge(direct: &Metadata, followed: &Metadata) -> bool {
    if direct.is_dir() != followed.is_dir() {
        return true;
    }
    if direct.len() != followed.len() {
        return true;
    }
    match (direct.modified(), followed.modified()) {
        (Ok(a), Ok(b)) => a != b,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::TempDir;

    #[cfg(unix)]
    fn symlink(source: &Path, target: &Path) {
        std::os::unix::fs::symlink(source, target).unwrap();
    }

    #[test]
    fn test_classify_missing() {
        let dir = TempDir::new().unwrap();
        let state = classify(&dir.path().join("absent")).unwrap();
        assert_eq!(state, TargetState::Missing);
    }

    #[test]
    fn test_classify_real_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("file.txt");
        File::create(&path)
            .unwrap()
            .write_all(b"content")
            .unwrap();
        assert_eq!(classify(&path).unwrap(), TargetState::RealFile);
    }

    #[test]
    fn test_classify_real_directory() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("subdir");
        fs::create_dir(&path).unwrap();
        assert_eq!(classify(&path).unwrap(), TargetState::RealDirectory);
    }

    #[test]
    #[cfg(unix)]
    fn test_classify_valid_symlink_carries_destination() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("source");
        fs::create_dir(&source).unwrap();
        let link = dir.path().join("link");
        symlink(&source, &link);

        match classify(&link).unwrap() {
            TargetState::ValidSymlink(destination) => assert_eq!(destination, source),
            other => panic!("expected valid symlink, got {:?}", other),
        }
    }

    #[test]
    #[cfg(unix)]
    fn test_classify_broken_symlink() {
        let dir = TempDir::new().unwrap();
        let gone = dir.path().join("gone");
        let link = dir.path().join("link");
        symlink(&gone, &link);

        match classify(&link).unwrap() {
            TargetState::BrokenSymlink(destination) => assert_eq!(destination, gone),
            other => panic!("expected broken symlink, got {:?}", other),
        }
    }

    #[test]
    #[cfg(unix)]
    fn test_classify_symlink_to_file() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("source.txt");
        File::create(&source).unwrap();
        let link = dir.path().join("link.txt");
        symlink(&source, &link);

        assert!(classify(&link).unwrap().is_link());
        assert!(is_link_like(&link).unwrap());
    }

    #[test]
    fn test_real_entries_are_not_link_like() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("plain");
        fs::create_dir(&path).unwrap();
        assert!(!is_link_like(&path).unwrap());
    }

    #[test]
    fn test_describe_labels() {
        assert_eq!(TargetState::Missing.describe(), "missing");
        assert_eq!(TargetState::RealDirectory.describe(), "real directory");
        assert_eq!(
            TargetState::BrokenSymlink(PathBuf::from("x")).describe(),
            "broken symlink"
        );
    }
}
