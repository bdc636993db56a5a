//! Path manipulation utilities for legacy-link

use std::path::{Component, Path, PathBuf};

use glob::Pattern;

use crate::defaults::BACKUP_SUFFIX;
use crate::error::Result;

/// Compute the backup slot for a target path.
///
/// The suffix is appended to the final component rather than replacing its
/// extension, so `settings/override` maps to `settings/override.bak` and
/// `config.php` maps to `config.php.bak`.
pub fn backup_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(BACKUP_SUFFIX);
    path.with_file_name(name)
}

/// Lexically normalize a path without touching the filesystem.
///
/// Strips `.` components and resolves `..` against preceding components.
/// Used for the configuration-time overlap check, where the paths involved
/// may not exist yet.
pub fn normalize_lexically(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !normalized.pop() {
                    normalized.push("..");
                }
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

/// Whether `a` and `b` denote the same tree or one is nested inside the
/// other, comparing lexically normalized forms.
///
/// Tasks with overlapping target roots would reconcile over each other's
/// links; the configuration loader rejects them with this check.
pub fn overlaps(a: &Path, b: &Path) -> bool {
    let a = normalize_lexically(a);
    let b = normalize_lexically(b);
    a.starts_with(&b) || b.starts_with(&a)
}

/// Compile a list of glob pattern strings, surfacing the first bad pattern.
pub fn compile_patterns(patterns: &[String]) -> Result<Vec<Pattern>> {
    patterns
        .iter()
        .map(|p| Pattern::new(p).map_err(Into::into))
        .collect()
}

/// Match a relative path against a compiled pattern set.
///
/// An empty set matches everything (no filtering configured). Patterns are
/// matched against the slash-separated relative path and, as a convenience,
/// against the bare file name, so `config*` matches `config.php` at any
/// depth the way the original deployment scripts globbed it.
pub fn matches_any(patterns: &[Pattern], relative: &Path) -> bool {
    if patterns.is_empty() {
        return true;
    }
    let as_string = relative.to_string_lossy().replace('\\', "/");
    patterns.iter().any(|pattern| {
        pattern.matches(&as_string)
            || relative
                .file_name()
                .is_some_and(|name| pattern.matches(&name.to_string_lossy()))
    })
}
