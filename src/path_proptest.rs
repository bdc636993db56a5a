//! Property tests for the path utilities.

use std::path::{Path, PathBuf};

use proptest::prelude::*;

use crate::path::{backup_path, normalize_lexically, overlaps};

/// Strategy for a plausible relative path component.
fn component() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_-]{0,8}"
}

/// Strategy for a relative path of 1..=4 components.
fn relative_path() -> impl Strategy<Value = PathBuf> {
    prop::collection::vec(component(), 1..=4).prop_map(|parts| parts.iter().collect())
}

proptest! {
    #[test]
    fn backup_path_keeps_parent(path in relative_path()) {
        let backup = backup_path(&path);
        prop_assert_eq!(backup.parent(), path.parent());
    }

    #[test]
    fn backup_path_appends_suffix(path in relative_path()) {
        let backup = backup_path(&path);
        let name = backup.file_name().unwrap().to_string_lossy().into_owned();
        prop_assert!(name.ends_with(".bak"));
        let original = path.file_name().unwrap().to_string_lossy().into_owned();
        prop_assert!(name.starts_with(original.as_str()));
    }

    #[test]
    fn normalize_is_idempotent(path in relative_path()) {
        let once = normalize_lexically(&path);
        let twice = normalize_lexically(&once);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn normalize_strips_cur_dir_components(path in relative_path()) {
        let with_dots = Path::new(".").join(&path).join(".");
        prop_assert_eq!(normalize_lexically(&with_dots), normalize_lexically(&path));
    }

    #[test]
    fn overlaps_is_symmetric(a in relative_path(), b in relative_path()) {
        prop_assert_eq!(overlaps(&a, &b), overlaps(&b, &a));
    }

    #[test]
    fn path_overlaps_itself(path in relative_path()) {
        prop_assert!(overlaps(&path, &path));
    }

    #[test]
    fn path_overlaps_its_children(path in relative_path(), child in component()) {
        let nested = path.join(child);
        prop_assert!(overlaps(&path, &nested));
    }
}
