//! # Error Handling
//!
//! This module defines the centralized error handling mechanism for the
//! `legacy-link` application. It uses the `thiserror` library to create a
//! comprehensive `Error` enum that covers all anticipated failure modes,
//! providing clear and descriptive error messages.
//!
//! ## Key Components
//!
//! - **`Error`**: The main enum that represents all possible errors that can
//!   occur within the application. Each variant corresponds to a specific
//!   type of error and includes contextual information to aid in debugging.
//!
//! - **`Result<T>`**: A type alias for `std::result::Result<T, Error>`, used
//!   throughout the application to simplify function signatures and ensure
//!   type safety.
//!
//! Two severities flow through the reconciliation engine:
//!
//! - **Fatal** errors abort the owning task (and with it the session):
//!   a source root with no layer directory at all, a configuration that
//!   cannot be parsed or validated, a task wrapper (`TaskFailed`).
//! - **Per-entry** errors are caught at the tree-reconciler boundary and
//!   folded into the run summary instead of being raised: conflicts,
//!   lost races, link/rename syscall failures. `Error::is_conflict`
//!   distinguishes the conflict class from plain I/O failures so the
//!   summary can count them separately.

use thiserror::Error;

/// Main error type for legacy-link operations
#[derive(Error, Debug)]
pub enum Error {
    /// An error occurred while parsing or validating the `.legacy-link.yaml`
    /// configuration file.
    ///
    /// This error includes the specific issue and optionally a hint about
    /// how to fix it.
    #[error("Configuration error: {message}{}", hint.as_ref().map(|h| format!("\n  hint: {}", h)).unwrap_or_default())]
    ConfigParse {
        message: String,
        /// Optional hint for how to fix the configuration issue
        hint: Option<String>,
    },

    /// A dotted-key lookup into a project YAML file failed.
    ///
    /// Reports the longest key prefix that was found so the user can see
    /// where the traversal stopped.
    #[error("Key '{key}' not found in '{file}' (prefix found: {prefix_found})")]
    KeyLookup {
        key: String,
        file: String,
        prefix_found: String,
    },

    /// A task's source root has no layer directory at all.
    ///
    /// Nothing to deploy is a configuration error, not a soft conflict:
    /// this aborts the task and the session.
    #[error("Task '{task}': source root '{source_root}' has no layer directory (expected 'common' or the environment layer)")]
    MissingSourceRoot { task: String, source_root: String },

    /// The target root for an adopt operation does not exist.
    #[error("Task '{task}': target root '{target_root}' is not a directory")]
    MissingTargetRoot { task: String, target_root: String },

    /// A task failed fatally; wraps the underlying cause with the task name.
    #[error("Task '{task}' failed: {source}")]
    TaskFailed {
        task: String,
        #[source]
        source: Box<Error>,
    },

    /// A conflicting entry prevented a mutation.
    ///
    /// Raised by the linker when the rename-aside step cannot proceed;
    /// recorded per-entry rather than propagated.
    #[error("Conflict at '{path}': {message}")]
    Conflict { path: String, message: String },

    /// The target changed between classification and mutation.
    ///
    /// Handled by one bounded retry, then demoted to a recorded conflict.
    #[error("Target '{path}' changed during reconciliation")]
    RaceLost { path: String },

    /// A backup rename succeeded but the follow-up link failed, and the
    /// rename could not be rolled back. The original content now lives at
    /// the backup path and must be restored by hand.
    #[error("'{path}' was renamed to '{backup}' but the link could not be created: {message}\n  the original content is preserved at '{backup}'")]
    BackupStranded {
        path: String,
        backup: String,
        message: String,
    },

    /// A link or rename syscall failed for a reason other than a conflict
    /// (permission denied, cross-device rename, disk full).
    #[error("Link operation failed at '{path}': {message}")]
    Link { path: String, message: String },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A YAML parsing error, wrapped from `serde_yaml::Error`.
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A glob pattern error, wrapped from `glob::PatternError`.
    #[error("Glob pattern error: {0}")]
    Glob(#[from] glob::PatternError),
}

impl Error {
    /// Whether this error belongs to the conflict class (recorded as a
    /// blocked entry) rather than the I/O failure class.
    pub fn is_conflict(&self) -> bool {
        matches!(self, Error::Conflict { .. } | Error::RaceLost { .. })
    }
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_config_parse() {
        let error = Error::ConfigParse {
            message: "Invalid YAML".to_string(),
            hint: None,
        };
        let display = format!("{}", error);
        assert!(display.contains("Configuration error"));
        assert!(display.contains("Invalid YAML"));
    }

    #[test]
    fn test_error_display_config_parse_with_hint() {
        let error = Error::ConfigParse {
            message: "Missing tasks list".to_string(),
            hint: Some("Add a 'tasks:' section to the file".to_string()),
        };
        let display = format!("{}", error);
        assert!(display.contains("Missing tasks list"));
        assert!(display.contains("hint:"));
        assert!(display.contains("Add a 'tasks:'"));
    }

    #[test]
    fn test_error_display_key_lookup() {
        let error = Error::KeyLookup {
            key: "parameters.environment".to_string(),
            file: "app/config.yml".to_string(),
            prefix_found: "parameters".to_string(),
        };
        let display = format!("{}", error);
        assert!(display.contains("parameters.environment"));
        assert!(display.contains("app/config.yml"));
        assert!(display.contains("prefix found: parameters"));
    }

    #[test]
    fn test_error_display_missing_source_root() {
        let error = Error::MissingSourceRoot {
            task: "settings".to_string(),
            source_root: "/project/deploy/settings".to_string(),
        };
        let display = format!("{}", error);
        assert!(display.contains("Task 'settings'"));
        assert!(display.contains("/project/deploy/settings"));
        assert!(display.contains("no layer directory"));
    }

    #[test]
    fn test_error_display_task_failed_includes_cause() {
        let cause = Error::MissingSourceRoot {
            task: "settings".to_string(),
            source_root: "deploy/settings".to_string(),
        };
        let error = Error::TaskFailed {
            task: "settings".to_string(),
            source: Box::new(cause),
        };
        let display = format!("{}", error);
        assert!(display.contains("Task 'settings' failed"));
        assert!(display.contains("no layer directory"));
    }

    #[test]
    fn test_error_display_backup_stranded_names_both_paths() {
        let error = Error::BackupStranded {
            path: "/runtime/settings/override".to_string(),
            backup: "/runtime/settings/override.bak".to_string(),
            message: "permission denied".to_string(),
        };
        let display = format!("{}", error);
        assert!(display.contains("/runtime/settings/override"));
        assert!(display.contains("override.bak"));
        assert!(display.contains("preserved at"));
    }

    #[test]
    fn test_error_from_io_error() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let error: Error = io_error.into();
        let display = format!("{}", error);
        assert!(display.contains("I/O error"));
        assert!(display.contains("File not found"));
    }

    #[test]
    fn test_error_from_yaml_error() {
        let yaml_str = "invalid: [unclosed";
        let yaml_error = serde_yaml::from_str::<serde_yaml::Value>(yaml_str).unwrap_err();
        let error: Error = yaml_error.into();
        let display = format!("{}", error);
        assert!(display.contains("YAML parsing error"));
    }

    #[test]
    fn test_is_conflict_classification() {
        let conflict = Error::Conflict {
            path: "a".to_string(),
            message: "b".to_string(),
        };
        let race = Error::RaceLost {
            path: "a".to_string(),
        };
        let io = Error::Io(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "denied",
        ));
        assert!(conflict.is_conflict());
        assert!(race.is_conflict());
        assert!(!io.is_conflict());
    }
}
