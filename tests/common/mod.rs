//! Shared test utilities for integration and E2E tests.
//!
//! This module provides common fixtures and helper functions to reduce
//! duplication across test files.
//!
//! ## Usage
//!
//! Add `mod common;` to your test file, then use the helpers:
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! #[test]
//! fn test_example() {
//!     let fixture = TestFixture::new().with_minimal_config();
//!     fixture.command().arg("ls").assert().success();
//! }
//! ```

use assert_fs::prelude::*;
use std::path::Path;

/// Re-export commonly used test dependencies for convenience.
pub mod prelude {
    pub use assert_cmd::cargo::cargo_bin_cmd;
    pub use assert_fs::prelude::*;
    #[allow(unused_imports)]
    pub use assert_fs::TempDir;
    pub use predicates::prelude::*;

    #[allow(unused_imports)]
    pub use super::configs;
    pub use super::TestFixture;
}

/// Common configuration YAML snippets for testing.
#[allow(dead_code)]
pub mod configs {
    /// Minimal valid configuration: one file-granularity task.
    pub const MINIMAL: &str = r#"
environment: dev
tasks:
  - name: settings
    source: deploy/settings
    target: runtime/settings
"#;

    /// A file task and a directory task with disjoint targets.
    pub const TWO_TASKS: &str = r#"
environment: dev
tasks:
  - name: settings
    source: deploy/settings
    target: runtime/settings
  - name: siteaccesses
    source: deploy/siteaccess
    target: runtime/siteaccess
    granularity: directory
"#;

    /// Configuration with a required folder.
    pub const WITH_REQUIRED_FOLDER: &str = r#"
environment: dev
tasks:
  - name: settings
    source: deploy/settings
    target: runtime/settings
required_folders:
  - path: runtime
    hint: "move the legacy runtime tree here first"
"#;

    /// Invalid YAML for error testing.
    pub const INVALID_YAML: &str = "tasks: [unclosed";

    /// Valid YAML that fails validation (overlapping targets).
    pub const OVERLAPPING_TARGETS: &str = r#"
environment: dev
tasks:
  - name: settings
    source: deploy/settings
    target: runtime/settings
  - name: siteaccesses
    source: deploy/siteaccess
    target: runtime/settings/siteaccess
    granularity: directory
"#;
}

/// A test fixture that provides a temporary project directory with an
/// optional `.legacy-link.yaml` and source/target trees.
pub struct TestFixture {
    temp_dir: assert_fs::TempDir,
}

#[allow(dead_code)]
impl TestFixture {
    /// Create a new test fixture with an empty temporary directory.
    pub fn new() -> Self {
        Self {
            temp_dir: assert_fs::TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Add a `.legacy-link.yaml` configuration file with the given content.
    pub fn with_config(self, content: &str) -> Self {
        self.temp_dir
            .child(".legacy-link.yaml")
            .write_str(content)
            .expect("Failed to write config file");
        self
    }

    /// Add the minimal valid configuration.
    pub fn with_minimal_config(self) -> Self {
        self.with_config(configs::MINIMAL)
    }

    /// Add a file with the given path and content (parents created).
    pub fn with_file(self, path: &str, content: &str) -> Self {
        self.temp_dir
            .child(path)
            .write_str(content)
            .expect("Failed to write file");
        self
    }

    /// Add an empty directory at the given path.
    pub fn with_dir(self, path: &str) -> Self {
        self.temp_dir
            .child(path)
            .create_dir_all()
            .expect("Failed to create directory");
        self
    }

    /// Get the path to the temporary directory.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Get the path to the config file.
    pub fn config_path(&self) -> std::path::PathBuf {
        self.temp_dir.path().join(".legacy-link.yaml")
    }

    /// Create a child path in the temp directory.
    pub fn child(&self, path: &str) -> assert_fs::fixture::ChildPath {
        self.temp_dir.child(path)
    }

    /// Create a command configured to run in this fixture's directory.
    pub fn command(&self) -> assert_cmd::Command {
        let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("legacy-link");
        cmd.current_dir(self.path());
        cmd
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_creates_temp_dir() {
        let fixture = TestFixture::new();
        assert!(fixture.path().exists());
    }

    #[test]
    fn test_fixture_with_config() {
        let fixture = TestFixture::new().with_minimal_config();
        assert!(fixture.config_path().exists());
    }

    #[test]
    fn test_fixture_with_file_creates_parents() {
        let fixture = TestFixture::new().with_file("deploy/settings/common/a.ini", "x");
        assert!(fixture
            .path()
            .join("deploy/settings/common/a.ini")
            .exists());
    }

    #[test]
    fn test_configs_are_valid_yaml() {
        let configs = [
            configs::MINIMAL,
            configs::TWO_TASKS,
            configs::WITH_REQUIRED_FOLDER,
            configs::OVERLAPPING_TARGETS,
        ];
        for config in configs {
            serde_yaml::from_str::<serde_yaml::Value>(config).expect("Config should be valid YAML");
        }
    }

    #[test]
    fn test_invalid_yaml_is_actually_invalid() {
        let result = serde_yaml::from_str::<serde_yaml::Value>(configs::INVALID_YAML);
        assert!(result.is_err(), "INVALID_YAML should not parse");
    }
}
