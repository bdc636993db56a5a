//! # Configuration Schema and Parsing
//!
//! This module defines the data structures that represent the
//! `.legacy-link.yaml` configuration file, as well as the logic for
//! parsing and validating it.
//!
//! ## Key Components
//!
//! - **`Config`**: The whole file: the environment (or how to resolve
//!   it), global options, the ordered task list, and the folders that
//!   must exist before anything is deployed.
//!
//! - **`TaskConfig`**: One reconciliation task: where the layered source
//!   lives, where the links go, at what granularity, and under which
//!   overwrite policy.
//!
//! ## Validation
//!
//! `parse` and `from_file` validate as they load: the task list must be
//! non-empty, task names unique, glob patterns well-formed and only used
//! at file granularity, and no two tasks may declare target roots that
//! are equal or nested inside each other. Overlapping targets would let
//! one task reconcile over another's links, so they are rejected here,
//! before a session is ever built.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::conflict::OverwritePolicy;
use crate::error::{Error, Result};
use crate::path;
use crate::reconcile::Granularity;

/// How to find the active environment in a project YAML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvironmentLookup {
    /// YAML file, relative to the project root.
    pub file: PathBuf,
    /// Dotted key into the document, e.g. `parameters.environment`.
    pub key: String,
}

/// A folder that must exist before any task runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequiredFolder {
    /// Path relative to the project root.
    pub path: PathBuf,
    /// Shown when the folder is missing.
    #[serde(default)]
    pub hint: Option<String>,
}

/// One reconciliation task as declared in the configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskConfig {
    /// Unique task name, used for filtering and reporting.
    pub name: String,
    /// Root of the layered source tree (holds `common/` and per-environment
    /// directories), relative to the project root.
    pub source: PathBuf,
    /// Root the links are created under, relative to the project root.
    pub target: PathBuf,
    /// File-level or top-level-directory-level linking.
    #[serde(default)]
    pub granularity: Granularity,
    /// What to do with links pointing somewhere foreign.
    #[serde(default)]
    pub overwrite: OverwritePolicy,
    /// Glob filters for file-granularity tasks (e.g. `config*`).
    #[serde(default)]
    pub patterns: Vec<String>,
}

/// The `.legacy-link.yaml` configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// The active environment. The `--env` flag takes precedence.
    #[serde(default)]
    pub environment: Option<String>,
    /// Resolve the environment from a project file when neither the flag
    /// nor `environment` is set.
    #[serde(default)]
    pub environment_from: Option<EnvironmentLookup>,
    /// Treat per-entry I/O failures as fatal.
    #[serde(default)]
    pub strict: bool,
    /// The ordered task list.
    #[serde(default)]
    pub tasks: Vec<TaskConfig>,
    /// Folders that must exist before deploying.
    #[serde(default)]
    pub required_folders: Vec<RequiredFolder>,
}

/// Parse and validate a configuration from a YAML string.
pub fn parse(input: &str) -> Result<Config> {
    let config: Config = serde_yaml::from_str(input).map_err(|e| Error::ConfigParse {
        message: e.to_string(),
        hint: Some("run 'legacy-link init' to generate a starter configuration".to_string()),
    })?;
    config.validate()?;
    Ok(config)
}

/// Load and validate a configuration file.
pub fn from_file(config_path: &Path) -> Result<Config> {
    let content = fs::read_to_string(config_path)?;
    parse(&content)
}

impl Config {
    /// Validate the loaded configuration.
    pub fn validate(&self) -> Result<()> {
        if self.tasks.is_empty() {
            return Err(Error::ConfigParse {
                message: "no tasks defined".to_string(),
                hint: Some("add a 'tasks:' list with at least one task".to_string()),
            });
        }

        for (index, task) in self.tasks.iter().enumerate() {
            if task.name.is_empty() {
                return Err(Error::ConfigParse {
                    message: format!("task #{} has an empty name", index + 1),
                    hint: None,
                });
            }
            if self.tasks[..index].iter().any(|t| t.name == task.name) {
                return Err(Error::ConfigParse {
                    message: format!("duplicate task name '{}'", task.name),
                    hint: Some("task names must be unique".to_string()),
                });
            }
            if !task.patterns.is_empty() && task.granularity == Granularity::Directory {
                return Err(Error::ConfigParse {
                    message: format!(
                        "task '{}': patterns are only supported at file granularity",
                        task.name
                    ),
                    hint: Some("remove 'patterns' or set 'granularity: file'".to_string()),
                });
            }
            // Surface bad globs at load time, not mid-run
            path::compile_patterns(&task.patterns)?;
        }

        for (index, task) in self.tasks.iter().enumerate() {
            for other in &self.tasks[..index] {
                if path::overlaps(&task.target, &other.target) {
                    return Err(Error::ConfigParse {
                        message: format!(
                            "tasks '{}' and '{}' declare overlapping target roots ('{}' vs '{}')",
                            other.name,
                            task.name,
                            other.target.display(),
                            task.target.display()
                        ),
                        hint: Some(
                            "each task must own a disjoint target subtree".to_string(),
                        ),
                    });
                }
            }
        }

        Ok(())
    }

    /// Resolve the active environment.
    ///
    /// Precedence: the `--env` flag, then the `environment` key, then the
    /// `environment_from` lookup.
    pub fn resolve_environment(
        &self,
        flag: Option<&str>,
        project_root: &Path,
    ) -> Result<String> {
        if let Some(env) = flag {
            return Ok(env.to_string());
        }
        if let Some(env) = &self.environment {
            return Ok(env.clone());
        }
        if let Some(lookup) = &self.environment_from {
            let file = project_root.join(&lookup.file);
            let content = fs::read_to_string(&file)?;
            let document: serde_yaml::Value = serde_yaml::from_str(&content)?;
            let value = lookup_key(&document, &lookup.key, &file)?;
            return match value {
                serde_yaml::Value::String(env) => Ok(env.clone()),
                other => Err(Error::ConfigParse {
                    message: format!(
                        "key '{}' in '{}' is not a string (found {:?})",
                        lookup.key,
                        file.display(),
                        other
                    ),
                    hint: None,
                }),
            };
        }
        Err(Error::ConfigParse {
            message: "no environment configured".to_string(),
            hint: Some(
                "pass --env, set 'environment:' or 'environment_from:' in the configuration"
                    .to_string(),
            ),
        })
    }
}

/// Walk a dotted key (`some.nested.key`) through a YAML document.
///
/// On failure, reports the longest prefix that was found so the user can
/// see where the traversal stopped.
pub fn lookup_key<'a>(
    document: &'a serde_yaml::Value,
    key: &str,
    file: &Path,
) -> Result<&'a serde_yaml::Value> {
    let mut current = document;
    let mut found: Vec<&str> = Vec::new();
    for part in key.split('.') {
        match current.get(part) {
            Some(value) => {
                current = value;
                found.push(part);
            }
            None => {
                return Err(Error::KeyLookup {
                    key: key.to_string(),
                    file: file.display().to_string(),
                    prefix_found: if found.is_empty() {
                        "none".to_string()
                    } else {
                        found.join(".")
                    },
                })
            }
        }
    }
    Ok(current)
}
