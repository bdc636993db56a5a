//! # Legacy Link Library
//!
//! This library provides the core functionality for deploying a legacy
//! CMS's configuration, extensions and assets into a runtime tree by
//! reconciling layered source directories against a target directory via
//! symbolic links. It is designed to be used by the `legacy-link`
//! command-line tool but can also be integrated into other applications
//! that drive deployments programmatically.
//!
//! ## Quick Example
//!
//! ```no_run
//! use legacy_link::conflict::OverwritePolicy;
//! use legacy_link::reconcile::{reconcile, Granularity, ReconcileOptions, ReconciliationTask};
//! use std::path::PathBuf;
//!
//! let task = ReconciliationTask::new(
//!     "settings",
//!     PathBuf::from("/project/deploy/settings"),
//!     PathBuf::from("/project/runtime/settings"),
//!     "dev",
//!     OverwritePolicy::Preserve,
//!     Granularity::File,
//!     &[],
//! )?;
//!
//! let summary = reconcile(&task, &ReconcileOptions::default())?;
//! println!("created {} links", summary.created);
//! # Ok::<(), legacy_link::error::Error>(())
//! ```
//!
//! ## Core Concepts
//!
//! - **Classification (`classify`)**: read-only inspection of a target
//!   path into missing / real file / real directory / valid symlink /
//!   broken symlink, with junction-aware link detection.
//! - **Conflict resolution (`conflict`)**: the decision table that turns
//!   a target state, a desired link destination and an overwrite policy
//!   into exactly one action. Real entries are never deleted; at worst
//!   they are renamed aside to a `.bak` sibling.
//! - **Link execution (`linker`)**: the single filesystem mutation per
//!   entry, with rollback when a rename-aside cannot be completed.
//! - **Tree reconciliation (`reconcile`)**: walks the `common` and
//!   environment overlay layers of one task and converges the target
//!   tree, folding per-entry conflicts into a run summary.
//! - **Sessions (`session`)**: runs the ordered task list from a
//!   `.legacy-link.yaml` configuration and aggregates the results.
//! - **Adoption (`adopt`)**: moves real entries found in the target tree
//!   back into a source layer and links them in place.
//!
//! Every run is idempotent: re-running the reconciler on an unchanged
//! source reports every entry as already linked and mutates nothing,
//! which is also how interrupted runs recover.

pub mod adopt;
pub mod classify;
pub mod config;
pub mod conflict;
pub mod defaults;
pub mod error;
pub mod exit_codes;
pub mod linker;
pub mod output;
pub mod path;
pub mod reconcile;
pub mod session;
pub mod suggestions;

#[cfg(test)]
mod path_proptest;
