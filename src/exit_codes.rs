//! Process exit codes used by the CLI.
//!
//! - `SUCCESS` (0): the operation completed and the target tree is clean.
//! - `ERROR` (1): a fatal error aborted the session (bad configuration,
//!   missing source root, task failure).
//! - `USAGE` (2): invalid command-line usage, emitted by clap.
//! - `CONFLICTS` (3): the session completed but one or more entries were
//!   blocked or failed; the target tree needs attention.

/// The operation completed without conflicts.
pub const SUCCESS: i32 = 0;

/// A fatal error aborted the session.
pub const ERROR: i32 = 1;

/// Invalid command-line usage (reserved for clap).
pub const USAGE: i32 = 2;

/// The session completed with recorded conflicts.
pub const CONFLICTS: i32 = 3;
