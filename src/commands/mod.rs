//! Command implementations
//!
//! Each command is an `impl Repository` block writing its report to the
//! repository's writer.
//!
//! - `plumbing`: direct object access (hash-object, cat-file, write-tree)
//! - `porcelain`: day-to-day workflow (add, commit, branch, merge, ...)

pub mod plumbing;
pub mod porcelain;
