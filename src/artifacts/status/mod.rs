//! Working tree status inspection
//!
//! Status compares three flat snapshots: the HEAD tree, the staging index and the
//! hashed contents of the working tree.
//!
//! - `file_change`: change categories and their labels
//! - `inspector`: per-path comparison rules
//! - `status_info`: the aggregated report

pub mod file_change;
pub mod inspector;
pub mod status_info;
