//! twig: a small content-addressed version control system
//!
//! - `areas`: on-disk state (object store, index, refs, working tree, merge state, config)
//! - `artifacts`: object formats and the algorithms built on them
//! - `commands`: user-facing operations as `Repository` methods
//! - `errors`: the error taxonomy

pub mod areas;
pub mod artifacts;
pub mod commands;
pub mod errors;
