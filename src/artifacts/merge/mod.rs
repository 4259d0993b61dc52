//! Merge machinery
//!
//! - `ancestor`: first-parent history and merge classification
//! - `three_way`: path-level merge of three snapshots
//! - `conflict`: conflict records and marker rendering
//! - `outcome`: what a merge did to the repository

pub mod ancestor;
pub mod conflict;
pub mod outcome;
pub mod three_way;
