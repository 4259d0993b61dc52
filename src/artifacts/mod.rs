//! Data structures and algorithms
//!
//! - `branch`: branch name validation
//! - `index`: the staged path → blob snapshot and its text format
//! - `merge`: ancestor resolution and the three-way merge table
//! - `objects`: blob, tree and commit objects
//! - `status`: working tree status inspection
//! - `tree`: building nested trees from a flat snapshot

pub mod branch;
pub mod index;
pub mod merge;
pub mod objects;
pub mod status;
pub mod tree;
