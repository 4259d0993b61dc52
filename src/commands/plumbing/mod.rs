//! Plumbing commands
//!
//! - `hash-object`: compute a file's blob id and optionally store it
//! - `cat-file`: print an object's content or kind
//! - `write-tree`: store the index as a tree

pub mod cat_file;
pub mod hash_object;
pub mod write_tree;
