//! Staging index data structures
//!
//! The index (staging area) maps repository-relative paths to the hashes of their
//! staged blobs. On disk it is a plain text file:
//!
//! ```text
//! README.md|ce013625030ba8dba906f756967f9e9ca394464a
//! src/main.rs|e69de29bb2d1d6434b8b29ae775ad8c2e48c5391
//! ```

pub mod snapshot;
