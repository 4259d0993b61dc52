//! Core repository components
//!
//! - `database`: object store for blobs, trees and commits
//! - `index`: staging area
//! - `refs`: branches and HEAD
//! - `workspace`: working directory access and reconciliation
//! - `merge_state`: bookkeeping for a merge stopped on conflicts
//! - `config`: `key=value` settings and commit identity
//! - `repository`: the context tying the areas together

pub mod config;
pub mod database;
pub mod index;
pub mod merge_state;
pub mod refs;
pub mod repository;
pub mod workspace;
