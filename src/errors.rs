//! Repository error taxonomy
//!
//! Operations return `anyhow::Result` and raise these variants through it, so callers
//! that need to branch on a failure can `downcast_ref::<RepoError>()` while the binary
//! simply prints the context chain.

use crate::artifacts::objects::object_id::ObjectId;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("not a twig repository (missing {})", .0.display())]
    NotARepository(PathBuf),

    #[error("object {0} not found")]
    ObjectNotFound(ObjectId),

    #[error("object {oid} is corrupt: {reason}")]
    ObjectCorrupt { oid: String, reason: String },

    #[error("unknown object kind '{0}'")]
    UnknownKind(String),

    #[error("object {oid} is a {actual}, expected a {expected}")]
    UnexpectedKind {
        oid: ObjectId,
        expected: String,
        actual: String,
    },

    #[error("invalid object id '{0}'")]
    InvalidObjectId(String),

    #[error("malformed index entry on line {line_number}: '{line}'")]
    IndexParse { line_number: usize, line: String },

    #[error("cannot commit: unresolved merge conflicts in {}", .paths.join(", "))]
    UnresolvedMergeConflicts { paths: Vec<String> },

    #[error("a merge is in progress; resolve conflicts and commit, or run 'merge --abort'")]
    MergeInProgress,

    #[error("working tree I/O failed at {}", .path.display())]
    WorkingTreeIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no common ancestor between {ours} and {theirs}")]
    AncestorNotFound { ours: ObjectId, theirs: ObjectId },

    #[error("branch '{0}' not found")]
    BranchNotFound(String),

    #[error("a branch named '{0}' already exists")]
    BranchExists(String),

    #[error("branch '{0}' has no commits yet")]
    UnbornBranch(String),

    #[error("detached HEAD state is not supported")]
    DetachedHead,

    #[error("{0}")]
    DirtyWorkingTree(String),

    #[error("author identity unknown; set user.name and user.email with 'twig config'")]
    MissingIdentity,
}

impl RepoError {
    pub fn corrupt(oid: impl ToString, reason: impl Into<String>) -> Self {
        RepoError::ObjectCorrupt {
            oid: oid.to_string(),
            reason: reason.into(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        RepoError::WorkingTreeIo {
            path: path.into(),
            source,
        }
    }
}
