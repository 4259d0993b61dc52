use crate::artifacts::objects::object_id::ObjectId;

/// Result of merging a target commit into the current branch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeOutcome {
    /// The branch ref moved to `target`; no commit was created
    FastForward { target: ObjectId },
    /// The target is already part of the current history
    UpToDate,
    /// A merge commit with both tips as parents was written
    Merged { commit: ObjectId },
    /// Conflict markers were written and merge state recorded
    Conflicted { paths: Vec<String> },
}
