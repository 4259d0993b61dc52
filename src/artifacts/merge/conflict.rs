use crate::artifacts::objects::object_id::ObjectId;
use bytes::Bytes;
use std::fmt;

/// Which sides disagree on a conflicted path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictKind {
    /// Added on both sides with different content
    BothAdded,
    /// Changed in ours, deleted in theirs
    ModifiedDeleted,
    /// Deleted in ours, changed in theirs
    DeletedModified,
    /// Changed differently on both sides
    BothModified,
}

impl fmt::Display for ConflictKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ConflictKind::BothAdded => "both added",
            ConflictKind::ModifiedDeleted => "deleted by them",
            ConflictKind::DeletedModified => "deleted by us",
            ConflictKind::BothModified => "both modified",
        };
        write!(f, "{label}")
    }
}

/// A path the merge could not resolve on its own
///
/// Content of a side that deleted the path is empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conflict {
    pub kind: ConflictKind,
    pub base: Option<ObjectId>,
    pub ours: Option<ObjectId>,
    pub theirs: Option<ObjectId>,
    pub ours_content: Bytes,
    pub theirs_content: Bytes,
    pub branch: String,
}

impl Conflict {
    /// File content that replaces the conflicted path in the working tree
    pub fn markers(&self) -> Bytes {
        let mut content = Vec::with_capacity(
            self.ours_content.len() + self.theirs_content.len() + self.branch.len() + 32,
        );
        content.extend_from_slice(b"<<<<<<< HEAD\n");
        content.extend_from_slice(&self.ours_content);
        content.extend_from_slice(b"=======\n");
        content.extend_from_slice(&self.theirs_content);
        content.extend_from_slice(format!(">>>>>>> {}\n", self.branch).as_bytes());

        content.into()
    }
}
