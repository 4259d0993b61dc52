use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::status::file_change::{IndexChangeType, WorkspaceChangeType};

/// Compare a staged hash with the hash of the file currently on disk
pub fn check_index_against_workspace(
    staged: Option<&ObjectId>,
    on_disk: Option<&ObjectId>,
) -> WorkspaceChangeType {
    match (staged, on_disk) {
        (None, Some(_)) => WorkspaceChangeType::Untracked,
        (Some(_), None) => WorkspaceChangeType::Deleted,
        (Some(staged), Some(on_disk)) if staged != on_disk => WorkspaceChangeType::Modified,
        _ => WorkspaceChangeType::None,
    }
}

/// Compare a staged hash with the hash recorded in the HEAD tree
pub fn check_index_against_head_tree(
    staged: Option<&ObjectId>,
    committed: Option<&ObjectId>,
) -> IndexChangeType {
    match (staged, committed) {
        (Some(staged), Some(committed)) if staged != committed => IndexChangeType::Modified,
        (Some(_), None) => IndexChangeType::Added,
        (None, Some(_)) => IndexChangeType::Deleted,
        _ => IndexChangeType::None,
    }
}
