use crate::artifacts::index::snapshot::IndexSnapshot;
use crate::artifacts::status::file_change::{IndexChangeType, WorkspaceChangeType};
use crate::artifacts::status::inspector;
use std::collections::{BTreeMap, BTreeSet};

pub type IndexChangeSet = BTreeMap<String, IndexChangeType>;
pub type WorkspaceChangeSet = BTreeMap<String, WorkspaceChangeType>;
pub type FileSet = BTreeSet<String>;

/// Staged, unstaged and untracked changes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusInfo {
    pub index_changeset: IndexChangeSet,
    pub workspace_changeset: WorkspaceChangeSet,
    pub untracked_files: FileSet,
}

impl StatusInfo {
    /// `workspace` maps every file on disk to the hash its content would have as a blob
    pub fn compute(head: &IndexSnapshot, index: &IndexSnapshot, workspace: &IndexSnapshot) -> Self {
        let mut status = StatusInfo::default();

        for path in head.paths().chain(index.paths()) {
            let change = inspector::check_index_against_head_tree(index.get(path), head.get(path));
            if change != IndexChangeType::None {
                status.index_changeset.insert(path.clone(), change);
            }
        }

        for path in index.paths().chain(workspace.paths()) {
            match inspector::check_index_against_workspace(index.get(path), workspace.get(path)) {
                WorkspaceChangeType::None => {}
                WorkspaceChangeType::Untracked => {
                    status.untracked_files.insert(path.clone());
                }
                change => {
                    status.workspace_changeset.insert(path.clone(), change);
                }
            }
        }

        status
    }

    pub fn has_staged_changes(&self) -> bool {
        !self.index_changeset.is_empty()
    }

    pub fn has_unstaged_changes(&self) -> bool {
        !self.workspace_changeset.is_empty()
    }

    /// Nothing staged and nothing modified; untracked files do not count
    pub fn is_clean(&self) -> bool {
        !self.has_staged_changes() && !self.has_unstaged_changes()
    }
}
