use colored::Colorize;

const LABEL_WIDTH: usize = 8;

/// Working tree compared with the index
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum WorkspaceChangeType {
    #[default]
    None,
    Untracked,
    Modified,
    Deleted,
}

/// Index compared with the HEAD tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum IndexChangeType {
    #[default]
    None,
    Added,
    Modified,
    Deleted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum FileChangeType {
    Workspace(WorkspaceChangeType),
    Index(IndexChangeType),
}

impl From<&FileChangeType> for &str {
    fn from(change: &FileChangeType) -> Self {
        match change {
            FileChangeType::Workspace(workspace_change) => match workspace_change {
                WorkspaceChangeType::None | WorkspaceChangeType::Untracked => "",
                WorkspaceChangeType::Modified => "modified:   ",
                WorkspaceChangeType::Deleted => "deleted:    ",
            },
            FileChangeType::Index(index_change) => match index_change {
                IndexChangeType::None => "",
                IndexChangeType::Added => "new file:   ",
                IndexChangeType::Modified => "modified:   ",
                IndexChangeType::Deleted => "deleted:    ",
            },
        }
    }
}

impl std::fmt::Display for FileChangeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label: &str = self.into();
        let colored_str = match self {
            FileChangeType::Workspace(_) => label.red(),
            FileChangeType::Index(_) => label.green(),
        };
        write!(f, "{:>width$}{}", "", colored_str, width = LABEL_WIDTH)
    }
}
