use crate::areas::config::Config;
use crate::areas::database::Database;
use crate::areas::index::Index;
use crate::areas::merge_state::MergeState;
use crate::areas::refs::Refs;
use crate::areas::workspace::{REPOSITORY_DIR, Workspace};
use crate::artifacts::index::snapshot::IndexSnapshot;
use crate::artifacts::merge::ancestor::{AncestorFinder, MergeKind};
use crate::artifacts::merge::outcome::MergeOutcome;
use crate::artifacts::merge::three_way::ThreeWayMerge;
use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::status::status_info::StatusInfo;
use crate::artifacts::tree::builder::TreeBuilder;
use crate::errors::RepoError;
use bytes::Bytes;
use std::cell::{RefCell, RefMut};
use std::path::Path;
use tracing::{debug, info};

/// Everything an operation needs to act on one repository
///
/// The working tree root is fixed at construction; all areas are rooted under it.
pub struct Repository {
    path: Box<Path>,
    writer: RefCell<Box<dyn std::io::Write>>,
    index: RefCell<Index>,
    database: Database,
    workspace: Workspace,
    refs: Refs,
    merge_state: MergeState,
    config: Config,
}

impl Repository {
    pub fn new(path: &str, writer: Box<dyn std::io::Write>) -> anyhow::Result<Self> {
        let path = Path::new(path);
        if !path.exists() {
            std::fs::create_dir_all(path)?;
        }
        let path = path.canonicalize()?;
        let repository_path = path.join(REPOSITORY_DIR);

        Ok(Repository {
            index: RefCell::new(Index::new(repository_path.join("index").into_boxed_path())),
            database: Database::new(repository_path.join("objects").into_boxed_path()),
            workspace: Workspace::new(path.clone().into_boxed_path()),
            refs: Refs::new(repository_path.clone().into_boxed_path()),
            merge_state: MergeState::new(repository_path.clone().into_boxed_path()),
            config: Config::new(repository_path.join("config").into_boxed_path()),
            writer: RefCell::new(writer),
            path: path.into_boxed_path(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn repository_path(&self) -> Box<Path> {
        self.path.join(REPOSITORY_DIR).into_boxed_path()
    }

    /// Fail unless the repository directory has been initialized
    pub fn require_repository(&self) -> anyhow::Result<()> {
        let repository_path = self.repository_path();
        if !repository_path.is_dir() {
            return Err(RepoError::NotARepository(repository_path.into()).into());
        }
        Ok(())
    }

    pub fn writer(&'_ self) -> RefMut<'_, Box<dyn std::io::Write>> {
        self.writer.borrow_mut()
    }

    pub fn index(&'_ self) -> RefMut<'_, Index> {
        self.index.borrow_mut()
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    pub fn refs(&self) -> &Refs {
        &self.refs
    }

    pub fn merge_state(&self) -> &MergeState {
        &self.merge_state
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Store a commit authored with the configured identity
    ///
    /// # Arguments
    ///
    /// * `tree_oid` - root tree of the snapshot
    /// * `parents` - parent commits, current branch first
    /// * `message` - commit message; trailing whitespace is trimmed
    ///
    /// # Returns
    ///
    /// The new commit's id together with the stored commit
    pub fn write_commit(
        &self,
        tree_oid: ObjectId,
        parents: Vec<ObjectId>,
        message: &str,
    ) -> anyhow::Result<(ObjectId, Commit)> {
        let author = self.config.identity()?;
        let commit = Commit::new(parents, tree_oid, author, message.trim_end().to_string());
        let commit_oid = self.database.store(&commit)?;

        info!(commit = %commit_oid, parents = commit.parents().len(), "wrote commit");
        Ok((commit_oid, commit))
    }

    /// Flat path → blob view of a commit's tree
    pub fn commit_snapshot(&self, commit_oid: &ObjectId) -> anyhow::Result<IndexSnapshot> {
        let commit = self.database.parse_object_as_commit(commit_oid)?;
        self.workspace.materialize(&self.database, commit.tree_oid(), false)
    }

    /// Snapshot of the HEAD commit, empty on an unborn branch
    pub fn head_snapshot(&self) -> anyhow::Result<IndexSnapshot> {
        match self.refs.read_head()? {
            Some(head_oid) => self.commit_snapshot(&head_oid),
            None => Ok(IndexSnapshot::default()),
        }
    }

    /// Compare HEAD, the index and the working tree
    pub fn status_info(&self) -> anyhow::Result<StatusInfo> {
        let head = self.head_snapshot()?;
        let workspace = self.workspace.snapshot()?;
        let mut index = self.index();
        index.rehydrate()?;

        Ok(StatusInfo::compute(&head, index.snapshot(), &workspace))
    }

    /// Refuse to `action` while staged or unstaged changes exist
    pub fn ensure_clean_working_tree(&self, action: &str) -> anyhow::Result<()> {
        let status = self.status_info()?;

        if status.has_staged_changes() {
            return Err(RepoError::DirtyWorkingTree(format!(
                "cannot {action}: you have uncommitted changes"
            ))
            .into());
        }
        if status.has_unstaged_changes() {
            return Err(RepoError::DirtyWorkingTree(format!(
                "cannot {action}: you have unstaged changes"
            ))
            .into());
        }

        Ok(())
    }

    /// Recorded conflict paths that are not yet resolved
    ///
    /// A path counts as resolved once it is gone from both the index and the
    /// working tree, or once it is staged with exactly the content on disk.
    pub fn unresolved_conflicts(&self, index: &IndexSnapshot) -> anyhow::Result<Vec<String>> {
        let mut unresolved = Vec::new();

        for path in self.merge_state.conflicted_paths()? {
            let resolved = match index.get(&path) {
                None => !self.workspace.exists(&path),
                Some(staged) => {
                    self.workspace.is_file(&path) && self.workspace.hash_file(&path)? == *staged
                }
            };

            if !resolved {
                unresolved.push(path);
            }
        }

        Ok(unresolved)
    }

    /// Fail while any path recorded by a conflicted merge is still unresolved
    pub fn ensure_conflicts_resolved(&self, index: &IndexSnapshot) -> anyhow::Result<()> {
        if !self.merge_state.is_in_progress() {
            return Ok(());
        }

        let unresolved = self.unresolved_conflicts(index)?;
        if !unresolved.is_empty() {
            return Err(RepoError::UnresolvedMergeConflicts { paths: unresolved }.into());
        }
        Ok(())
    }

    /// Drop an in-progress merge once the working tree matches `kept`
    ///
    /// Conflict-marker files for paths `kept` does not track are deleted.
    pub fn discard_merge(&self, kept: &IndexSnapshot) -> anyhow::Result<()> {
        for path in self.merge_state.conflicted_paths()? {
            if !kept.contains(&path) {
                self.workspace.remove_file(&path)?;
            }
        }

        self.merge_state.clear()
    }

    fn first_parent_finder(
        &self,
    ) -> AncestorFinder<impl Fn(&ObjectId) -> anyhow::Result<Option<ObjectId>> + '_> {
        AncestorFinder::new(|oid: &ObjectId| -> anyhow::Result<Option<ObjectId>> {
            let commit = self.database.parse_object_as_commit(oid)?;
            Ok(commit.parent().copied())
        })
    }

    /// Merge `target` into the current branch whose tip is `current`
    ///
    /// # Arguments
    ///
    /// * `target` - tip of the incoming branch
    /// * `current` - tip of the current branch
    /// * `label` - names the incoming side in conflict markers and the merge message
    ///
    /// # Returns
    ///
    /// The [`MergeOutcome`]. On conflicts the marker files and merge state are
    /// written and nothing is committed.
    pub fn merge_commits(
        &self,
        target: &ObjectId,
        current: &ObjectId,
        label: &str,
    ) -> anyhow::Result<MergeOutcome> {
        match self.first_parent_finder().classify(current, target)? {
            MergeKind::UpToDate => Ok(MergeOutcome::UpToDate),
            MergeKind::FastForward => self.fast_forward(current, target),
            MergeKind::ThreeWay { base } => self.three_way_merge(&base, current, target, label),
        }
    }

    /// Rewrite the working tree and index from the `current` snapshot to `target`'s tree
    pub fn reconcile_to(&self, current: &IndexSnapshot, target: &ObjectId) -> anyhow::Result<IndexSnapshot> {
        let commit = self.database.parse_object_as_commit(target)?;
        let snapshot = self
            .workspace
            .materialize(&self.database, commit.tree_oid(), true)?;
        self.workspace.prune_obsolete(current, &snapshot)?;

        let mut index = self.index();
        index.replace(snapshot.clone());
        index.write_updates()?;

        Ok(snapshot)
    }

    fn fast_forward(&self, current: &ObjectId, target: &ObjectId) -> anyhow::Result<MergeOutcome> {
        let current_snapshot = self.commit_snapshot(current)?;
        self.reconcile_to(&current_snapshot, target)?;
        self.refs.update_head(*target)?;

        debug!(from = %current, to = %target, "fast-forwarded");
        Ok(MergeOutcome::FastForward { target: *target })
    }

    fn three_way_merge(
        &self,
        base: &ObjectId,
        current: &ObjectId,
        target: &ObjectId,
        label: &str,
    ) -> anyhow::Result<MergeOutcome> {
        let base_snapshot = self.commit_snapshot(base)?;
        let ours = self.commit_snapshot(current)?;
        let theirs = self.commit_snapshot(target)?;

        let result = ThreeWayMerge::new(&base_snapshot, &ours, &theirs, |oid: &ObjectId| {
            self.database.read_blob(oid)
        })
        .merge(label)?;

        // all blobs are read before the working tree is touched
        let incoming = result
            .merged
            .iter()
            .filter(|(path, oid)| ours.get(path) != Some(*oid))
            .map(|(path, oid)| -> anyhow::Result<(String, Bytes)> {
                Ok((path.clone(), self.database.read_blob(oid)?))
            })
            .collect::<anyhow::Result<Vec<_>>>()?;

        for (path, content) in incoming {
            self.workspace.write_file(&path, &content)?;
        }
        {
            let mut index = self.index();
            index.replace(result.merged.clone());
            index.write_updates()?;
        }
        self.workspace.prune_obsolete(&ours, &result.merged)?;

        for (path, conflict) in &result.conflicts {
            self.workspace.write_conflict_markers(path, conflict)?;
        }

        if !result.is_clean() {
            let paths = result.conflicts.keys().cloned().collect::<Vec<_>>();
            self.merge_state.begin(target, &paths)?;
            info!(conflicts = paths.len(), "merge stopped on conflicts");

            return Ok(MergeOutcome::Conflicted { paths });
        }

        let tree_oid = TreeBuilder::new(&self.database).build(&result.merged)?;
        let current_branch = self.refs.current_branch()?;
        let (commit_oid, _) = self.write_commit(
            tree_oid,
            vec![*current, *target],
            &format!("Merge branch '{label}' into {current_branch}"),
        )?;
        self.refs.update_head(commit_oid)?;

        Ok(MergeOutcome::Merged { commit: commit_oid })
    }
}
