//! Working tree access and reconciliation
//!
//! Paths handed to the workspace are repository-relative and `/`-separated, the
//! same form the index uses. Every filesystem failure is reported as a
//! `WorkingTreeIo` error naming the path involved.

use crate::areas::database::Database;
use crate::artifacts::index::snapshot::IndexSnapshot;
use crate::artifacts::merge::conflict::Conflict;
use crate::artifacts::objects::blob::Blob;
use crate::artifacts::objects::object::Object;
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::RepoError;
use bytes::Bytes;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, trace};
use walkdir::WalkDir;

pub const REPOSITORY_DIR: &str = ".twig";

#[derive(Debug)]
pub struct Workspace {
    path: Box<Path>,
}

impl Workspace {
    pub fn new(path: Box<Path>) -> Self {
        Workspace { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn full_path(&self, path: &str) -> PathBuf {
        self.path.join(path)
    }

    /// Turn a user-supplied path into the repository-relative form
    ///
    /// Absolute paths must lie inside the working tree. The root itself comes
    /// back as an empty string.
    pub fn normalize_pathspec(&self, pathspec: &str) -> anyhow::Result<String> {
        let candidate = Path::new(pathspec);
        let relative = if candidate.is_absolute() {
            candidate.strip_prefix(&self.path).map_err(|_| {
                anyhow::anyhow!("'{pathspec}' is outside the repository at {:?}", self.path)
            })?
        } else {
            candidate
        };

        let mut segments = Vec::new();
        for component in relative.components() {
            match component {
                Component::CurDir => {}
                Component::Normal(segment) => segments.push(segment.to_string_lossy()),
                Component::ParentDir if segments.pop().is_some() => {}
                _ => anyhow::bail!("'{pathspec}' is outside the repository"),
            }
        }

        Ok(segments.join("/"))
    }

    /// Whether a regular file exists at `path`
    pub fn is_file(&self, path: &str) -> bool {
        std::fs::symlink_metadata(self.full_path(path)).is_ok_and(|metadata| metadata.is_file())
    }

    pub fn exists(&self, path: &str) -> bool {
        std::fs::symlink_metadata(self.full_path(path)).is_ok()
    }

    /// Files at or below `pathspec` (everything when `None`), sorted
    ///
    /// The repository directory is never listed. A pathspec that does not exist
    /// yields an empty list.
    pub fn list_files(&self, pathspec: Option<&str>) -> anyhow::Result<Vec<String>> {
        let root = match pathspec {
            Some(pathspec) if pathspec != "." => self.full_path(pathspec),
            _ => self.path.to_path_buf(),
        };

        if !root.exists() {
            return Ok(Vec::new());
        }

        let mut files = Vec::new();
        let walker = WalkDir::new(&root)
            .into_iter()
            .filter_entry(|entry| entry.file_name() != REPOSITORY_DIR);

        for entry in walker {
            let entry = entry.map_err(|err| {
                let path = err.path().map(Path::to_path_buf).unwrap_or_else(|| root.clone());
                let source = err
                    .into_io_error()
                    .unwrap_or_else(|| std::io::Error::other("filesystem loop"));
                RepoError::io(path, source)
            })?;

            if entry.file_type().is_file()
                && let Some(relative) = self.relative_path(entry.path())
            {
                files.push(relative);
            }
        }
        files.sort();

        Ok(files)
    }

    pub fn read_file(&self, path: &str) -> anyhow::Result<Bytes> {
        let full_path = self.full_path(path);
        let content = std::fs::read(&full_path).map_err(|err| RepoError::io(full_path, err))?;

        Ok(content.into())
    }

    pub fn parse_blob(&self, path: &str) -> anyhow::Result<Blob> {
        Ok(Blob::new(self.read_file(path)?))
    }

    /// Blob id the file at `path` would get if staged
    pub fn hash_file(&self, path: &str) -> anyhow::Result<ObjectId> {
        self.parse_blob(path)?.object_id()
    }

    /// Path → blob id for every file in the working tree
    pub fn snapshot(&self) -> anyhow::Result<IndexSnapshot> {
        self.list_files(None)?
            .into_iter()
            .map(|path| -> anyhow::Result<(String, ObjectId)> {
                let oid = self.hash_file(&path)?;
                Ok((path, oid))
            })
            .collect()
    }

    /// Write `content` to `path`, creating parent directories
    ///
    /// A file in place of a parent directory, or a directory in place of the
    /// file, is removed first.
    pub fn write_file(&self, path: &str, content: &[u8]) -> anyhow::Result<()> {
        let full_path = self.full_path(path);

        self.make_parent_directories(path)?;
        if full_path.is_dir() {
            std::fs::remove_dir_all(&full_path)
                .map_err(|err| RepoError::io(full_path.clone(), err))?;
        }

        std::fs::write(&full_path, content).map_err(|err| RepoError::io(full_path, err))?;
        trace!(path, bytes = content.len(), "wrote working file");

        Ok(())
    }

    /// Delete the file at `path` and any parent directories left empty
    ///
    /// Paths that are already gone, or that are not regular files, are left alone.
    pub fn remove_file(&self, path: &str) -> anyhow::Result<()> {
        if !self.is_file(path) {
            return Ok(());
        }

        let full_path = self.full_path(path);
        std::fs::remove_file(&full_path).map_err(|err| RepoError::io(full_path.clone(), err))?;
        self.remove_empty_parents(&full_path)?;
        trace!(path, "removed working file");

        Ok(())
    }

    /// Expand a tree into a flat snapshot, writing its blobs to disk when `write` is set
    ///
    /// # Arguments
    ///
    /// * `database` - store the tree and its blobs are read from
    /// * `tree_oid` - root tree to expand
    /// * `write` - also write every blob to its path, replacing a directory in the way
    ///
    /// # Returns
    ///
    /// The tree's paths and blob ids
    pub fn materialize(
        &self,
        database: &Database,
        tree_oid: &ObjectId,
        write: bool,
    ) -> anyhow::Result<IndexSnapshot> {
        let mut snapshot = IndexSnapshot::default();
        self.materialize_tree(database, tree_oid, "", write, &mut snapshot)?;

        if write {
            debug!(tree = %tree_oid, files = snapshot.len(), "materialized tree");
        }

        Ok(snapshot)
    }

    fn materialize_tree(
        &self,
        database: &Database,
        tree_oid: &ObjectId,
        prefix: &str,
        write: bool,
        snapshot: &mut IndexSnapshot,
    ) -> anyhow::Result<()> {
        let tree = database.parse_object_as_tree(tree_oid)?;

        for (name, entry) in tree.entries() {
            let path = if prefix.is_empty() {
                name.clone()
            } else {
                format!("{prefix}/{name}")
            };

            if entry.is_tree() {
                self.materialize_tree(database, &entry.oid, &path, write, snapshot)?;
            } else {
                if write {
                    let content = database.read_blob(&entry.oid)?;
                    self.write_file(&path, &content)?;
                }
                snapshot.insert(path, entry.oid);
            }
        }

        Ok(())
    }

    /// Delete every file tracked in `old` that `new` no longer tracks
    pub fn prune_obsolete(&self, old: &IndexSnapshot, new: &IndexSnapshot) -> anyhow::Result<()> {
        for path in old.paths().filter(|path| !new.contains(path)) {
            self.remove_file(path)?;
        }

        Ok(())
    }

    /// Replace the file at `path` with both sides of a conflict
    pub fn write_conflict_markers(&self, path: &str, conflict: &Conflict) -> anyhow::Result<()> {
        self.write_file(path, &conflict.markers())?;
        debug!(path, kind = %conflict.kind, "wrote conflict markers");

        Ok(())
    }

    fn make_parent_directories(&self, path: &str) -> anyhow::Result<()> {
        for (separator, _) in path.match_indices('/') {
            let dir_path = self.full_path(&path[..separator]);

            match std::fs::symlink_metadata(&dir_path) {
                Ok(metadata) if metadata.is_dir() => continue,
                Ok(_) => {
                    // delete existing file standing where a directory must go
                    std::fs::remove_file(&dir_path)
                        .map_err(|err| RepoError::io(dir_path.clone(), err))?;
                }
                Err(_) => {}
            }

            std::fs::create_dir(&dir_path).map_err(|err| RepoError::io(dir_path, err))?;
        }

        Ok(())
    }

    fn remove_empty_parents(&self, file_path: &Path) -> anyhow::Result<()> {
        let mut current = file_path.parent();

        while let Some(dir_path) = current {
            if dir_path == self.path.as_ref() {
                break;
            }

            let is_empty = std::fs::read_dir(dir_path)
                .map_err(|err| RepoError::io(dir_path, err))?
                .next()
                .is_none();
            if !is_empty {
                break;
            }

            std::fs::remove_dir(dir_path).map_err(|err| RepoError::io(dir_path, err))?;
            current = dir_path.parent();
        }

        Ok(())
    }

    fn relative_path(&self, path: &Path) -> Option<String> {
        let relative = path.strip_prefix(self.path.as_ref()).ok()?;
        let parts = relative
            .components()
            .map(|component| component.as_os_str().to_str())
            .collect::<Option<Vec<_>>>()?;

        Some(parts.join("/"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::merge::conflict::ConflictKind;
    use crate::artifacts::tree::builder::TreeBuilder;
    use assert_fs::TempDir;
    use assert_fs::prelude::*;
    use pretty_assertions::assert_eq;
    use rstest::{fixture, rstest};

    struct TestWorkspace {
        dir: TempDir,
        workspace: Workspace,
        database: Database,
    }

    #[fixture]
    fn workspace() -> TestWorkspace {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let workspace = Workspace::new(dir.path().into());
        let database = Database::new(dir.path().join(REPOSITORY_DIR).join("objects").into());
        TestWorkspace {
            dir,
            workspace,
            database,
        }
    }

    fn store_snapshot(database: &Database, files: &[(&str, &str)]) -> (ObjectId, IndexSnapshot) {
        let snapshot: IndexSnapshot = files
            .iter()
            .map(|(path, content)| {
                let oid = database.store(&Blob::new(content.to_string())).unwrap();
                (path.to_string(), oid)
            })
            .collect();
        let tree = TreeBuilder::new(database).build(&snapshot).unwrap();
        (tree, snapshot)
    }

    #[rstest]
    fn lists_files_without_the_repository_directory(workspace: TestWorkspace) {
        workspace.dir.child("b.txt").write_str("b").unwrap();
        workspace.dir.child("a/nested/c.txt").write_str("c").unwrap();
        workspace.dir.child(".twig/HEAD").write_str("ref").unwrap();

        assert_eq!(
            workspace.workspace.list_files(None).unwrap(),
            vec!["a/nested/c.txt", "b.txt"]
        );
        assert_eq!(
            workspace.workspace.list_files(Some("a")).unwrap(),
            vec!["a/nested/c.txt"]
        );
        assert!(workspace.workspace.list_files(Some("missing")).unwrap().is_empty());
    }

    #[rstest]
    fn materializing_writes_every_blob(workspace: TestWorkspace) {
        let (tree, expected) =
            store_snapshot(&workspace.database, &[("top.txt", "top\n"), ("d/e/f.txt", "deep\n")]);

        let written = workspace
            .workspace
            .materialize(&workspace.database, &tree, true)
            .unwrap();

        assert_eq!(written, expected);
        workspace.dir.child("top.txt").assert("top\n");
        workspace.dir.child("d/e/f.txt").assert("deep\n");
    }

    #[rstest]
    fn read_only_materialize_leaves_the_disk_alone(workspace: TestWorkspace) {
        let (tree, expected) = store_snapshot(&workspace.database, &[("x.txt", "x")]);

        let flattened = workspace
            .workspace
            .materialize(&workspace.database, &tree, false)
            .unwrap();

        assert_eq!(flattened, expected);
        workspace.dir.child("x.txt").assert(predicates::path::missing());
    }

    #[rstest]
    fn materializing_replaces_files_and_directories_in_the_way(workspace: TestWorkspace) {
        workspace.dir.child("a").write_str("was a file").unwrap();
        workspace.dir.child("b/old.txt").write_str("was a dir").unwrap();
        let (tree, _) = store_snapshot(&workspace.database, &[("a/inner.txt", "in"), ("b", "file")]);

        workspace
            .workspace
            .materialize(&workspace.database, &tree, true)
            .unwrap();

        workspace.dir.child("a/inner.txt").assert("in");
        workspace.dir.child("b").assert("file");
    }

    #[rstest]
    fn pruning_removes_dropped_files_and_empty_directories(workspace: TestWorkspace) {
        let (tree, old) = store_snapshot(
            &workspace.database,
            &[("keep.txt", "k"), ("gone/deep/x.txt", "x"), ("gone.txt", "g")],
        );
        workspace
            .workspace
            .materialize(&workspace.database, &tree, true)
            .unwrap();
        let mut new = old.clone();
        new.remove("gone/deep/x.txt");
        new.remove("gone.txt");
        new.remove("never-written.txt");

        workspace.workspace.prune_obsolete(&old, &new).unwrap();

        workspace.dir.child("keep.txt").assert("k");
        workspace.dir.child("gone.txt").assert(predicates::path::missing());
        workspace.dir.child("gone").assert(predicates::path::missing());
    }

    #[rstest]
    fn pruning_skips_files_already_missing(workspace: TestWorkspace) {
        let old: IndexSnapshot = [("vanished.txt".to_string(), ObjectId::default())]
            .into_iter()
            .collect();

        workspace
            .workspace
            .prune_obsolete(&old, &IndexSnapshot::default())
            .unwrap();
    }

    #[rstest]
    fn conflict_markers_overwrite_the_file(workspace: TestWorkspace) {
        workspace.dir.child("f.txt").write_str("whatever").unwrap();
        let conflict = Conflict {
            kind: ConflictKind::BothModified,
            base: None,
            ours: None,
            theirs: None,
            ours_content: Bytes::from_static(b"mine\n"),
            theirs_content: Bytes::from_static(b"yours\n"),
            branch: "feature".to_string(),
        };

        workspace
            .workspace
            .write_conflict_markers("f.txt", &conflict)
            .unwrap();

        workspace
            .dir
            .child("f.txt")
            .assert("<<<<<<< HEAD\nmine\n=======\nyours\n>>>>>>> feature\n");
    }

    #[rstest]
    fn reading_a_missing_file_is_a_working_tree_error(workspace: TestWorkspace) {
        let err = workspace.workspace.read_file("nope.txt").unwrap_err();

        assert!(matches!(
            err.downcast_ref::<RepoError>(),
            Some(RepoError::WorkingTreeIo { .. })
        ));
    }

    #[rstest]
    fn snapshot_hashes_working_files(workspace: TestWorkspace) {
        workspace.dir.child("hello.txt").write_str("hello\n").unwrap();

        let snapshot = workspace.workspace.snapshot().unwrap();

        assert_eq!(
            snapshot.get("hello.txt").map(ObjectId::to_string),
            Some("ce013625030ba8dba906f756967f9e9ca394464a".to_string())
        );
    }

    #[rstest]
    #[case("a.txt", "a.txt")]
    #[case("./dir/b.txt", "dir/b.txt")]
    #[case("dir/", "dir")]
    #[case("dir/../c.txt", "c.txt")]
    #[case(".", "")]
    fn pathspecs_become_repository_relative(
        workspace: TestWorkspace,
        #[case] pathspec: &str,
        #[case] expected: &str,
    ) {
        assert_eq!(workspace.workspace.normalize_pathspec(pathspec).unwrap(), expected);
    }

    #[rstest]
    fn absolute_pathspecs_are_stripped_of_the_root(workspace: TestWorkspace) {
        let absolute = workspace.dir.path().join("dir").join("b.txt");

        assert_eq!(
            workspace
                .workspace
                .normalize_pathspec(&absolute.to_string_lossy())
                .unwrap(),
            "dir/b.txt"
        );
        assert!(workspace.workspace.normalize_pathspec("../escape.txt").is_err());
    }
}
