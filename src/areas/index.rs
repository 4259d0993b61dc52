//! Staging area
//!
//! Tracks which blob each path will have in the next commit. The file at
//! `.twig/index` holds one `path|hash` line per staged file (see
//! [`IndexSnapshot`]); it is rewritten in full on every update.

use crate::artifacts::index::snapshot::IndexSnapshot;
use crate::artifacts::objects::object_id::ObjectId;
use anyhow::Context;
use std::io::{Read, Write};
use std::ops::DerefMut;
use std::path::Path;
use tracing::{debug, trace};

#[derive(Debug, Clone)]
pub struct Index {
    /// Path to the index file (`.twig/index`)
    path: Box<Path>,
    snapshot: IndexSnapshot,
    /// Flag indicating if the index has been modified since loading
    changed: bool,
}

impl Index {
    pub fn new(path: Box<Path>) -> Self {
        Index {
            path,
            snapshot: IndexSnapshot::default(),
            changed: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the index from disk; a missing file is an empty index
    ///
    /// # Locking
    ///
    /// Acquires a shared lock on the index file during reading.
    pub fn rehydrate(&mut self) -> anyhow::Result<()> {
        self.snapshot = IndexSnapshot::default();
        self.changed = false;

        if !self.path.exists() {
            return Ok(());
        }

        let mut index_file = std::fs::OpenOptions::new()
            .read(true)
            .open(self.path())
            .with_context(|| format!("failed to open index at {:?}", self.path))?;
        let mut lock = file_guard::lock(&mut index_file, file_guard::Lock::Shared, 0, 1)?;

        let mut content = String::new();
        lock.deref_mut()
            .read_to_string(&mut content)
            .with_context(|| format!("failed to read index at {:?}", self.path))?;

        self.snapshot = IndexSnapshot::parse(&content)?;
        trace!(entries = self.snapshot.len(), "loaded index");

        Ok(())
    }

    /// Persist the index, replacing the file content
    ///
    /// # Locking
    ///
    /// Acquires an exclusive lock on the index file during writing.
    pub fn write_updates(&mut self) -> anyhow::Result<()> {
        let mut index_file = std::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(self.path())
            .with_context(|| format!("failed to open index at {:?}", self.path))?;
        let mut lock = file_guard::lock(&mut index_file, file_guard::Lock::Exclusive, 0, 1)?;

        lock.deref_mut()
            .write_all(self.snapshot.serialize().as_bytes())
            .with_context(|| format!("failed to write index at {:?}", self.path))?;
        self.changed = false;
        debug!(entries = self.snapshot.len(), "wrote index");

        Ok(())
    }

    /// Stage `oid` at `path`, replacing files that clash with it as directories or vice versa
    ///
    /// # Arguments
    ///
    /// * `path` - repository-relative, `/`-separated path
    /// * `oid` - id of the stored blob
    ///
    /// # Returns
    ///
    /// An error, with the index left unchanged, when `path` cannot be
    /// serialized (see [`IndexSnapshot::validate_path`]).
    pub fn add(&mut self, path: &str, oid: ObjectId) -> anyhow::Result<()> {
        IndexSnapshot::validate_path(path)?;

        self.discard_conflicts(path);
        self.snapshot.insert(path, oid);
        self.changed = true;

        Ok(())
    }

    /// Unstage `path` and everything below it; returns whether anything was removed
    pub fn remove(&mut self, path: &str) -> bool {
        let mut removed = self.snapshot.remove(path).is_some();
        removed |= self.remove_children(path);
        self.changed |= removed;

        removed
    }

    /// Remove any entries that clash with a new entry at `path`
    ///
    /// A staged file at any parent directory of `path` is dropped, and so is
    /// everything staged underneath `path` itself.
    fn discard_conflicts(&mut self, path: &str) {
        for (separator, _) in path.match_indices('/') {
            self.snapshot.remove(&path[..separator]);
        }
        self.remove_children(path);
    }

    fn remove_children(&mut self, path: &str) -> bool {
        let prefix = format!("{path}/");
        let children = self
            .snapshot
            .paths()
            .filter(|child| child.starts_with(&prefix))
            .cloned()
            .collect::<Vec<_>>();

        for child in &children {
            self.snapshot.remove(child);
        }

        !children.is_empty()
    }

    pub fn get(&self, path: &str) -> Option<&ObjectId> {
        self.snapshot.get(path)
    }

    pub fn is_tracked(&self, path: &str) -> bool {
        self.snapshot.contains(path)
    }

    pub fn snapshot(&self) -> &IndexSnapshot {
        &self.snapshot
    }

    /// Swap in a whole new set of entries
    pub fn replace(&mut self, snapshot: IndexSnapshot) {
        self.snapshot = snapshot;
        self.changed = true;
    }

    pub fn is_changed(&self) -> bool {
        self.changed
    }

    pub fn entries_under_path(&self, path: &str) -> Vec<String> {
        self.snapshot.paths_under(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::objects::blob::Blob;
    use crate::artifacts::objects::object::Object;
    use crate::errors::RepoError;
    use assert_fs::TempDir;
    use assert_fs::prelude::*;
    use pretty_assertions::assert_eq;
    use rstest::{fixture, rstest};

    struct TestIndex {
        dir: TempDir,
        index: Index,
    }

    #[fixture]
    fn index() -> TestIndex {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let index = Index::new(dir.path().join("index").into_boxed_path());
        TestIndex { dir, index }
    }

    fn oid(content: &str) -> ObjectId {
        Blob::new(content.to_string()).object_id().unwrap()
    }

    #[rstest]
    fn missing_file_is_an_empty_index(mut index: TestIndex) {
        index.index.rehydrate().unwrap();

        assert!(index.index.snapshot().is_empty());
        assert!(!index.index.path().exists());
    }

    #[rstest]
    fn written_entries_load_back(mut index: TestIndex) {
        index.index.add("b.txt", oid("b")).unwrap();
        index.index.add("a/c.txt", oid("c")).unwrap();
        index.index.write_updates().unwrap();

        index
            .dir
            .child("index")
            .assert(format!("a/c.txt|{}\nb.txt|{}\n", oid("c"), oid("b")));

        let mut reloaded = Index::new(index.index.path().into());
        reloaded.rehydrate().unwrap();
        assert_eq!(reloaded.snapshot(), index.index.snapshot());
        assert!(!reloaded.is_changed());
    }

    #[rstest]
    fn staging_the_same_content_twice_is_a_no_op(mut index: TestIndex) {
        index.index.add("a.txt", oid("a")).unwrap();
        let before = index.index.snapshot().clone();

        index.index.add("a.txt", oid("a")).unwrap();

        assert_eq!(index.index.snapshot(), &before);
    }

    #[rstest]
    fn a_file_replaces_a_directory(mut index: TestIndex) {
        index.index.add("dir/one.txt", oid("1")).unwrap();
        index.index.add("dir/nested/two.txt", oid("2")).unwrap();
        index.index.add("dirt.txt", oid("3")).unwrap();

        index.index.add("dir", oid("4")).unwrap();

        assert_eq!(
            index.index.snapshot().paths().cloned().collect::<Vec<_>>(),
            vec!["dir", "dirt.txt"]
        );
    }

    #[rstest]
    fn a_directory_replaces_a_file(mut index: TestIndex) {
        index.index.add("a", oid("1")).unwrap();
        index.index.add("a/b", oid("2")).unwrap();

        index.index.add("a/b/c.txt", oid("3")).unwrap();

        assert_eq!(
            index.index.snapshot().paths().cloned().collect::<Vec<_>>(),
            vec!["a/b/c.txt"]
        );
    }

    #[rstest]
    fn removing_a_directory_unstages_its_files(mut index: TestIndex) {
        index.index.add("src/a.rs", oid("a")).unwrap();
        index.index.add("src/b.rs", oid("b")).unwrap();
        index.index.add("README", oid("r")).unwrap();

        assert!(index.index.remove("src"));
        assert!(!index.index.remove("missing"));
        assert_eq!(index.index.entries_under_path("."), vec!["README"]);
    }

    #[rstest]
    fn unwritable_path_is_refused_and_index_stays_loadable(mut index: TestIndex) {
        index.index.add("ok.txt", oid("ok")).unwrap();
        let before = index.index.snapshot().clone();

        let err = index.index.add("a|b.txt", oid("ab")).unwrap_err();

        assert!(err.to_string().contains("a|b.txt"));
        assert_eq!(index.index.snapshot(), &before);

        index.index.write_updates().unwrap();
        let mut reloaded = Index::new(index.index.path().into());
        reloaded.rehydrate().unwrap();
        assert_eq!(reloaded.snapshot(), &before);
    }

    #[rstest]
    fn malformed_index_fails_to_load(mut index: TestIndex) {
        index.dir.child("index").write_str("no-separator\n").unwrap();

        let err = index.index.rehydrate().unwrap_err();

        assert!(matches!(
            err.downcast_ref::<RepoError>(),
            Some(RepoError::IndexParse { line_number: 1, .. })
        ));
    }
}
