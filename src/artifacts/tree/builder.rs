//! Flat snapshot → tree graph
//!
//! Entries are partitioned on their first path segment. Single-segment paths
//! become blob entries of the current level; everything else is grouped into a
//! sub-map keyed by the segment and recursed into. Each level stores its tree
//! object only after all of its children, so a tree never references an object
//! that is not yet in the store.

use crate::areas::database::Database;
use crate::artifacts::index::snapshot::IndexSnapshot;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::tree::{Tree, TreeEntry};
use std::collections::BTreeMap;
use tracing::{debug, trace};

/// Remaining path → blob id for one directory level
type Level<'p> = BTreeMap<&'p str, ObjectId>;

pub struct TreeBuilder<'d> {
    database: &'d Database,
}

impl<'d> TreeBuilder<'d> {
    pub fn new(database: &'d Database) -> Self {
        TreeBuilder { database }
    }

    /// Store every tree needed to represent `snapshot` and return the root id
    ///
    /// # Arguments
    ///
    /// * `snapshot` - flat path to blob mapping; an empty one builds the empty tree
    ///
    /// # Returns
    ///
    /// The root tree id, or an error when a path is both a file and a
    /// directory or has an empty segment
    pub fn build(&self, snapshot: &IndexSnapshot) -> anyhow::Result<ObjectId> {
        let level: Level = snapshot
            .iter()
            .map(|(path, oid)| (path.as_str(), *oid))
            .collect();

        let root = self.write_level("", level)?;
        debug!(root = %root, entries = snapshot.len(), "built tree");

        Ok(root)
    }

    fn write_level(&self, prefix: &str, level: Level) -> anyhow::Result<ObjectId> {
        let mut files: BTreeMap<&str, ObjectId> = BTreeMap::new();
        let mut directories: BTreeMap<&str, Level> = BTreeMap::new();

        for (path, oid) in level {
            match path.split_once('/') {
                None => {
                    Self::check_segment(prefix, path)?;
                    files.insert(path, oid);
                }
                Some((segment, rest)) => {
                    Self::check_segment(prefix, segment)?;
                    directories.entry(segment).or_default().insert(rest, oid);
                }
            }
        }

        if let Some(name) = files.keys().find(|name| directories.contains_key(*name)) {
            anyhow::bail!(
                "'{}' is staged both as a file and as a directory",
                Self::join(prefix, name)
            );
        }

        let mut tree = Tree::default();
        for (name, sub_level) in directories {
            let child = self.write_level(&Self::join(prefix, name), sub_level)?;
            tree.insert(name, TreeEntry::tree(child))?;
        }
        for (name, oid) in files {
            tree.insert(name, TreeEntry::blob(oid))?;
        }

        let oid = self.database.store(&tree)?;
        trace!(dir = if prefix.is_empty() { "." } else { prefix }, tree = %oid, "stored tree level");

        Ok(oid)
    }

    fn check_segment(prefix: &str, segment: &str) -> anyhow::Result<()> {
        if segment.is_empty() {
            anyhow::bail!("staged path under '{prefix}' has an empty segment");
        }
        Ok(())
    }

    fn join(prefix: &str, name: &str) -> String {
        if prefix.is_empty() {
            name.to_string()
        } else {
            format!("{prefix}/{name}")
        }
    }
}
