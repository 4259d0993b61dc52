//! Tree object
//!
//! Trees represent one directory level. They contain entries for files (blobs)
//! and subdirectories (other trees), along with their names and modes.
//!
//! ## Format
//!
//! On disk: `tree <size>\0<entries>`
//! Each entry: `<mode> <name>\0<20-byte-sha1>`
//!
//! Entries are kept in a `BTreeMap` keyed by name, so serialization is always in
//! canonical name order regardless of insertion order.

use crate::artifacts::objects::object::{Object, Packable, Unpackable, with_header};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use anyhow::Context;
use bytes::Bytes;
use std::collections::BTreeMap;
use std::io::BufRead;

/// Mode of a tree entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryMode {
    /// Regular file (`100644`)
    Regular,
    /// Subdirectory (`040000`)
    Directory,
}

impl EntryMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryMode::Regular => "100644",
            EntryMode::Directory => "040000",
        }
    }

    pub fn object_type(&self) -> ObjectType {
        match self {
            EntryMode::Regular => ObjectType::Blob,
            EntryMode::Directory => ObjectType::Tree,
        }
    }

    /// Parse an octal mode string; leading zeros are optional
    pub fn from_octal_str(mode: &str) -> anyhow::Result<Self> {
        let value = u32::from_str_radix(mode, 8)
            .with_context(|| format!("invalid entry mode '{mode}'"))?;

        match value {
            0o100644 => Ok(EntryMode::Regular),
            0o040000 => Ok(EntryMode::Directory),
            _ => anyhow::bail!("unsupported entry mode '{mode}'"),
        }
    }
}

/// A single named entry of a tree
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeEntry {
    pub mode: EntryMode,
    pub oid: ObjectId,
}

impl TreeEntry {
    pub fn blob(oid: ObjectId) -> Self {
        Self {
            mode: EntryMode::Regular,
            oid,
        }
    }

    pub fn tree(oid: ObjectId) -> Self {
        Self {
            mode: EntryMode::Directory,
            oid,
        }
    }

    pub fn kind(&self) -> ObjectType {
        self.mode.object_type()
    }

    pub fn is_tree(&self) -> bool {
        self.mode == EntryMode::Directory
    }
}

/// Tree object representing one directory snapshot
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tree {
    entries: BTreeMap<String, TreeEntry>,
}

impl Tree {
    /// Insert an entry, validating that the name is a single path component
    pub fn insert(&mut self, name: &str, entry: TreeEntry) -> anyhow::Result<()> {
        validate_entry_name(name)?;
        if self.entries.contains_key(name) {
            anyhow::bail!("duplicate tree entry '{name}'");
        }

        self.entries.insert(name.to_string(), entry);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&TreeEntry> {
        self.entries.get(name)
    }

    pub fn entries(&self) -> impl Iterator<Item = (&String, &TreeEntry)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn validate_entry_name(name: &str) -> anyhow::Result<()> {
    if name.is_empty() || name == "." || name == ".." {
        anyhow::bail!("invalid tree entry name '{name}'");
    }
    if name.contains('/') || name.contains('\0') {
        anyhow::bail!("tree entry name '{name}' is not a single path component");
    }

    Ok(())
}

impl FromIterator<(String, TreeEntry)> for Tree {
    fn from_iter<I: IntoIterator<Item = (String, TreeEntry)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl Packable for Tree {
    fn serialize(&self) -> anyhow::Result<Bytes> {
        let mut payload = Vec::new();

        for (name, entry) in &self.entries {
            payload.extend_from_slice(entry.mode.as_str().as_bytes());
            payload.push(b' ');
            payload.extend_from_slice(name.as_bytes());
            payload.push(0);
            entry.oid.write_raw_to(&mut payload)?;
        }

        Ok(with_header(self.object_type(), &payload))
    }
}

impl Unpackable for Tree {
    fn deserialize(mut reader: impl BufRead) -> anyhow::Result<Self> {
        let mut tree = Tree::default();

        // Reuse scratch buffers to reduce allocs
        let mut mode_bytes = Vec::new();
        let mut name_bytes = Vec::new();

        loop {
            mode_bytes.clear();
            // Read "mode " (space-delimited)
            let n = reader.read_until(b' ', &mut mode_bytes)?;
            if n == 0 {
                break; // clean EOF: no more entries
            }
            if mode_bytes.pop() != Some(b' ') {
                anyhow::bail!("unexpected end of tree entry: missing space after mode");
            }
            let mode = EntryMode::from_octal_str(std::str::from_utf8(&mode_bytes)?)?;

            // Read "name\0"
            name_bytes.clear();
            reader.read_until(b'\0', &mut name_bytes)?;
            if name_bytes.pop() != Some(b'\0') {
                anyhow::bail!("unexpected end of tree entry: missing NUL after name");
            }
            let name = std::str::from_utf8(&name_bytes)?;

            let oid = ObjectId::read_raw_from(&mut reader)
                .context("unexpected end of tree entry: truncated object id")?;

            tree.insert(name, TreeEntry { mode, oid })?;
        }

        Ok(tree)
    }
}

impl Object for Tree {
    fn object_type(&self) -> ObjectType {
        ObjectType::Tree
    }

    fn display(&self) -> String {
        self.entries
            .iter()
            .map(|(name, entry)| {
                format!(
                    "{} {} {}\t{}",
                    entry.mode.as_str(),
                    entry.kind(),
                    entry.oid,
                    name
                )
            })
            .collect::<Vec<String>>()
            .join("\n")
    }
}
