//! Path-level three-way merge
//!
//! Every path in the union of the base, ours and theirs snapshots is classified by
//! where it is present and which of its hashes agree:
//!
//! | base | ours | theirs | condition                  | result                 |
//! |------|------|--------|----------------------------|------------------------|
//! |      | ✓    |        |                            | ours                   |
//! |      |      | ✓      |                            | theirs                 |
//! |      | ✓    | ✓      | ours == theirs             | ours                   |
//! |      | ✓    | ✓      | ours != theirs             | conflict (both added)  |
//! | ✓    |      |        |                            | drop                   |
//! | ✓    | ✓    |        | base == ours               | drop                   |
//! | ✓    | ✓    |        | base != ours               | conflict               |
//! | ✓    |      | ✓      | base == theirs             | drop                   |
//! | ✓    |      | ✓      | base != theirs             | conflict               |
//! | ✓    | ✓    | ✓      | all equal                  | base                   |
//! | ✓    | ✓    | ✓      | only theirs changed        | theirs                 |
//! | ✓    | ✓    | ✓      | only ours changed          | ours                   |
//! | ✓    | ✓    | ✓      | same change on both sides  | ours                   |
//! | ✓    | ✓    | ✓      | all differ                 | conflict               |
//!
//! Conflicted paths are left out of the merged snapshot. Blob content for conflicts
//! is read before anything is returned, so a failing reader aborts the whole merge.

use crate::artifacts::index::snapshot::IndexSnapshot;
use crate::artifacts::merge::conflict::{Conflict, ConflictKind};
use crate::artifacts::objects::object_id::ObjectId;
use bitflags::bitflags;
use bytes::Bytes;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, trace};

bitflags! {
    /// Snapshots a path is present in
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Presence: u8 {
        const BASE = 0b001;
        const OURS = 0b010;
        const THEIRS = 0b100;
    }
}

/// What happens to one path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Take(ObjectId),
    Drop,
    Conflict(ConflictKind),
}

impl Presence {
    pub fn of(base: Option<&ObjectId>, ours: Option<&ObjectId>, theirs: Option<&ObjectId>) -> Self {
        let mut presence = Presence::empty();
        presence.set(Presence::BASE, base.is_some());
        presence.set(Presence::OURS, ours.is_some());
        presence.set(Presence::THEIRS, theirs.is_some());
        presence
    }
}

/// Resolve a single path from its three (optional) hashes
///
/// # Arguments
///
/// * `base` - hash in the common ancestor, if the path exists there
/// * `ours` - hash on the current branch
/// * `theirs` - hash on the incoming branch
///
/// # Returns
///
/// The row of the merge table the path falls into. A path present nowhere
/// is dropped.
pub fn resolve(
    base: Option<&ObjectId>,
    ours: Option<&ObjectId>,
    theirs: Option<&ObjectId>,
) -> Resolution {
    let take = |oid: Option<&ObjectId>| oid.copied().map_or(Resolution::Drop, Resolution::Take);

    match Presence::of(base, ours, theirs) {
        presence if presence.is_all() => {
            if base == ours {
                take(theirs)
            } else if base == theirs || ours == theirs {
                take(ours)
            } else {
                Resolution::Conflict(ConflictKind::BothModified)
            }
        }
        presence if presence == Presence::OURS | Presence::THEIRS => {
            if ours == theirs {
                take(ours)
            } else {
                Resolution::Conflict(ConflictKind::BothAdded)
            }
        }
        presence if presence == Presence::BASE | Presence::OURS => {
            if base == ours {
                Resolution::Drop
            } else {
                Resolution::Conflict(ConflictKind::ModifiedDeleted)
            }
        }
        presence if presence == Presence::BASE | Presence::THEIRS => {
            if base == theirs {
                Resolution::Drop
            } else {
                Resolution::Conflict(ConflictKind::DeletedModified)
            }
        }
        presence if presence == Presence::OURS => take(ours),
        presence if presence == Presence::THEIRS => take(theirs),
        // only in base, or nowhere
        _ => Resolution::Drop,
    }
}

/// Merged snapshot plus the paths that need manual resolution
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeResult {
    pub merged: IndexSnapshot,
    pub conflicts: BTreeMap<String, Conflict>,
}

impl MergeResult {
    pub fn is_clean(&self) -> bool {
        self.conflicts.is_empty()
    }
}

/// Three-way merge of snapshots, reading conflicting blobs through `read_blob`
pub struct ThreeWayMerge<'s, ReadBlobFn>
where
    ReadBlobFn: Fn(&ObjectId) -> anyhow::Result<Bytes>,
{
    base: &'s IndexSnapshot,
    ours: &'s IndexSnapshot,
    theirs: &'s IndexSnapshot,
    read_blob: ReadBlobFn,
}

impl<'s, ReadBlobFn> ThreeWayMerge<'s, ReadBlobFn>
where
    ReadBlobFn: Fn(&ObjectId) -> anyhow::Result<Bytes>,
{
    pub fn new(
        base: &'s IndexSnapshot,
        ours: &'s IndexSnapshot,
        theirs: &'s IndexSnapshot,
        read_blob: ReadBlobFn,
    ) -> Self {
        Self {
            base,
            ours,
            theirs,
            read_blob,
        }
    }

    /// Merge every path; `branch` labels the incoming side in conflict markers
    pub fn merge(&self, branch: &str) -> anyhow::Result<MergeResult> {
        let paths: BTreeSet<&String> = self
            .base
            .paths()
            .chain(self.ours.paths())
            .chain(self.theirs.paths())
            .collect();

        let mut result = MergeResult::default();

        for path in paths {
            let base = self.base.get(path);
            let ours = self.ours.get(path);
            let theirs = self.theirs.get(path);

            let resolution = resolve(base, ours, theirs);
            trace!(path = %path, presence = ?Presence::of(base, ours, theirs), resolution = ?resolution, "resolved path");

            match resolution {
                Resolution::Take(oid) => {
                    result.merged.insert(path.clone(), oid);
                }
                Resolution::Drop => {}
                Resolution::Conflict(kind) => {
                    let conflict = Conflict {
                        kind,
                        base: base.copied(),
                        ours: ours.copied(),
                        theirs: theirs.copied(),
                        ours_content: self.content_of(ours)?,
                        theirs_content: self.content_of(theirs)?,
                        branch: branch.to_string(),
                    };
                    result.conflicts.insert(path.clone(), conflict);
                }
            }
        }

        debug!(
            merged = result.merged.len(),
            conflicts = result.conflicts.len(),
            "three-way merge finished"
        );

        Ok(result)
    }

    fn content_of(&self, oid: Option<&ObjectId>) -> anyhow::Result<Bytes> {
        match oid {
            Some(oid) => (self.read_blob)(oid),
            None => Ok(Bytes::new()),
        }
    }
}
