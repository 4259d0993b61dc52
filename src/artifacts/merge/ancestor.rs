//! First-parent ancestor resolution
//!
//! History is walked along first parents only. Each commit reachable that way is
//! recorded with its distance from the starting tip; the common ancestor of two
//! tips is the shared commit closest to the second tip.
//!
//! ```text
//! root ── A ── B   (main)
//!          \
//!           C      (feat)
//!
//! common_ancestor(B, C) == A
//! ```
//!
//! Merge commits reached during the walk contribute only their first parent, so on
//! histories that already contain merges between the two tips the result may not
//! be the lowest common ancestor of the full graph.

use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::RepoError;
use std::collections::HashMap;
use tracing::debug;

/// How a target tip relates to the current tip
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeKind {
    /// The target is already contained in the current history
    UpToDate,
    /// The current tip is an ancestor of the target
    FastForward,
    /// The histories diverged after `base`
    ThreeWay { base: ObjectId },
}

/// Resolves ancestry using a loader that returns the first parent of a commit
pub struct AncestorFinder<ParentLoaderFn>
where
    ParentLoaderFn: Fn(&ObjectId) -> anyhow::Result<Option<ObjectId>>,
{
    first_parent: ParentLoaderFn,
}

impl<ParentLoaderFn> AncestorFinder<ParentLoaderFn>
where
    ParentLoaderFn: Fn(&ObjectId) -> anyhow::Result<Option<ObjectId>>,
{
    pub fn new(first_parent: ParentLoaderFn) -> Self {
        Self { first_parent }
    }

    /// Commit → distance from `tip` along the first-parent chain
    pub fn history(&self, tip: &ObjectId) -> anyhow::Result<HashMap<ObjectId, usize>> {
        let mut depths = HashMap::new();
        let mut current = Some(*tip);
        let mut depth = 0;

        while let Some(oid) = current {
            if depths.insert(oid, depth).is_some() {
                // cycles cannot occur in a content-addressed graph, stop anyway
                break;
            }
            current = (self.first_parent)(&oid)?;
            depth += 1;
        }

        Ok(depths)
    }

    /// The shared commit with the smallest depth in `theirs`' history
    ///
    /// # Arguments
    ///
    /// * `ours` - tip of the current branch
    /// * `theirs` - tip of the incoming branch; its depths decide ties
    ///
    /// # Returns
    ///
    /// `None` when the first-parent chains never meet
    pub fn common_ancestor(
        &self,
        ours: &ObjectId,
        theirs: &ObjectId,
    ) -> anyhow::Result<Option<ObjectId>> {
        let our_history = self.history(ours)?;
        let their_history = self.history(theirs)?;

        let ancestor = their_history
            .iter()
            .filter(|(oid, _)| our_history.contains_key(*oid))
            .min_by_key(|(oid, depth)| (**depth, **oid))
            .map(|(oid, _)| *oid);

        debug!(
            ours = %ours,
            theirs = %theirs,
            ancestor = ?ancestor,
            "resolved common ancestor"
        );

        Ok(ancestor)
    }

    /// Decide how `target` merges into `current`
    pub fn classify(&self, current: &ObjectId, target: &ObjectId) -> anyhow::Result<MergeKind> {
        let Some(base) = self.common_ancestor(current, target)? else {
            return Err(RepoError::AncestorNotFound {
                ours: *current,
                theirs: *target,
            }
            .into());
        };

        let kind = if base == *target {
            MergeKind::UpToDate
        } else if base == *current {
            MergeKind::FastForward
        } else {
            MergeKind::ThreeWay { base }
        };

        debug!(current = %current, target = %target, kind = ?kind, "classified merge");
        Ok(kind)
    }
}
