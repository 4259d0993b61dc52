//! In-progress merge bookkeeping
//!
//! A merge that stops on conflicts leaves two files behind in `.twig`:
//!
//! - `MERGE_HEAD`: hex id of the commit being merged in
//! - `MERGE_CONFLICTS`: the conflicted paths, one per line
//!
//! Both are removed once the merge is committed or aborted.

use crate::artifacts::objects::object_id::ObjectId;
use anyhow::Context;
use derive_new::new;
use std::path::Path;
use tracing::debug;

const MERGE_HEAD: &str = "MERGE_HEAD";
const MERGE_CONFLICTS: &str = "MERGE_CONFLICTS";

#[derive(Debug, new)]
pub struct MergeState {
    /// Path to the repository directory (`.twig`)
    path: Box<Path>,
}

impl MergeState {
    /// Record a conflicted merge of `target`
    pub fn begin(&self, target: &ObjectId, paths: &[String]) -> anyhow::Result<()> {
        let merge_head_path = self.path.join(MERGE_HEAD);
        std::fs::write(&merge_head_path, target.to_hex())
            .with_context(|| format!("failed to write {:?}", merge_head_path))?;

        let conflicts_path = self.path.join(MERGE_CONFLICTS);
        std::fs::write(&conflicts_path, paths.join("\n"))
            .with_context(|| format!("failed to write {:?}", conflicts_path))?;

        debug!(target = %target, conflicts = paths.len(), "recorded merge state");
        Ok(())
    }

    pub fn is_in_progress(&self) -> bool {
        self.path.join(MERGE_HEAD).exists()
    }

    /// The commit being merged in, if a merge is in progress
    pub fn merge_head(&self) -> anyhow::Result<Option<ObjectId>> {
        let merge_head_path = self.path.join(MERGE_HEAD);
        if !merge_head_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&merge_head_path)
            .with_context(|| format!("failed to read {:?}", merge_head_path))?;
        Ok(Some(ObjectId::try_parse(content.trim())?))
    }

    pub fn conflicted_paths(&self) -> anyhow::Result<Vec<String>> {
        let conflicts_path = self.path.join(MERGE_CONFLICTS);
        if !conflicts_path.exists() {
            return Ok(Vec::new());
        }

        let content = std::fs::read_to_string(&conflicts_path)
            .with_context(|| format!("failed to read {:?}", conflicts_path))?;
        Ok(content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect())
    }

    /// Forget the merge; missing files are fine
    pub fn clear(&self) -> anyhow::Result<()> {
        for name in [MERGE_HEAD, MERGE_CONFLICTS] {
            let state_path = self.path.join(name);
            match std::fs::remove_file(&state_path) {
                Ok(()) => {}
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
                Err(err) => {
                    return Err(anyhow::Error::new(err)
                        .context(format!("failed to remove {:?}", state_path)));
                }
            }
        }

        debug!("cleared merge state");
        Ok(())
    }
}
