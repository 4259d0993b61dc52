use crate::areas::repository::Repository;
use crate::artifacts::branch::branch_name::BranchName;
use crate::errors::RepoError;
use std::io::Write;

impl Repository {
    /// Switch the working tree, index and HEAD to `target`
    pub fn checkout(&mut self, target: &str) -> anyhow::Result<()> {
        self.require_repository()?;
        if self.merge_state().is_in_progress() {
            return Err(RepoError::MergeInProgress.into());
        }
        self.ensure_clean_working_tree("switch branches")?;

        let target_branch = BranchName::try_parse(target)?;
        if self.refs().is_current_branch(&target_branch)? {
            writeln!(self.writer(), "Already on '{}'", target_branch)?;
            return Ok(());
        }

        let target_oid = self
            .refs()
            .read_ref(&target_branch)?
            .ok_or_else(|| RepoError::UnbornBranch(target_branch.to_string()))?;

        let target_snapshot = self.commit_snapshot(&target_oid)?;
        let status = self.status_info()?;
        if let Some(path) = status
            .untracked_files
            .iter()
            .find(|path| target_snapshot.contains(path))
        {
            anyhow::bail!(
                "untracked working tree file '{}' would be overwritten by checkout",
                path
            );
        }

        let current_snapshot = self.head_snapshot()?;
        self.reconcile_to(&current_snapshot, &target_oid)?;
        self.refs().set_head(&target_branch)?;

        writeln!(self.writer(), "Switched to branch '{}'", target_branch)?;

        Ok(())
    }
}
