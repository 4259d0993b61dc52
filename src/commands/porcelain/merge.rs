use crate::areas::repository::Repository;
use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::merge::outcome::MergeOutcome;
use crate::errors::RepoError;
use colored::Colorize;
use std::io::Write;

impl Repository {
    /// Merge branch `target` into the current branch
    pub fn merge(&mut self, target: &str) -> anyhow::Result<()> {
        self.require_repository()?;
        if self.merge_state().is_in_progress() {
            return Err(RepoError::MergeInProgress.into());
        }
        self.ensure_clean_working_tree("merge")?;

        let target_branch = BranchName::try_parse(target)?;
        let target_oid = self
            .refs()
            .read_ref(&target_branch)?
            .ok_or_else(|| RepoError::UnbornBranch(target_branch.to_string()))?;

        let current_branch = self.refs().current_branch()?;
        let current_oid = self
            .refs()
            .read_head()?
            .ok_or_else(|| RepoError::UnbornBranch(current_branch.to_string()))?;

        match self.merge_commits(&target_oid, &current_oid, target_branch.as_ref())? {
            MergeOutcome::UpToDate => {
                writeln!(self.writer(), "Already up to date.")?;
            }
            MergeOutcome::FastForward { target } => {
                writeln!(
                    self.writer(),
                    "Updating {}..{}",
                    current_oid.to_short_oid(),
                    target.to_short_oid()
                )?;
                writeln!(self.writer(), "Fast-forward")?;
            }
            MergeOutcome::Merged { commit } => {
                writeln!(
                    self.writer(),
                    "Merged {} into {}, commit {}",
                    target_branch,
                    current_branch,
                    commit.to_short_oid()
                )?;
            }
            MergeOutcome::Conflicted { paths } => {
                for path in paths {
                    writeln!(self.writer(), "{} {}", "CONFLICT:".red(), path)?;
                }
                writeln!(
                    self.writer(),
                    "Automatic merge failed; fix conflicts and then commit the result."
                )?;
            }
        }

        Ok(())
    }

    /// Restore HEAD's tree and forget a conflicted merge
    pub fn merge_abort(&mut self) -> anyhow::Result<()> {
        self.require_repository()?;
        if !self.merge_state().is_in_progress() {
            anyhow::bail!("there is no merge to abort");
        }

        let current_branch = self.refs().current_branch()?;
        let head_oid = self
            .refs()
            .read_head()?
            .ok_or_else(|| RepoError::UnbornBranch(current_branch.to_string()))?;

        let staged = {
            let mut index = self.index();
            index.rehydrate()?;
            index.snapshot().clone()
        };
        let head_snapshot = self.reconcile_to(&staged, &head_oid)?;
        self.discard_merge(&head_snapshot)?;

        writeln!(self.writer(), "Merge aborted")?;

        Ok(())
    }
}
