use crate::areas::repository::Repository;
use crate::artifacts::branch::branch_name::BranchName;
use crate::errors::RepoError;
use colored::Colorize;
use std::io::Write;

impl Repository {
    /// List branches, marking the current one with `*`
    pub fn list_branches(&self) -> anyhow::Result<()> {
        self.require_repository()?;
        let current_branch = self.refs().current_branch()?;

        for branch in self.refs().list_branches()? {
            if branch == current_branch {
                writeln!(self.writer(), "* {}", branch.as_ref().green())?;
            } else {
                writeln!(self.writer(), "  {}", branch)?;
            }
        }

        Ok(())
    }

    /// Create `branch_name` at the current HEAD commit
    pub fn create_branch(&mut self, branch_name: &str) -> anyhow::Result<()> {
        self.require_repository()?;
        let branch_name = BranchName::try_parse(branch_name)?;

        let source_oid = match self.refs().read_head()? {
            Some(oid) => oid,
            None => {
                let current_branch = self.refs().current_branch()?;
                return Err(RepoError::UnbornBranch(current_branch.to_string()).into());
            }
        };

        self.refs().create_branch(&branch_name, source_oid)?;
        writeln!(self.writer(), "Created new branch {}", branch_name)?;

        Ok(())
    }

    pub fn delete_branch(&mut self, branch_name: &str) -> anyhow::Result<()> {
        self.require_repository()?;
        let branch_name = BranchName::try_parse(branch_name)?;

        if self.refs().is_current_branch(&branch_name)? {
            anyhow::bail!(
                "cannot delete branch '{}' which you are currently on",
                branch_name
            );
        }

        match self.refs().delete_branch(&branch_name)? {
            Some(oid) => writeln!(
                self.writer(),
                "Deleted branch {} (was {})",
                branch_name,
                oid.to_short_oid()
            )?,
            None => writeln!(self.writer(), "Deleted branch {}", branch_name)?,
        }

        Ok(())
    }
}
