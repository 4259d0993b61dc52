use crate::areas::repository::Repository;
use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::RepoError;
use colored::Colorize;
use std::io::Write;

impl Repository {
    /// Print history from HEAD, following first parents only
    pub fn log(&self) -> anyhow::Result<()> {
        self.require_repository()?;

        let Some(head_oid) = self.refs().read_head()? else {
            let branch = self.refs().current_branch()?;
            return Err(RepoError::UnbornBranch(branch.to_string()).into());
        };

        let mut curr_commit_oid = Some(head_oid);
        let mut first = true;

        while let Some(commit_oid) = curr_commit_oid {
            let commit = self.database().parse_object_as_commit(&commit_oid)?;

            if !first {
                writeln!(self.writer())?;
            }
            self.show_commit_medium(&commit_oid, &commit)?;
            first = false;

            curr_commit_oid = commit.parent().copied();
        }

        Ok(())
    }

    fn show_commit_medium(&self, commit_oid: &ObjectId, commit: &Commit) -> anyhow::Result<()> {
        writeln!(
            self.writer(),
            "{}",
            format!("commit {}", commit_oid).yellow()
        )?;
        if commit.is_merge() {
            let parents = commit
                .parents()
                .iter()
                .map(ObjectId::to_short_oid)
                .collect::<Vec<_>>();
            writeln!(self.writer(), "Merge: {}", parents.join(" "))?;
        }
        writeln!(self.writer(), "Author: {}", commit.author().display_name())?;
        writeln!(
            self.writer(),
            "Date:   {}",
            commit.author().readable_timestamp()
        )?;
        writeln!(self.writer())?;
        for message_line in commit.message().lines() {
            writeln!(self.writer(), "    {}", message_line)?;
        }

        Ok(())
    }
}
