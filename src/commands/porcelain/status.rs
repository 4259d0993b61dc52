use crate::areas::repository::Repository;
use crate::artifacts::status::file_change::FileChangeType;
use crate::artifacts::status::status_info::StatusInfo;
use colored::Colorize;
use std::io::Write;

const LABEL_INDENT: &str = "        ";

impl Repository {
    /// Report the branch, any merge in progress and staged, unstaged and untracked files
    pub fn status(&self) -> anyhow::Result<()> {
        self.require_repository()?;

        let branch = self.refs().current_branch()?;
        writeln!(self.writer(), "On branch {}", branch)?;
        if self.refs().read_head()?.is_none() {
            writeln!(self.writer(), "\nNo commits yet")?;
        }

        let mut status = self.status_info()?;

        if self.merge_state().is_in_progress() {
            let staged = {
                let mut index = self.index();
                index.rehydrate()?;
                index.snapshot().clone()
            };
            let unresolved = self.unresolved_conflicts(&staged)?;

            // unmerged paths are reported on their own
            for path in &unresolved {
                status.index_changeset.remove(path);
                status.workspace_changeset.remove(path);
                status.untracked_files.remove(path);
            }
            self.print_merge_notice(&unresolved)?;
        }

        self.print_changes(&status)?;

        Ok(())
    }

    fn print_merge_notice(&self, unresolved: &[String]) -> anyhow::Result<()> {
        let mut writer = self.writer();

        if unresolved.is_empty() {
            writeln!(writer, "\nAll conflicts fixed but you are still merging.")?;
            writeln!(writer, "  (use \"twig commit\" to conclude merge)")?;
            return Ok(());
        }

        writeln!(writer, "\nYou have unmerged paths.")?;
        writeln!(writer, "  (fix conflicts and run \"twig commit\")")?;
        writeln!(writer, "  (use \"twig merge --abort\" to abort the merge)")?;
        writeln!(writer, "\nUnmerged paths:")?;
        for path in unresolved {
            writeln!(writer, "{}{}", LABEL_INDENT, format!("unmerged:   {path}").red())?;
        }

        Ok(())
    }

    fn print_changes(&self, status: &StatusInfo) -> anyhow::Result<()> {
        let mut writer = self.writer();

        if status.has_staged_changes() {
            writeln!(writer, "\nChanges to be committed:")?;
            for (path, change) in &status.index_changeset {
                writeln!(writer, "{}{}", FileChangeType::Index(*change), path.green())?;
            }
        }

        if status.has_unstaged_changes() {
            writeln!(writer, "\nChanges not staged for commit:")?;
            for (path, change) in &status.workspace_changeset {
                writeln!(writer, "{}{}", FileChangeType::Workspace(*change), path.red())?;
            }
        }

        if !status.untracked_files.is_empty() {
            writeln!(writer, "\nUntracked files:")?;
            for path in &status.untracked_files {
                writeln!(writer, "{}{}", LABEL_INDENT, path.red())?;
            }
        }

        if status.is_clean() && status.untracked_files.is_empty() {
            writeln!(writer, "nothing to commit, working tree clean")?;
        }

        Ok(())
    }
}
