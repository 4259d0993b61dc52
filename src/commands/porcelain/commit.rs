use crate::areas::repository::Repository;
use crate::artifacts::tree::builder::TreeBuilder;
use std::io::Write;

impl Repository {
    pub fn commit(&mut self, message: &str) -> anyhow::Result<()> {
        self.require_repository()?;
        if message.trim().is_empty() {
            anyhow::bail!("aborting commit due to empty commit message");
        }

        let snapshot = {
            let mut index = self.index();
            index.rehydrate()?;
            index.snapshot().clone()
        };
        self.ensure_conflicts_resolved(&snapshot)?;

        let tree_oid = TreeBuilder::new(self.database()).build(&snapshot)?;

        let branch = self.refs().current_branch()?;
        let parent = self.refs().read_head()?;
        let merge_head = self.merge_state().merge_head()?;
        let parents = parent.into_iter().chain(merge_head).collect::<Vec<_>>();

        let (commit_oid, commit) = self.write_commit(tree_oid, parents, message)?;
        self.refs().update_head(commit_oid)?;

        if merge_head.is_some() {
            self.merge_state().clear()?;
        }

        let is_root = match parent {
            Some(_) => "",
            None => " (root-commit)",
        };
        writeln!(
            self.writer(),
            "[{}{} {}] {}",
            branch,
            is_root,
            commit_oid.to_short_oid(),
            commit.short_message()
        )?;

        Ok(())
    }
}
