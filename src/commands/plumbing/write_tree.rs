use crate::areas::repository::Repository;
use crate::artifacts::tree::builder::TreeBuilder;
use std::io::Write;

impl Repository {
    /// Store the staged snapshot as a tree and print its id
    pub fn write_tree(&mut self) -> anyhow::Result<()> {
        self.require_repository()?;

        let tree_oid = {
            let mut index = self.index();
            index.rehydrate()?;
            TreeBuilder::new(self.database()).build(index.snapshot())?
        };

        writeln!(self.writer(), "{}", tree_oid)?;

        Ok(())
    }
}
