use crate::areas::repository::Repository;
use crate::artifacts::index::snapshot::IndexSnapshot;
use crate::artifacts::objects::object_id::ObjectId;
use std::io::Write;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResetMode {
    /// Move the branch only
    Soft,
    /// Move the branch and reset the index
    #[default]
    Mixed,
    /// Move the branch and reset both the index and the working tree
    Hard,
}

impl Repository {
    pub fn reset(&mut self, commit: &str, mode: ResetMode) -> anyhow::Result<()> {
        self.require_repository()?;

        let target_oid = ObjectId::try_parse(commit)?;
        let target = self.database().parse_object_as_commit(&target_oid)?;

        match mode {
            ResetMode::Soft => {}
            ResetMode::Mixed => {
                let target_snapshot = self.commit_snapshot(&target_oid)?;
                let mut index = self.index();
                index.replace(target_snapshot);
                index.write_updates()?;
                drop(index);

                self.merge_state().clear()?;
            }
            ResetMode::Hard => {
                // everything HEAD or the index tracks is subject to pruning
                let head_snapshot = self.head_snapshot()?;
                let tracked = {
                    let mut index = self.index();
                    index.rehydrate()?;
                    index
                        .snapshot()
                        .iter()
                        .chain(head_snapshot.iter())
                        .map(|(path, oid)| (path.clone(), *oid))
                        .collect::<IndexSnapshot>()
                };

                let target_snapshot = self.reconcile_to(&tracked, &target_oid)?;
                self.discard_merge(&target_snapshot)?;
            }
        }

        self.refs().update_head(target_oid)?;
        debug!(commit = %target_oid, ?mode, "reset branch");

        writeln!(
            self.writer(),
            "HEAD is now at {} {}",
            target_oid.to_short_oid(),
            target.short_message()
        )?;

        Ok(())
    }
}
