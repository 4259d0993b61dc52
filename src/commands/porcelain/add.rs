use crate::areas::repository::Repository;
use crate::artifacts::index::snapshot::IndexSnapshot;
use tracing::debug;

impl Repository {
    /// Stage every file at or below each pathspec
    ///
    /// Staged files under a pathspec that are gone from disk are unstaged. A
    /// pathspec matching neither a file on disk nor a staged entry fails the
    /// whole command before the index is written.
    pub fn add(&mut self, pathspecs: &[String]) -> anyhow::Result<()> {
        self.require_repository()?;

        let mut index = self.index();
        index.rehydrate()?;

        for pathspec in pathspecs {
            let path = self.workspace().normalize_pathspec(pathspec)?;
            let files = self.workspace().list_files(Some(&path))?;
            let vanished = index
                .entries_under_path(&path)
                .into_iter()
                .filter(|staged| !self.workspace().is_file(staged))
                .collect::<Vec<_>>();

            if files.is_empty() && vanished.is_empty() {
                anyhow::bail!("pathspec '{}' did not match any files", pathspec);
            }

            for staged in vanished {
                debug!(path = %staged, "unstaging vanished file");
                index.remove(&staged);
            }

            for file in files {
                IndexSnapshot::validate_path(&file)?;
                let blob = self.workspace().parse_blob(&file)?;
                let blob_id = self.database().store(&blob)?;
                index.add(&file, blob_id)?;
            }
        }

        index.write_updates()?;

        Ok(())
    }
}
