use crate::areas::repository::Repository;
use std::io::Write;

impl Repository {
    /// Unstage the entries at or below `pathspec`, deleting them from disk unless `cached`
    pub fn rm(&mut self, pathspec: &str, cached: bool) -> anyhow::Result<()> {
        self.require_repository()?;
        let path = self.workspace().normalize_pathspec(pathspec)?;

        let mut index = self.index();
        index.rehydrate()?;

        let staged = index.entries_under_path(&path);
        if staged.is_empty() {
            anyhow::bail!("pathspec '{}' did not match any staged files", pathspec);
        }

        for staged_path in &staged {
            index.remove(staged_path);
            if !cached {
                self.workspace().remove_file(staged_path)?;
            }
        }
        index.write_updates()?;

        for staged_path in staged {
            writeln!(self.writer(), "Removed {}", staged_path)?;
        }

        Ok(())
    }
}
