use crate::areas::repository::Repository;
use crate::artifacts::objects::object::Object;
use std::io::Write;

impl Repository {
    /// Print the blob id of `file`, storing the blob when `write` is set
    pub fn hash_object(&mut self, file: &str, write: bool) -> anyhow::Result<()> {
        let path = self.workspace().normalize_pathspec(file)?;
        let blob = self.workspace().parse_blob(&path)?;

        let object_id = if write {
            self.require_repository()?;
            self.database().store(&blob)?
        } else {
            blob.object_id()?
        };

        writeln!(self.writer(), "{}", object_id)?;

        Ok(())
    }
}
