use crate::areas::repository::Repository;
use crate::artifacts::objects::object::ObjectBox;
use crate::artifacts::objects::object_id::ObjectId;
use std::io::Write;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatFileMode {
    /// Pretty-print the content
    Pretty,
    /// Print the object kind
    Type,
}

impl Repository {
    pub fn cat_file(&mut self, object_id: &str, mode: CatFileMode) -> anyhow::Result<()> {
        self.require_repository()?;
        let object_id = ObjectId::try_parse(object_id)?;

        match mode {
            CatFileMode::Type => {
                let object_type = self.database().get_object_type(&object_id)?;
                writeln!(self.writer(), "{}", object_type)?;
            }
            CatFileMode::Pretty => match self.database().parse_object(&object_id)? {
                // blob bytes go out untouched
                ObjectBox::Blob(blob) => self.writer().write_all(blob.content())?,
                object => {
                    let display = object.display();
                    write!(self.writer(), "{}", display)?;
                    if !display.ends_with('\n') {
                        writeln!(self.writer())?;
                    }
                }
            },
        }

        Ok(())
    }
}
