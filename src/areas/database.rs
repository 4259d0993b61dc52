use crate::artifacts::objects::blob::Blob;
use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::object::{Object, ObjectBox, Unpackable};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::artifacts::objects::tree::Tree;
use crate::errors::RepoError;
use anyhow::Context;
use bytes::Bytes;
use fake::rand;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

/// Content-addressed object store rooted at `.twig/objects`
#[derive(Debug)]
pub struct Database {
    path: Box<Path>,
}

impl Database {
    pub fn new(path: Box<Path>) -> Self {
        Database { path }
    }

    pub fn objects_path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self, object_id: &ObjectId) -> bool {
        self.path.join(object_id.to_path()).exists()
    }

    /// Hash an object without writing it
    pub fn hash_object(&self, object: &impl Object) -> anyhow::Result<ObjectId> {
        object.object_id()
    }

    /// Persist an object and return its id
    ///
    /// Storing the same content twice yields the same id; the second write is skipped.
    ///
    /// # Arguments
    ///
    /// * `object` - blob, tree or commit to store
    ///
    /// # Returns
    ///
    /// The object id, derived from the header and payload
    pub fn store(&self, object: &impl Object) -> anyhow::Result<ObjectId> {
        let object_content = object.serialize()?;
        let object_id = crate::artifacts::objects::object::hash_bytes(&object_content);
        let object_path = self.path.join(object_id.to_path());

        // write the object to disk unless it already exists
        if object_path.exists() {
            trace!(oid = %object_id, "object already stored");
            return Ok(object_id);
        }

        std::fs::create_dir_all(
            object_path
                .parent()
                .context(format!("Invalid object path {}", object_path.display()))?,
        )
        .context(format!(
            "Unable to create object directory {}",
            object_path.display()
        ))?;

        self.write_object(object_path, object_content)?;
        debug!(oid = %object_id, kind = %object.object_type(), "stored object");

        Ok(object_id)
    }

    /// Load and decode an object of any kind
    ///
    /// # Returns
    ///
    /// The decoded object, or `ObjectNotFound` / `ObjectCorrupt` /
    /// `UnknownKind` when the file is missing or does not decode
    pub fn parse_object(&self, object_id: &ObjectId) -> anyhow::Result<ObjectBox> {
        let (object_type, payload) = self.parse_object_as_bytes(object_id)?;
        let corrupt = |err: anyhow::Error| RepoError::corrupt(object_id, format!("{err:#}"));

        let object = match object_type {
            ObjectType::Blob => ObjectBox::Blob(Box::new(Blob::deserialize(&payload[..])?)),
            ObjectType::Tree => {
                ObjectBox::Tree(Box::new(Tree::deserialize(&payload[..]).map_err(corrupt)?))
            }
            ObjectType::Commit => ObjectBox::Commit(Box::new(
                Commit::deserialize(&payload[..]).map_err(corrupt)?,
            )),
        };

        Ok(object)
    }

    pub fn parse_object_as_blob(&self, object_id: &ObjectId) -> anyhow::Result<Blob> {
        match self.parse_object(object_id)? {
            ObjectBox::Blob(blob) => Ok(*blob),
            other => Err(Self::unexpected_kind(object_id, ObjectType::Blob, &other)),
        }
    }

    pub fn parse_object_as_tree(&self, object_id: &ObjectId) -> anyhow::Result<Tree> {
        match self.parse_object(object_id)? {
            ObjectBox::Tree(tree) => Ok(*tree),
            other => Err(Self::unexpected_kind(object_id, ObjectType::Tree, &other)),
        }
    }

    pub fn parse_object_as_commit(&self, object_id: &ObjectId) -> anyhow::Result<Commit> {
        match self.parse_object(object_id)? {
            ObjectBox::Commit(commit) => Ok(*commit),
            other => Err(Self::unexpected_kind(object_id, ObjectType::Commit, &other)),
        }
    }

    /// Raw blob content, the reader handed to the merge engine
    pub fn read_blob(&self, object_id: &ObjectId) -> anyhow::Result<Bytes> {
        Ok(self.parse_object_as_blob(object_id)?.into_content())
    }

    pub fn get_object_type(&self, object_id: &ObjectId) -> anyhow::Result<ObjectType> {
        let (object_type, _) = self.parse_object_as_bytes(object_id)?;
        Ok(object_type)
    }

    fn unexpected_kind(object_id: &ObjectId, expected: ObjectType, actual: &ObjectBox) -> anyhow::Error {
        RepoError::UnexpectedKind {
            oid: *object_id,
            expected: expected.to_string(),
            actual: actual.object_type().to_string(),
        }
        .into()
    }

    fn parse_object_as_bytes(&self, object_id: &ObjectId) -> anyhow::Result<(ObjectType, Bytes)> {
        let object_path = self.path.join(object_id.to_path());
        let object_content = self.read_object(object_id, object_path)?;

        let (header, payload) = ObjectType::parse_header(&object_id.to_hex(), &object_content)?;
        trace!(oid = %object_id, kind = %header.object_type, size = header.size, "loaded object");

        Ok((header.object_type, object_content.slice_ref(payload)))
    }

    fn read_object(&self, object_id: &ObjectId, object_path: PathBuf) -> anyhow::Result<Bytes> {
        let object_content = match std::fs::read(&object_path) {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Err(RepoError::ObjectNotFound(*object_id).into());
            }
            Err(err) => {
                return Err(anyhow::Error::new(err).context(format!(
                    "Unable to read object file {}",
                    object_path.display()
                )));
            }
        };

        Self::decompress(object_content.into())
            .map_err(|err| RepoError::corrupt(object_id, format!("{err:#}")).into())
    }

    fn write_object(&self, object_path: PathBuf, object_content: Bytes) -> anyhow::Result<()> {
        let object_dir = object_path
            .parent()
            .context(format!("Invalid object path {}", object_path.display()))?;
        let temp_object_path = object_dir.join(Self::generate_temp_name());

        let object_content = Self::compress(object_content)?;

        let mut file = std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&temp_object_path)
            .context(format!(
                "Unable to open object file {}",
                temp_object_path.display()
            ))?;

        file.write_all(&object_content).context(format!(
            "Unable to write object file {}",
            temp_object_path.display()
        ))?;

        // rename the temp file to the object file to make it atomic
        std::fs::rename(&temp_object_path, &object_path).context(format!(
            "Unable to rename object file to {}",
            object_path.display()
        ))?;

        Ok(())
    }

    fn compress(data: Bytes) -> anyhow::Result<Bytes> {
        let mut encoder =
            flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::default());
        encoder
            .write_all(&data)
            .context("Unable to compress object content")?;

        encoder
            .finish()
            .map(|compressed_content| compressed_content.into())
            .context("Unable to finish compressing object content")
    }

    fn decompress(data: Bytes) -> anyhow::Result<Bytes> {
        let mut decoder = flate2::read::ZlibDecoder::new(&*data);
        let mut decompressed_content = Vec::new();
        decoder
            .read_to_end(&mut decompressed_content)
            .context("Unable to decompress object content")?;

        Ok(decompressed_content.into())
    }

    fn generate_temp_name() -> String {
        format!("tmp-obj-{}", rand::random::<u32>())
    }
}
