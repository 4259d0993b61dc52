use crate::artifacts::objects::blob::Blob;
use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::artifacts::objects::tree::Tree;
use anyhow::Result;
use bytes::Bytes;
use sha1::{Digest, Sha1};
use std::io::BufRead;
use std::path::PathBuf;

/// Encodes an object as `<kind> <size>\0<payload>`
pub trait Packable {
    fn serialize(&self) -> Result<Bytes>;
}

/// Decodes an object payload (the header has already been consumed)
pub trait Unpackable {
    fn deserialize(reader: impl BufRead) -> Result<Self>
    where
        Self: Sized;
}

pub trait Object: Packable {
    fn object_type(&self) -> ObjectType;

    fn display(&self) -> String;

    fn object_id(&self) -> Result<ObjectId> {
        let content = self.serialize()?;
        Ok(hash_bytes(&content))
    }

    fn object_path(&self) -> Result<PathBuf> {
        Ok(self.object_id()?.to_path())
    }
}

/// SHA-1 over a fully serialized object (header included)
pub fn hash_bytes(content: &[u8]) -> ObjectId {
    let mut hasher = Sha1::new();
    hasher.update(content);
    ObjectId::from_bytes(hasher.finalize().into())
}

/// Prepend the object header to a payload
pub fn with_header(object_type: ObjectType, payload: &[u8]) -> Bytes {
    let header = object_type.header(payload.len());
    let mut object_bytes = Vec::with_capacity(header.len() + payload.len());
    object_bytes.extend_from_slice(header.as_bytes());
    object_bytes.extend_from_slice(payload);

    Bytes::from(object_bytes)
}

/// A decoded object of any kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObjectBox {
    Blob(Box<Blob>),
    Tree(Box<Tree>),
    Commit(Box<Commit>),
}

impl ObjectBox {
    pub fn object_type(&self) -> ObjectType {
        match self {
            ObjectBox::Blob(_) => ObjectType::Blob,
            ObjectBox::Tree(_) => ObjectType::Tree,
            ObjectBox::Commit(_) => ObjectType::Commit,
        }
    }

    pub fn display(&self) -> String {
        match self {
            ObjectBox::Blob(blob) => blob.display(),
            ObjectBox::Tree(tree) => tree.display(),
            ObjectBox::Commit(commit) => commit.display(),
        }
    }
}
