//! Object identifier (SHA-1 hash)
//!
//! An object id is the 20-byte SHA-1 digest of an object's header and payload.
//! It is rendered as 40 lowercase hex characters wherever it is written as text
//! (refs, the index, commit headers) and as raw bytes inside tree entries.
//!
//! ## Storage
//!
//! Objects are stored in `.twig/objects/<first-byte-hex>/<remaining-19-bytes-hex>`

use crate::artifacts::objects::{OBJECT_ID_BYTES, OBJECT_ID_LENGTH};
use crate::errors::RepoError;
use std::io;
use std::path::PathBuf;

/// Object identifier (SHA-1 hash)
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct ObjectId([u8; OBJECT_ID_BYTES]);

impl ObjectId {
    pub fn from_bytes(bytes: [u8; OBJECT_ID_BYTES]) -> Self {
        Self(bytes)
    }

    /// Parse and validate an object ID from its hex form
    ///
    /// Surrounding whitespace is ignored so ref and index file contents can be
    /// passed in directly.
    pub fn try_parse(id: &str) -> anyhow::Result<Self> {
        let id = id.trim();
        if id.len() != OBJECT_ID_LENGTH {
            return Err(RepoError::InvalidObjectId(id.to_string()).into());
        }

        let mut bytes = [0u8; OBJECT_ID_BYTES];
        hex::decode_to_slice(id, &mut bytes)
            .map_err(|_| RepoError::InvalidObjectId(id.to_string()))?;

        Ok(Self(bytes))
    }

    pub fn as_bytes(&self) -> &[u8; OBJECT_ID_BYTES] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Write the object ID in binary format (20 bytes)
    ///
    /// Used when serializing tree entries.
    pub fn write_raw_to<W: io::Write>(&self, writer: &mut W) -> anyhow::Result<()> {
        writer.write_all(&self.0)?;
        Ok(())
    }

    /// Read an object ID from binary format (20 bytes)
    ///
    /// Fails with `UnexpectedEof` when fewer than 20 bytes remain.
    pub fn read_raw_from<R: io::Read + ?Sized>(reader: &mut R) -> io::Result<Self> {
        let mut bytes = [0u8; OBJECT_ID_BYTES];
        reader.read_exact(&mut bytes)?;
        Ok(Self(bytes))
    }

    /// Convert to file system path for object storage
    ///
    /// The first byte becomes the directory and the remaining bytes the file name,
    /// so `abc123...` becomes `ab/c123...`
    pub fn to_path(&self) -> PathBuf {
        let hex = self.to_hex();
        let (dir, file) = hex.split_at(2);
        PathBuf::from(dir).join(file)
    }

    /// First 7 hex characters (standard abbreviation)
    pub fn to_short_oid(&self) -> String {
        self.to_hex()[..7].to_string()
    }
}

impl std::fmt::Display for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl std::fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ObjectId({})", self.to_short_oid())
    }
}

impl std::str::FromStr for ObjectId {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_parse(s)
    }
}
