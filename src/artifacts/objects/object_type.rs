use crate::errors::RepoError;

/// Kind discriminant carried in every object header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectType {
    Blob,
    Tree,
    Commit,
}

/// Parsed `"<kind> <size>\0"` object header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObjectHeader {
    pub object_type: ObjectType,
    pub size: usize,
}

impl ObjectType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectType::Blob => "blob",
            ObjectType::Tree => "tree",
            ObjectType::Commit => "commit",
        }
    }

    pub fn header(&self, size: usize) -> String {
        format!("{} {}\0", self.as_str(), size)
    }

    /// Split raw (decompressed) object bytes into its header and payload
    ///
    /// The declared size must match the payload length exactly.
    pub fn parse_header<'d>(oid: &str, data: &'d [u8]) -> anyhow::Result<(ObjectHeader, &'d [u8])> {
        let terminator = data
            .iter()
            .position(|&byte| byte == 0)
            .ok_or_else(|| RepoError::corrupt(oid, "missing header terminator"))?;

        let header = std::str::from_utf8(&data[..terminator])
            .map_err(|_| RepoError::corrupt(oid, "header is not valid UTF-8"))?;
        let (kind, size) = header
            .split_once(' ')
            .ok_or_else(|| RepoError::corrupt(oid, format!("invalid header '{header}'")))?;

        let object_type = ObjectType::try_from(kind)?;
        let size = size
            .parse::<usize>()
            .map_err(|_| RepoError::corrupt(oid, format!("invalid object size '{size}'")))?;

        let payload = &data[terminator + 1..];
        if payload.len() != size {
            return Err(RepoError::corrupt(
                oid,
                format!("declared size {size} but payload has {} bytes", payload.len()),
            )
            .into());
        }

        Ok((ObjectHeader { object_type, size }, payload))
    }
}

impl TryFrom<&str> for ObjectType {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> anyhow::Result<Self> {
        match value {
            "blob" => Ok(ObjectType::Blob),
            "tree" => Ok(ObjectType::Tree),
            "commit" => Ok(ObjectType::Commit),
            _ => Err(RepoError::UnknownKind(value.to_string()).into()),
        }
    }
}

impl std::fmt::Display for ObjectType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
