//! Commit object
//!
//! Commits represent snapshots of the repository at specific points in time.
//! They contain:
//! - A tree object ID (directory snapshot)
//! - Parent commit ID(s): none for a root commit, one normally, two for a merge
//!   (ours first, then theirs)
//! - Author and committer information
//! - Commit message
//!
//! ## Format
//!
//! ```text
//! commit <size>\0
//! tree <tree-sha>
//! parent <parent-sha>
//! author <name> <email> <timestamp> <timezone>
//! committer <name> <email> <timestamp> <timezone>
//!
//! <commit message>
//! ```

use crate::artifacts::objects::object::{Object, Packable, Unpackable, with_header};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use anyhow::Context;
use bytes::Bytes;
use chrono::SubsecRound;
use std::io::BufRead;

/// Author or committer information
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Author {
    name: String,
    email: String,
    timestamp: chrono::DateTime<chrono::FixedOffset>,
}

impl Author {
    /// Create a new author stamped with the current local time
    ///
    /// The timestamp is truncated to whole seconds, the precision of the
    /// stored author line.
    pub fn new(name: String, email: String) -> Self {
        Self::new_with_timestamp(name, email, chrono::Local::now().fixed_offset())
    }

    /// Create an author with a fixed timestamp, truncated to whole seconds
    ///
    /// # Arguments
    ///
    /// * `name` - display name, without `<` or `>`
    /// * `email` - address, without `<` or `>`
    /// * `timestamp` - authoring time and its UTC offset
    pub fn new_with_timestamp(
        name: String,
        email: String,
        timestamp: chrono::DateTime<chrono::FixedOffset>,
    ) -> Self {
        Author {
            name,
            email,
            timestamp: timestamp.trunc_subsecs(0),
        }
    }

    /// Check that a name or email survives the `name <email>` encoding
    pub fn validate_field(value: &str) -> anyhow::Result<()> {
        if value.contains(['<', '>', '\n']) {
            anyhow::bail!(
                "invalid identity '{}': '<', '>' and line breaks are not allowed",
                value.escape_debug()
            );
        }
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    /// "Name <email@example.com>"
    pub fn display_name(&self) -> String {
        format!("{} <{}>", self.name, self.email)
    }

    /// "Name <email> timestamp timezone", as stored in the commit header
    pub fn display(&self) -> String {
        format!(
            "{} <{}> {} {}",
            self.name,
            self.email,
            self.timestamp.timestamp(),
            self.timestamp.format("%z")
        )
    }

    /// Parse an author date as RFC 2822 or `%Y-%m-%d %H:%M:%S %z`
    pub fn parse_date(date: &str) -> Option<chrono::DateTime<chrono::FixedOffset>> {
        chrono::DateTime::parse_from_rfc2822(date)
            .or_else(|_| chrono::DateTime::parse_from_str(date, "%Y-%m-%d %H:%M:%S %z"))
            .ok()
    }

    /// "Mon Jan 1 12:34:56 2024 +0000"
    pub fn readable_timestamp(&self) -> String {
        self.timestamp
            .format("%a %b %-d %H:%M:%S %Y %z")
            .to_string()
    }

    pub fn timestamp(&self) -> chrono::DateTime<chrono::FixedOffset> {
        self.timestamp
    }
}

impl TryFrom<&str> for Author {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        // Split from the right: timezone, then timestamp, then "name <email>"
        let parts: Vec<&str> = value.rsplitn(3, ' ').collect();
        if parts.len() < 3 {
            anyhow::bail!("invalid author '{value}'");
        }

        let timezone = parts[0];
        let timestamp = parts[1]
            .parse::<i64>()
            .with_context(|| format!("invalid author timestamp '{}'", parts[1]))?;
        let name_email = parts[2];

        let email_start = name_email
            .find('<')
            .with_context(|| format!("invalid author '{value}': missing '<'"))?;
        let email_end = name_email
            .rfind('>')
            .filter(|&end| end > email_start)
            .with_context(|| format!("invalid author '{value}': missing '>'"))?;

        let name = name_email[..email_start].trim().to_string();
        let email = name_email[email_start + 1..email_end].to_string();

        let offset = parse_timezone(timezone)?;
        let timestamp = chrono::DateTime::from_timestamp(timestamp, 0)
            .context("author timestamp out of range")?
            .with_timezone(&offset);

        Ok(Author {
            name,
            email,
            timestamp,
        })
    }
}

/// Parse a `+hhmm`/`-hhmm` offset
fn parse_timezone(timezone: &str) -> anyhow::Result<chrono::FixedOffset> {
    let invalid = || anyhow::anyhow!("invalid timezone '{timezone}'");

    let (sign, digits) = match timezone.split_at_checked(1) {
        Some(("+", digits)) => (1, digits),
        Some(("-", digits)) => (-1, digits),
        _ => return Err(invalid()),
    };
    if digits.len() != 4 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid());
    }

    let hours: i32 = digits[..2].parse().map_err(|_| invalid())?;
    let minutes: i32 = digits[2..].parse().map_err(|_| invalid())?;

    chrono::FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60)).ok_or_else(invalid)
}

/// Commit object
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Commit {
    parents: Vec<ObjectId>,
    tree_oid: ObjectId,
    author: Author,
    committer: Author,
    message: String,
}

impl Commit {
    /// Create a new commit; the author doubles as committer
    pub fn new(parents: Vec<ObjectId>, tree_oid: ObjectId, author: Author, message: String) -> Self {
        Commit {
            parents,
            tree_oid,
            committer: author.clone(),
            author,
            message,
        }
    }

    pub fn with_committer(mut self, committer: Author) -> Self {
        self.committer = committer;
        self
    }

    /// First line of the message
    pub fn short_message(&self) -> String {
        self.message.lines().next().unwrap_or("").to_string()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn tree_oid(&self) -> &ObjectId {
        &self.tree_oid
    }

    pub fn parents(&self) -> &[ObjectId] {
        &self.parents
    }

    /// First parent; the only one followed by history walks
    pub fn parent(&self) -> Option<&ObjectId> {
        self.parents.first()
    }

    pub fn is_merge(&self) -> bool {
        self.parents.len() > 1
    }

    pub fn author(&self) -> &Author {
        &self.author
    }

    pub fn committer(&self) -> &Author {
        &self.committer
    }

    pub fn timestamp(&self) -> chrono::DateTime<chrono::FixedOffset> {
        self.author.timestamp()
    }

    fn payload(&self) -> String {
        let mut lines = vec![];

        lines.push(format!("tree {}", self.tree_oid));
        for parent in &self.parents {
            lines.push(format!("parent {}", parent));
        }
        lines.push(format!("author {}", self.author.display()));
        lines.push(format!("committer {}", self.committer.display()));
        lines.push(String::new());
        lines.push(self.message.to_string());

        let mut payload = lines.join("\n");
        payload.push('\n');
        payload
    }
}

impl Packable for Commit {
    fn serialize(&self) -> anyhow::Result<Bytes> {
        Ok(with_header(self.object_type(), self.payload().as_bytes()))
    }
}

impl Unpackable for Commit {
    fn deserialize(mut reader: impl BufRead) -> anyhow::Result<Self> {
        let mut content = String::new();
        reader
            .read_to_string(&mut content)
            .context("commit payload is not valid UTF-8")?;

        let (headers, message) = content
            .split_once("\n\n")
            .context("missing blank line before commit message")?;
        let mut lines = headers.lines().peekable();

        let tree_oid = lines
            .next()
            .and_then(|line| line.strip_prefix("tree "))
            .context("missing tree line")?;
        let tree_oid = ObjectId::try_parse(tree_oid)?;

        let mut parents = Vec::new();
        while let Some(parent) = lines
            .peek()
            .copied()
            .and_then(|line| line.strip_prefix("parent "))
        {
            parents.push(ObjectId::try_parse(parent)?);
            lines.next();
        }

        let author = lines
            .next()
            .and_then(|line| line.strip_prefix("author "))
            .context("missing author line")?;
        let author = Author::try_from(author)?;

        let committer = lines
            .next()
            .and_then(|line| line.strip_prefix("committer "))
            .context("missing committer line")?;
        let committer = Author::try_from(committer)?;

        if let Some(extra) = lines.next() {
            anyhow::bail!("unexpected commit header line '{extra}'");
        }

        let message = message.strip_suffix('\n').unwrap_or(message).to_string();

        Ok(Self::new(parents, tree_oid, author, message).with_committer(committer))
    }
}

impl Object for Commit {
    fn object_type(&self) -> ObjectType {
        ObjectType::Commit
    }

    fn display(&self) -> String {
        self.payload()
    }
}
