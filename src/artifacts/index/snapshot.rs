//! Flat path → blob-hash mapping
//!
//! A snapshot is the in-memory form of the staging index and of any tree expanded
//! into paths. Paths are repository-relative and `/`-separated.
//!
//! ## Serialized form
//!
//! One `path|hex-hash` line per entry, sorted by path. Parsing is strict: every
//! line must split into exactly two non-empty parts and carry a valid hash.

use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::RepoError;
use std::collections::BTreeMap;

const FIELD_SEPARATOR: char = '|';

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexSnapshot {
    entries: BTreeMap<String, ObjectId>,
}

impl IndexSnapshot {
    pub fn get(&self, path: &str) -> Option<&ObjectId> {
        self.entries.get(path)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.entries.contains_key(path)
    }

    pub fn insert(&mut self, path: impl Into<String>, oid: ObjectId) -> Option<ObjectId> {
        self.entries.insert(path.into(), oid)
    }

    pub fn remove(&mut self, path: &str) -> Option<ObjectId> {
        self.entries.remove(path)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ObjectId)> {
        self.entries.iter()
    }

    pub fn paths(&self) -> impl Iterator<Item = &String> {
        self.entries.keys()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Paths at or below `prefix` (`.` or an empty prefix selects everything)
    pub fn paths_under(&self, prefix: &str) -> Vec<String> {
        let prefix = prefix.trim_end_matches('/');
        self.entries
            .keys()
            .filter(|path| {
                prefix.is_empty()
                    || prefix == "."
                    || path.as_str() == prefix
                    || path
                        .strip_prefix(prefix)
                        .is_some_and(|rest| rest.starts_with('/'))
            })
            .cloned()
            .collect()
    }

    /// Check that `path` can be written as an index line
    ///
    /// # Arguments
    ///
    /// * `path` - repository-relative path about to be staged
    ///
    /// # Returns
    ///
    /// An error naming the path when it is empty or contains the field
    /// separator or a line break, since such a line would not parse back.
    pub fn validate_path(path: &str) -> anyhow::Result<()> {
        if path.is_empty() {
            anyhow::bail!("cannot stage an empty path");
        }
        if path.contains([FIELD_SEPARATOR, '\n', '\r']) {
            anyhow::bail!(
                "cannot stage '{}': paths may not contain '{}' or line breaks",
                path.escape_debug(),
                FIELD_SEPARATOR
            );
        }
        Ok(())
    }

    /// Parse the serialized form
    pub fn parse(content: &str) -> anyhow::Result<Self> {
        let mut snapshot = Self::default();

        for (line_number, line) in content.lines().enumerate() {
            let malformed = || RepoError::IndexParse {
                line_number: line_number + 1,
                line: line.to_string(),
            };

            let mut fields = line.split(FIELD_SEPARATOR);
            let (Some(path), Some(hash), None) = (fields.next(), fields.next(), fields.next())
            else {
                return Err(malformed().into());
            };
            if path.is_empty() || hash.is_empty() {
                return Err(malformed().into());
            }

            let oid = ObjectId::try_parse(hash).map_err(|_| malformed())?;
            snapshot.insert(path, oid);
        }

        Ok(snapshot)
    }

    /// Serialize to `path|hash` lines, newline-terminated
    pub fn serialize(&self) -> String {
        self.entries
            .iter()
            .map(|(path, oid)| format!("{path}{FIELD_SEPARATOR}{oid}\n"))
            .collect()
    }
}

impl FromIterator<(String, ObjectId)> for IndexSnapshot {
    fn from_iter<I: IntoIterator<Item = (String, ObjectId)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl<'s> IntoIterator for &'s IndexSnapshot {
    type Item = (&'s String, &'s ObjectId);
    type IntoIter = std::collections::btree_map::Iter<'s, String, ObjectId>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl IntoIterator for IndexSnapshot {
    type Item = (String, ObjectId);
    type IntoIter = std::collections::btree_map::IntoIter<String, ObjectId>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    const H1: &str = "e69de29bb2d1d6434b8b29ae775ad8c2e48c5391";
    const H2: &str = "ce013625030ba8dba906f756967f9e9ca394464a";

    #[test]
    fn parses_entries_in_any_order_and_serializes_sorted() {
        let content = format!("src/main.rs|{H2}\nREADME|{H1}\n");

        let snapshot = IndexSnapshot::parse(&content).unwrap();

        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot.get("src/main.rs").unwrap().to_string(), H2);
        assert_eq!(snapshot.serialize(), format!("README|{H1}\nsrc/main.rs|{H2}\n"));
    }

    #[test]
    fn empty_content_is_an_empty_snapshot() {
        assert!(IndexSnapshot::parse("").unwrap().is_empty());
    }

    #[rstest]
    #[case::no_separator(format!("README{H1}"), 1)]
    #[case::empty_path(format!("|{H1}"), 1)]
    #[case::empty_hash("README|".to_string(), 1)]
    #[case::extra_field(format!("a|{H1}|x"), 1)]
    #[case::bad_hash("a|nothex".to_string(), 1)]
    #[case::blank_line(format!("a|{H1}\n\nb|{H1}"), 2)]
    fn malformed_lines_are_rejected(#[case] content: String, #[case] expected_line: usize) {
        let err = IndexSnapshot::parse(&content).unwrap_err();

        match err.downcast_ref::<RepoError>() {
            Some(RepoError::IndexParse { line_number, .. }) => {
                assert_eq!(*line_number, expected_line)
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[rstest]
    #[case::separator("a|b.txt")]
    #[case::newline("a\nb.txt")]
    #[case::carriage_return("a\r")]
    #[case::empty("")]
    fn unwritable_paths_are_rejected(#[case] path: &str) {
        assert!(IndexSnapshot::validate_path(path).is_err());
    }

    #[test]
    fn ordinary_paths_are_accepted() {
        IndexSnapshot::validate_path("src/with space/and-dash_1.rs").unwrap();
    }

    #[test]
    fn selects_paths_under_a_directory() {
        let oid = ObjectId::try_parse(H1).unwrap();
        let snapshot: IndexSnapshot = ["a/b.txt", "a/c/d.txt", "ab.txt", "e.txt"]
            .into_iter()
            .map(|path| (path.to_string(), oid))
            .collect();

        assert_eq!(snapshot.paths_under("a"), vec!["a/b.txt", "a/c/d.txt"]);
        assert_eq!(snapshot.paths_under("e.txt"), vec!["e.txt"]);
        assert_eq!(snapshot.paths_under(".").len(), 4);
    }
}
