//! Repository configuration
//!
//! `.twig/config` is a list of `key=value` lines with dotted keys such as
//! `user.name`. Blank lines and lines starting with `#` are ignored.
//!
//! Commit identity comes from `user.name` / `user.email`; the environment
//! variables `TWIG_AUTHOR_NAME`, `TWIG_AUTHOR_EMAIL` and `TWIG_AUTHOR_DATE`
//! take precedence.

use crate::artifacts::objects::commit::Author;
use crate::errors::RepoError;
use anyhow::Context;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

pub const AUTHOR_NAME_ENV: &str = "TWIG_AUTHOR_NAME";
pub const AUTHOR_EMAIL_ENV: &str = "TWIG_AUTHOR_EMAIL";
pub const AUTHOR_DATE_ENV: &str = "TWIG_AUTHOR_DATE";

pub const USER_NAME_KEY: &str = "user.name";
pub const USER_EMAIL_KEY: &str = "user.email";

#[derive(Debug)]
pub struct Config {
    /// Path to the config file (`.twig/config`)
    path: Box<Path>,
}

impl Config {
    pub fn new(path: Box<Path>) -> Self {
        Config { path }
    }

    pub fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        Ok(self.load()?.remove(key))
    }

    /// Set `key`, keeping every other entry
    ///
    /// # Arguments
    ///
    /// * `key` - dotted `<section>.<name>` key
    /// * `value` - single-line value; `user.name` and `user.email` also may
    ///   not contain `<` or `>`
    pub fn set(&self, key: &str, value: &str) -> anyhow::Result<()> {
        Self::validate_key(key)?;
        if value.contains('\n') {
            anyhow::bail!("config values cannot span lines");
        }
        if key == USER_NAME_KEY || key == USER_EMAIL_KEY {
            Author::validate_field(value).with_context(|| format!("cannot set {key}"))?;
        }

        let mut entries = self.load()?;
        entries.insert(key.to_string(), value.to_string());

        let content = entries
            .iter()
            .map(|(key, value)| format!("{key}={value}\n"))
            .collect::<String>();
        std::fs::write(&self.path, content)
            .with_context(|| format!("failed to write config at {:?}", self.path))?;
        debug!(key, "updated config");

        Ok(())
    }

    /// Identity for new commits; environment overrides config
    pub fn identity(&self) -> anyhow::Result<Author> {
        let name = Self::env_or(AUTHOR_NAME_ENV, || self.get(USER_NAME_KEY))?;
        let email = Self::env_or(AUTHOR_EMAIL_ENV, || self.get(USER_EMAIL_KEY))?;

        let (Some(name), Some(email)) = (name, email) else {
            return Err(RepoError::MissingIdentity.into());
        };
        Author::validate_field(&name)?;
        Author::validate_field(&email)?;

        match std::env::var(AUTHOR_DATE_ENV) {
            Ok(date) if !date.trim().is_empty() => {
                let timestamp = Author::parse_date(date.trim())
                    .with_context(|| format!("invalid {AUTHOR_DATE_ENV} '{date}'"))?;
                Ok(Author::new_with_timestamp(name, email, timestamp))
            }
            _ => Ok(Author::new(name, email)),
        }
    }

    fn env_or(
        variable: &str,
        fallback: impl FnOnce() -> anyhow::Result<Option<String>>,
    ) -> anyhow::Result<Option<String>> {
        match std::env::var(variable) {
            Ok(value) if !value.trim().is_empty() => Ok(Some(value)),
            _ => Ok(fallback()?.filter(|value| !value.trim().is_empty())),
        }
    }

    fn load(&self) -> anyhow::Result<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }

        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read config at {:?}", self.path))?;

        Ok(content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .filter_map(|line| line.split_once('='))
            .map(|(key, value)| (key.trim().to_string(), value.trim().to_string()))
            .collect())
    }

    fn validate_key(key: &str) -> anyhow::Result<()> {
        let valid = key
            .split('.')
            .all(|part| !part.is_empty() && part.chars().all(|c| c.is_ascii_alphanumeric() || c == '-'));

        if !valid || !key.contains('.') {
            anyhow::bail!("invalid config key '{key}', expected <section>.<name>");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::TempDir;
    use assert_fs::prelude::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[test]
    fn set_keeps_other_entries() {
        let dir = TempDir::new().unwrap();
        let config = Config::new(dir.path().join("config").into());

        config.set("user.name", "Ada").unwrap();
        config.set("user.email", "ada@example.com").unwrap();
        config.set("user.name", "Ada Lovelace").unwrap();

        assert_eq!(config.get("user.name").unwrap().as_deref(), Some("Ada Lovelace"));
        assert_eq!(config.get("core.editor").unwrap(), None);
        dir.child("config")
            .assert("user.email=ada@example.com\nuser.name=Ada Lovelace\n");
    }

    #[test]
    fn tolerates_comments_and_spacing() {
        let dir = TempDir::new().unwrap();
        dir.child("config")
            .write_str("# identity\n\n user.name = Grace \n")
            .unwrap();
        let config = Config::new(dir.path().join("config").into());

        assert_eq!(config.get("user.name").unwrap().as_deref(), Some("Grace"));
    }

    #[rstest]
    #[case("user.name", "A<B")]
    #[case("user.email", "b>@example.com")]
    fn rejects_identities_that_would_not_parse_back(#[case] key: &str, #[case] value: &str) {
        let dir = TempDir::new().unwrap();
        let config = Config::new(dir.path().join("config").into());

        assert!(config.set(key, value).is_err());
        assert_eq!(config.get(key).unwrap(), None);
    }

    #[test]
    fn angle_brackets_are_fine_outside_identity_keys() {
        let dir = TempDir::new().unwrap();
        let config = Config::new(dir.path().join("config").into());

        config.set("alias.cmp", "a<b").unwrap();

        assert_eq!(config.get("alias.cmp").unwrap().as_deref(), Some("a<b"));
    }

    #[rstest]
    #[case("name")]
    #[case("user.")]
    #[case("user..name")]
    #[case("user.na me")]
    fn rejects_malformed_keys(#[case] key: &str) {
        let dir = TempDir::new().unwrap();
        let config = Config::new(dir.path().join("config").into());

        assert!(config.set(key, "value").is_err());
    }
}
