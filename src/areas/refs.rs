//! Branch references and HEAD
//!
//! ## File Format
//!
//! - `HEAD` always holds `ref: refs/heads/<branch>`; any other content is a
//!   detached HEAD and is rejected.
//! - `refs/heads/<branch>` holds the 40-character hex id of the branch tip, or
//!   nothing at all for a branch without commits.

use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::RepoError;
use anyhow::Context;
use derive_new::new;
use file_guard::Lock;
use std::io::Write;
use std::ops::DerefMut;
use std::path::Path;
use tracing::debug;
use walkdir::WalkDir;

/// Regex pattern for parsing symbolic references
const SYMREF_REGEX: &str = r"^ref: (.+)$";

/// Name of the HEAD reference
pub const HEAD_REF_NAME: &str = "HEAD";

#[derive(Debug, new)]
pub struct Refs {
    /// Path to the repository directory (`.twig`)
    path: Box<Path>,
}

impl Refs {
    /// The branch HEAD points at
    pub fn current_branch(&self) -> anyhow::Result<BranchName> {
        let head_path = self.head_path();
        let content = std::fs::read_to_string(&head_path)
            .with_context(|| format!("failed to read HEAD at {:?}", head_path))?;

        let symref_match = regex::Regex::new(SYMREF_REGEX)?.captures(content.trim());
        match symref_match {
            Some(symref_match) => BranchName::try_parse_ref_path(&symref_match[1]),
            None => Err(RepoError::DetachedHead.into()),
        }
    }

    pub fn is_current_branch(&self, branch_name: &BranchName) -> anyhow::Result<bool> {
        Ok(&self.current_branch()? == branch_name)
    }

    /// Tip of the current branch, `None` while the branch has no commits
    pub fn read_head(&self) -> anyhow::Result<Option<ObjectId>> {
        let branch = self.current_branch()?;
        let branch_path = self.branch_path(&branch);

        if !branch_path.exists() {
            return Ok(None);
        }
        Self::read_ref_file(&branch_path)
    }

    /// Tip of `branch_name`; fails when no such branch exists
    pub fn read_ref(&self, branch_name: &BranchName) -> anyhow::Result<Option<ObjectId>> {
        let branch_path = self.branch_path(branch_name);

        if !branch_path.is_file() {
            return Err(RepoError::BranchNotFound(branch_name.to_string()).into());
        }
        Self::read_ref_file(&branch_path)
    }

    pub fn branch_exists(&self, branch_name: &BranchName) -> bool {
        self.branch_path(branch_name).is_file()
    }

    /// Move the current branch to `oid`
    pub fn update_head(&self, oid: ObjectId) -> anyhow::Result<()> {
        let branch = self.current_branch()?;
        self.update_ref(&branch, oid)
    }

    pub fn update_ref(&self, branch_name: &BranchName, oid: ObjectId) -> anyhow::Result<()> {
        debug!(branch = %branch_name, oid = %oid, "updating ref");
        self.update_ref_file(&self.branch_path(branch_name), oid.to_hex())
    }

    /// Point HEAD at `branch_name`
    pub fn set_head(&self, branch_name: &BranchName) -> anyhow::Result<()> {
        debug!(branch = %branch_name, "switching HEAD");
        self.update_ref_file(
            &self.head_path(),
            format!("ref: {}\n", branch_name.ref_path()),
        )
    }

    pub fn create_branch(&self, name: &BranchName, source_oid: ObjectId) -> anyhow::Result<()> {
        if self.branch_exists(name) {
            return Err(RepoError::BranchExists(name.to_string()).into());
        }

        self.update_ref(name, source_oid)
    }

    /// Create a branch file with no tip yet
    pub fn create_unborn_branch(&self, name: &BranchName) -> anyhow::Result<()> {
        self.update_ref_file(&self.branch_path(name), String::new())
    }

    /// Remove a branch, returning the tip it pointed at
    pub fn delete_branch(&self, name: &BranchName) -> anyhow::Result<Option<ObjectId>> {
        let branch_path = self.branch_path(name);
        let oid = self.read_ref(name)?;

        std::fs::remove_file(&branch_path)
            .with_context(|| format!("failed to delete branch file at {:?}", branch_path))?;
        self.prune_branch_empty_parent_dirs(&branch_path)?;
        debug!(branch = %name, "deleted branch");

        Ok(oid)
    }

    /// All branches, sorted by name
    pub fn list_branches(&self) -> anyhow::Result<Vec<BranchName>> {
        let heads_path = self.heads_path();
        let mut branches = WalkDir::new(&heads_path)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .filter_map(|entry| {
                let relative_path = entry.path().strip_prefix(&heads_path).ok()?;
                let name = relative_path
                    .components()
                    .map(|component| component.as_os_str().to_string_lossy())
                    .collect::<Vec<_>>()
                    .join("/");
                BranchName::try_parse(name).ok()
            })
            .collect::<Vec<_>>();
        branches.sort();

        Ok(branches)
    }

    fn read_ref_file(path: &Path) -> anyhow::Result<Option<ObjectId>> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read ref file at {:?}", path))?;
        let content = content.trim();

        if content.is_empty() {
            Ok(None)
        } else {
            Ok(Some(ObjectId::try_parse(content)?))
        }
    }

    fn update_ref_file(&self, path: &Path, raw_ref: String) -> anyhow::Result<()> {
        // create all the parent directories if they don't exist
        std::fs::create_dir_all(path.parent().with_context(|| {
            format!(
                "failed to create parent directories for ref file at {:?}",
                path
            )
        })?)?;

        let mut ref_file = std::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)
            .with_context(|| format!("failed to open ref file at {:?}", path))?;
        let mut lock = file_guard::lock(&mut ref_file, Lock::Exclusive, 0, 1)?;
        lock.deref_mut().write_all(raw_ref.as_bytes())?;

        Ok(())
    }

    fn prune_branch_empty_parent_dirs(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent()
            && parent != self.heads_path().as_ref()
            && parent.read_dir()?.next().is_none()
        {
            std::fs::remove_dir(parent).with_context(|| {
                format!("failed to remove empty branch directory at {:?}", parent)
            })?;
            self.prune_branch_empty_parent_dirs(parent)?;
        }

        Ok(())
    }

    fn branch_path(&self, branch_name: &BranchName) -> Box<Path> {
        self.heads_path().join(branch_name.as_ref()).into_boxed_path()
    }

    pub fn head_path(&self) -> Box<Path> {
        self.path.join(HEAD_REF_NAME).into_boxed_path()
    }

    pub fn refs_path(&self) -> Box<Path> {
        self.path.join("refs").into_boxed_path()
    }

    pub fn heads_path(&self) -> Box<Path> {
        self.refs_path().join("heads").into_boxed_path()
    }
}
