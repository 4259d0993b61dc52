use crate::artifacts::branch::{DEFAULT_BRANCH, INVALID_BRANCH_NAME_REGEX};
use anyhow::Context;

pub const REF_PREFIX: &str = "refs/heads/";

/// A validated branch name, stored without the `refs/heads/` prefix
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BranchName(String);

impl BranchName {
    pub fn try_parse(name: impl Into<String>) -> anyhow::Result<Self> {
        let name = name.into();
        if name.is_empty() {
            anyhow::bail!("branch name cannot be empty");
        }

        let re = regex::Regex::new(INVALID_BRANCH_NAME_REGEX)
            .with_context(|| format!("invalid branch name regex: {INVALID_BRANCH_NAME_REGEX}"))?;

        if re.is_match(&name) {
            anyhow::bail!("invalid branch name: {}", name);
        } else {
            Ok(Self(name))
        }
    }

    /// Parse the target of a symbolic ref such as `refs/heads/main`
    pub fn try_parse_ref_path(ref_path: &str) -> anyhow::Result<Self> {
        let name = ref_path.strip_prefix(REF_PREFIX).with_context(|| {
            format!("symbolic ref must start with '{REF_PREFIX}', got '{ref_path}'")
        })?;

        Self::try_parse(name)
    }

    pub fn ref_path(&self) -> String {
        format!("{REF_PREFIX}{}", self.0)
    }

    pub fn is_default_branch(&self) -> bool {
        self.0 == DEFAULT_BRANCH
    }
}

impl Default for BranchName {
    fn default() -> Self {
        Self(DEFAULT_BRANCH.to_string())
    }
}

impl AsRef<str> for BranchName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for BranchName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
