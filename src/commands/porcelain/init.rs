use crate::areas::repository::Repository;
use crate::artifacts::branch::branch_name::BranchName;
use anyhow::Context;
use std::fs;
use std::io::Write;

impl Repository {
    /// Create `.twig` with an unborn default branch; re-running keeps existing state
    pub fn init(&mut self) -> anyhow::Result<()> {
        let reinitialized = self.refs().head_path().exists();

        fs::create_dir_all(self.database().objects_path())
            .context("failed to create .twig/objects directory")?;
        fs::create_dir_all(self.refs().heads_path())
            .context("failed to create .twig/refs/heads directory")?;

        if !reinitialized {
            let default_branch = BranchName::default();
            self.refs()
                .set_head(&default_branch)
                .context("failed to create initial HEAD reference")?;
            self.refs()
                .create_unborn_branch(&default_branch)
                .context("failed to create default branch file")?;
        }

        let index_path = self.index().path().to_path_buf();
        if !index_path.exists() {
            fs::write(&index_path, b"").context("failed to create .twig/index file")?;
        }

        let config_path = self.repository_path().join("config");
        if !config_path.exists() {
            fs::write(&config_path, b"").context("failed to create .twig/config file")?;
        }

        let verb = if reinitialized {
            "Reinitialized existing"
        } else {
            "Initialized empty"
        };
        writeln!(
            self.writer(),
            "{} twig repository in {}",
            verb,
            self.repository_path().display()
        )?;

        Ok(())
    }
}
