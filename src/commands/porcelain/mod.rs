//! Porcelain commands
//!
//! - `init`: create an empty repository
//! - `add` / `rm`: stage and unstage files
//! - `commit`: record the index as a new commit
//! - `log`: first-parent history
//! - `branch` / `checkout`: manage and switch branches
//! - `merge`: integrate another branch, or abort a conflicted merge
//! - `status`: staged, unstaged and untracked changes
//! - `reset`: move the branch and optionally the index and working tree
//! - `config`: read and write settings

pub mod add;
pub mod branch;
pub mod checkout;
pub mod commit;
pub mod config;
pub mod init;
pub mod log;
pub mod merge;
pub mod reset;
pub mod rm;
pub mod status;
