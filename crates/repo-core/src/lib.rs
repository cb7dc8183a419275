//! Config, migrations and worktree lifecycle for repo
//!
//! `repo-core` sits between the Layer 0 crates and the CLI:
//!
//! ```text
//!          repo-cli
//!             |
//!         repo-core
//!          /     \
//!     repo-fs   repo-git
//! ```
//!
//! A command loads the [`Config`] through a [`ConfigStore`] (migrating it
//! if needed), runs a [`WorktreeLifecycle`] or [`pr`] operation against
//! it, and those operations save the config once git has succeeded.

pub mod backup;
pub mod config;
pub mod error;
pub mod github;
pub mod lifecycle;
pub mod pr;

pub use backup::BackupManager;
pub use config::{
    CURRENT_VERSION, Config, ConfigStore, RepoEntry, WorktreeEntry, WorktreeKey,
    default_config_path,
};
pub use error::{Error, ErrorKind, Result};
pub use github::{
    GhCli, GitUrl, PrStatus, PrStatusProvider, is_local_url, owner_repo_from_url, parse_git_url,
};
pub use lifecycle::{
    BranchDeletion, CreateOptions, CreateOutcome, RegisterOptions, RegisterOutcome,
    RemoteMismatch, RemoveOutcome, WorktreeLifecycle, worktree_path,
};
pub use pr::{LinkOutcome, link_pr, pr_status};
