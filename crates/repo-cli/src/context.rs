//! Where the config lives and how commands reach it

use std::path::PathBuf;

use repo_core::{ConfigStore, GhCli, WorktreeLifecycle};
use repo_git::Git;

use crate::error::Result;

/// Shared handles for one command invocation.
pub struct Context {
    pub store: ConfigStore,
    pub git: Git,
    pub gh: GhCli,
}

impl Context {
    /// `--config`/`REPO_CLI_CONFIG` if given, else `~/.repo-cli/config.yaml`.
    pub fn new(config_override: Option<PathBuf>) -> Result<Self> {
        let path = match config_override {
            Some(path) => path,
            None => repo_core::default_config_path()?,
        };
        tracing::debug!(config = %path.display(), "Using config");
        Ok(Self {
            store: ConfigStore::new(path),
            git: Git::new(),
            gh: GhCli::new(),
        })
    }

    pub fn lifecycle(&self) -> WorktreeLifecycle<'_> {
        WorktreeLifecycle::new(&self.store, self.git.clone())
    }
}
