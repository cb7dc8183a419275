//! [`TestWorkspace`]: everything a repo scenario needs on disk.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::git::{real_git_repo_with_commit, run_git};

/// A temporary directory laid out as:
///
/// ```text
/// <tmp>/origin/        non-bare upstream with one commit on `main`
/// <tmp>/worktrees/     base directory for bare repos and worktrees
/// <tmp>/home/config.yaml
/// ```
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl Default for TestWorkspace {
    fn default() -> Self {
        Self::new()
    }
}

impl TestWorkspace {
    /// # Panics
    /// Panics if the temporary directory or origin repository cannot be made.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("TestWorkspace: failed to create temp dir");
        real_git_repo_with_commit(&temp_dir.path().join("origin"));
        fs::create_dir_all(temp_dir.path().join("worktrees"))
            .expect("TestWorkspace: failed to create base dir");
        Self { temp_dir }
    }

    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// The upstream repository. Tests commit and branch here, then fetch.
    pub fn origin(&self) -> PathBuf {
        self.root().join("origin")
    }

    /// Clone URL of [`origin`](Self::origin).
    pub fn origin_url(&self) -> String {
        self.origin().to_string_lossy().to_string()
    }

    pub fn base_dir(&self) -> PathBuf {
        self.root().join("worktrees")
    }

    pub fn config_path(&self) -> PathBuf {
        self.root().join("home").join("config.yaml")
    }

    /// Bare-clone origin to `<base_dir>/<alias>.git` the way the tool lays
    /// it out: `refs/remotes/origin/*` populated and only HEAD's branch kept
    /// under `refs/heads/`.
    pub fn bare_clone(&self, alias: &str) -> PathBuf {
        let bare = self.base_dir().join(format!("{alias}.git"));
        let bare_arg = bare.to_string_lossy().to_string();
        run_git(self.root(), &["clone", "-q", "--bare", &self.origin_url(), &bare_arg]);
        run_git(
            &bare,
            &[
                "config",
                "remote.origin.fetch",
                "+refs/heads/*:refs/remotes/origin/*",
            ],
        );
        run_git(&bare, &["fetch", "-q", "origin"]);
        let head = run_git(&bare, &["symbolic-ref", "HEAD"]);
        let heads = run_git(&bare, &["for-each-ref", "--format=%(refname)", "refs/heads/"]);
        for name in heads.lines().filter(|r| *r != head) {
            run_git(&bare, &["update-ref", "-d", name]);
        }
        bare
    }

    /// Create a fresh repository under the workspace with one commit, for
    /// use as a submodule source.
    pub fn submodule_source(&self, name: &str) -> PathBuf {
        let path = self.root().join(name);
        real_git_repo_with_commit(&path);
        path
    }
}
