//! Worktree, submodule, branch and remote operations
//!
//! All of these go through the `git` binary. Bare repositories are always
//! addressed with `git -C <bare>`; worktree-local commands (submodules) run
//! inside the worktree.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use crate::refs::{CheckoutKind, CheckoutPlan};
use crate::{Error, Git, Result};

/// Submodules recorded under this directory are CI tooling and are never
/// initialized for local development.
pub const CI_ONLY_PREFIX: &str = ".github/";

const SUBMODULE_MARKER: &str = "containing submodules";

/// How hard `git worktree remove` should try.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RemoveMode {
    #[default]
    Normal,
    Force,
}

impl Git {
    /// `git clone --bare <url> <dest>` and configure `origin` so fetches
    /// populate `refs/remotes/origin/*`.
    pub fn clone_bare(&self, url: &str, dest: &Path) -> Result<()> {
        self.run(
            None,
            [
                OsStr::new("clone"),
                OsStr::new("--bare"),
                OsStr::new(url),
                dest.as_os_str(),
            ],
        )?;
        // A bare clone maps remote heads straight onto local heads and has no
        // remote-tracking refs until this refspec is set.
        self.run_in(
            dest,
            &[
                "config",
                "remote.origin.fetch",
                "+refs/heads/*:refs/remotes/origin/*",
            ],
        )?;
        self.run_in(dest, &["fetch", "origin"])?;
        self.drop_cloned_heads(dest)?;
        tracing::info!(url, dest = %dest.display(), "Cloned bare repository");
        Ok(())
    }

    /// Delete the `refs/heads/*` copies `clone --bare` made of every remote
    /// branch, keeping only HEAD's branch. Nothing updates those copies, so
    /// leaving them would hide `origin/<branch>` behind a frozen snapshot.
    fn drop_cloned_heads(&self, bare: &Path) -> Result<()> {
        let head = match self.run_in(bare, &["symbolic-ref", "HEAD"]) {
            Ok(head) => Some(head),
            Err(Error::CommandFailed { .. }) => None,
            Err(e) => return Err(e),
        };
        let heads = self.run_in(bare, &["for-each-ref", "--format=%(refname)", "refs/heads/"])?;
        for name in heads.lines().filter(|r| Some(*r) != head.as_deref()) {
            self.run_in(bare, &["update-ref", "-d", name])?;
            tracing::debug!(bare = %bare.display(), reference = name, "Dropped cloned head");
        }
        Ok(())
    }

    /// Materialize a worktree according to `plan`.
    pub fn add_worktree(&self, bare: &Path, path: &Path, plan: &CheckoutPlan) -> Result<()> {
        let path_arg = path.to_string_lossy().to_string();
        let args: Vec<&str> = match plan.kind {
            CheckoutKind::ExistingLocal => vec!["worktree", "add", &path_arg, &plan.branch],
            CheckoutKind::TrackRemote => vec![
                "worktree",
                "add",
                "--track",
                "-b",
                &plan.branch,
                &path_arg,
                &plan.start_ref,
            ],
            // `--no-track`: a new branch starting at `origin/main` must not
            // adopt it as upstream.
            CheckoutKind::NewBranch => vec![
                "worktree",
                "add",
                "--no-track",
                "-b",
                &plan.branch,
                &path_arg,
                &plan.start_ref,
            ],
        };
        self.run_in(bare, &args)?;
        tracing::info!(path = %path.display(), branch = %plan.branch, kind = ?plan.kind, "Worktree added");
        Ok(())
    }

    /// `git worktree remove`. A refusal caused by initialized submodules is
    /// reported as [`Error::SubmodulesBlockRemoval`] so the caller can
    /// deinit and retry; every other failure is returned unchanged.
    pub fn remove_worktree(&self, bare: &Path, path: &Path, mode: RemoveMode) -> Result<()> {
        let path_arg = path.to_string_lossy().to_string();
        let mut args = vec!["worktree", "remove"];
        if mode == RemoveMode::Force {
            args.push("--force");
        }
        args.push(&path_arg);

        match self.run_in(bare, &args) {
            Ok(_) => Ok(()),
            Err(Error::CommandFailed { stderr, .. }) if stderr.contains(SUBMODULE_MARKER) => {
                Err(Error::SubmodulesBlockRemoval {
                    path: path.to_path_buf(),
                    stderr,
                })
            }
            Err(e) => Err(e),
        }
    }

    /// `git worktree move`, keeping git's worktree metadata consistent.
    pub fn move_worktree(&self, bare: &Path, from: &Path, to: &Path) -> Result<()> {
        let from_arg = from.to_string_lossy().to_string();
        let to_arg = to.to_string_lossy().to_string();
        self.run_in(bare, &["worktree", "move", &from_arg, &to_arg])?;
        Ok(())
    }

    /// Branch checked out in `worktree`, or `None` when HEAD is detached or
    /// the directory is not a worktree.
    pub fn checked_out_branch(&self, worktree: &Path) -> Result<Option<String>> {
        match self.run_in(worktree, &["symbolic-ref", "--short", "-q", "HEAD"]) {
            Ok(branch) => Ok(Some(branch)),
            Err(Error::CommandFailed { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// `git worktree prune`
    pub fn prune_worktrees(&self, bare: &Path) -> Result<()> {
        self.run_in(bare, &["worktree", "prune"]).map(|_| ())
    }

    /// Submodule paths recorded in the worktree's `.gitmodules`.
    pub fn submodule_paths(&self, worktree: &Path) -> Result<Vec<String>> {
        if !worktree.join(".gitmodules").exists() {
            return Ok(Vec::new());
        }

        let output = match self.run_in(
            worktree,
            &[
                "config",
                "-f",
                ".gitmodules",
                "--get-regexp",
                r"^submodule\..*\.path$",
            ],
        ) {
            Ok(output) => output,
            // Exit 1: no matching keys.
            Err(Error::CommandFailed { code: Some(1), .. }) => return Ok(Vec::new()),
            Err(e) => return Err(e),
        };

        Ok(output
            .lines()
            .filter_map(|line| line.split_once(' ').map(|(_, path)| path.trim().to_string()))
            .filter(|path| !path.is_empty())
            .collect())
    }

    /// Initialize submodules, skipping CI-only ones. Returns how many were
    /// initialized.
    pub fn init_submodules(&self, worktree: &Path) -> Result<usize> {
        let paths: Vec<String> = self
            .submodule_paths(worktree)?
            .into_iter()
            .filter(|p| !is_ci_only(p))
            .collect();

        if paths.is_empty() {
            return Ok(0);
        }

        let mut args = vec!["submodule", "update", "--init", "--recursive", "--"];
        args.extend(paths.iter().map(String::as_str));
        self.run_in(worktree, &args)?;

        tracing::debug!(worktree = %worktree.display(), count = paths.len(), "Submodules initialized");
        Ok(paths.len())
    }

    /// `git submodule deinit --all --force`
    pub fn deinit_submodules(&self, worktree: &Path) -> Result<()> {
        self.run_in(worktree, &["submodule", "deinit", "--all", "--force"])
            .map(|_| ())
    }

    /// `git branch -d` (or `-D` when `force`).
    pub fn delete_local_branch(&self, bare: &Path, branch: &str, force: bool) -> Result<()> {
        let flag = if force { "-D" } else { "-d" };
        self.run_in(bare, &["branch", flag, branch]).map(|_| ())
    }

    /// `git push origin --delete <branch>`
    pub fn delete_remote_branch(&self, bare: &Path, branch: &str) -> Result<()> {
        self.run_in(bare, &["push", "origin", "--delete", branch])
            .map(|_| ())
    }

    /// URL of `origin`, if one is configured.
    pub fn remote_url(&self, bare: &Path) -> Result<Option<String>> {
        match self.run_in(bare, &["remote", "get-url", "origin"]) {
            Ok(url) if url.is_empty() => Ok(None),
            Ok(url) => Ok(Some(url)),
            Err(Error::CommandFailed { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub fn set_remote_url(&self, bare: &Path, url: &str) -> Result<()> {
        self.run_in(bare, &["remote", "set-url", "origin", url])
            .map(|_| ())
    }

    /// Worktree paths git has registered for `bare`, main worktree excluded.
    pub fn list_worktrees(&self, bare: &Path) -> Result<Vec<PathBuf>> {
        let output = self.run_in(bare, &["worktree", "list", "--porcelain"])?;
        Ok(output
            .split("\n\n")
            .filter(|block| !block.lines().any(|line| line == "bare"))
            .filter_map(|block| {
                block
                    .lines()
                    .find_map(|line| line.strip_prefix("worktree "))
                    .map(PathBuf::from)
            })
            .collect())
    }
}

fn is_ci_only(path: &str) -> bool {
    path.starts_with(CI_ONLY_PREFIX)
}
