//! Default-branch resolution and checkout planning
//!
//! Reads refs of the bare repository with git2 and decides how a worktree
//! for a given branch should be materialized. Fetching goes through the
//! `git` binary so the user's credential helpers and SSH config apply.

use std::path::{Path, PathBuf};

use git2::{BranchType, Oid, Repository};

use crate::{Error, Git, Result, validate};

const REMOTE: &str = "origin";
const LOCAL_PREFIX: &str = "refs/heads/";
const REMOTE_PREFIX: &str = "refs/remotes/origin/";
const FALLBACK_BRANCHES: [&str; 2] = ["main", "master"];

/// How a worktree gets its branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckoutKind {
    /// The branch already exists locally; check it out as-is.
    ExistingLocal,
    /// Only `origin/<branch>` exists; create a local branch tracking it.
    TrackRemote,
    /// The branch exists nowhere; create it from a start point.
    NewBranch,
}

/// Outcome of [`RefResolver::plan_checkout`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutPlan {
    pub kind: CheckoutKind,
    pub branch: String,
    /// Concrete ref the worktree starts from. Never a symbolic placeholder
    /// such as `origin/HEAD`.
    pub start_ref: String,
    pub create_branch: bool,
    /// Non-fatal problems hit while planning, e.g. an offline fetch.
    pub warnings: Vec<String>,
}

/// Ref queries against one bare repository.
#[derive(Debug, Clone)]
pub struct RefResolver {
    bare_path: PathBuf,
    git: Git,
}

impl RefResolver {
    pub fn new(bare_path: impl Into<PathBuf>, git: Git) -> Self {
        Self {
            bare_path: bare_path.into(),
            git,
        }
    }

    pub fn bare_path(&self) -> &Path {
        &self.bare_path
    }

    fn open(&self) -> Result<Repository> {
        Ok(Repository::open_bare(&self.bare_path)?)
    }

    /// Resolve the repository's default branch to a concrete branch name.
    ///
    /// Order: symbolic `HEAD` target when that branch exists, then
    /// `origin/HEAD`, then `main`, then `master`. Fails rather than returning
    /// a name that does not exist.
    pub fn resolve_default_branch(&self) -> Result<String> {
        let repo = self.open()?;
        let head = symbolic_target(&repo, "HEAD");

        if let Some(target) = &head
            && let Some(name) = branch_from_target(&repo, target)
        {
            return Ok(name);
        }

        if let Some(target) = symbolic_target(&repo, "refs/remotes/origin/HEAD")
            && let Some(name) = branch_from_target(&repo, &target)
        {
            return Ok(name);
        }

        for candidate in FALLBACK_BRANCHES {
            if branch_exists(&repo, candidate, BranchType::Local)
                || branch_exists(&repo, &remote_name(candidate), BranchType::Remote)
            {
                tracing::debug!(branch = candidate, "Default branch resolved by fallback");
                return Ok(candidate.to_string());
            }
        }

        Err(Error::DefaultBranchUnresolved {
            repo: self.bare_path.clone(),
            head: head.unwrap_or_else(|| "detached".to_string()),
        })
    }

    pub fn local_branch_exists(&self, branch: &str) -> Result<bool> {
        Ok(branch_exists(&self.open()?, branch, BranchType::Local))
    }

    pub fn remote_branch_exists(&self, branch: &str) -> Result<bool> {
        Ok(branch_exists(
            &self.open()?,
            &remote_name(branch),
            BranchType::Remote,
        ))
    }

    /// Refresh `refs/remotes/origin/*`.
    pub fn fetch(&self) -> Result<()> {
        self.git
            .run_in(&self.bare_path, &["fetch", REMOTE, "--prune"])
            .map(|_| ())
    }

    /// Decide how to check out `branch`.
    ///
    /// Fetches first so branches pushed after the clone are visible. A fetch
    /// failure is recorded as a warning and planning continues on stale refs.
    pub fn plan_checkout(&self, branch: &str, user_start: Option<&str>) -> Result<CheckoutPlan> {
        validate::validate_branch_name(branch)?;
        if let Some(start) = user_start {
            validate::validate_start_point(start)?;
        }

        let mut warnings = Vec::new();
        if let Err(e) = self.fetch() {
            tracing::warn!(repo = %self.bare_path.display(), error = %e, "Fetch failed, using local refs");
            warnings.push(format!(
                "Could not fetch from {REMOTE}, remote branches may be stale: {}",
                e.stderr().unwrap_or("unknown error")
            ));
        }

        let repo = self.open()?;

        if branch_exists(&repo, branch, BranchType::Local) {
            if fresher_ref(&repo, branch)?.is_some_and(|r| r != branch) {
                warnings.push(format!(
                    "Local branch '{branch}' is behind {}; pull inside the worktree to update it",
                    remote_name(branch)
                ));
            }
            return Ok(CheckoutPlan {
                kind: CheckoutKind::ExistingLocal,
                branch: branch.to_string(),
                start_ref: branch.to_string(),
                create_branch: false,
                warnings,
            });
        }

        let remote = remote_name(branch);
        if branch_exists(&repo, &remote, BranchType::Remote) {
            return Ok(CheckoutPlan {
                kind: CheckoutKind::TrackRemote,
                branch: branch.to_string(),
                start_ref: remote,
                create_branch: true,
                warnings,
            });
        }

        let start_ref = match user_start {
            Some(start) => self.concrete_start(&repo, start)?,
            None => self.default_start(&repo)?,
        };

        Ok(CheckoutPlan {
            kind: CheckoutKind::NewBranch,
            branch: branch.to_string(),
            start_ref,
            create_branch: true,
            warnings,
        })
    }

    /// Whether local `branch` (or `origin/<branch>` when there is no local
    /// one) is fully merged into `into`.
    ///
    /// `into` counts as both the local branch and `origin/<into>`, so work
    /// merged upstream is seen once fetched even though the local default
    /// branch never moves. Branches are looked up by exact name, so `fix` is
    /// never reported merged just because `hotfix` is. A branch that does
    /// not exist is not merged.
    pub fn is_merged(&self, branch: &str, into: &str) -> Result<bool> {
        let repo = self.open()?;
        let targets = self.merge_targets(&repo, branch, into)?;
        match local_tip(&repo, branch).or_else(|| remote_tip(&repo, branch)) {
            Some(tip) => reachable_from_any(&repo, tip, &targets),
            None => Ok(false),
        }
    }

    /// Whether `origin/<branch>` is fully merged into `into`.
    pub fn is_remote_merged(&self, branch: &str, into: &str) -> Result<bool> {
        let repo = self.open()?;
        let targets = self.merge_targets(&repo, branch, into)?;
        match remote_tip(&repo, branch) {
            Some(tip) => reachable_from_any(&repo, tip, &targets),
            None => Ok(false),
        }
    }

    fn merge_targets(&self, repo: &Repository, branch: &str, into: &str) -> Result<Vec<Oid>> {
        let targets: Vec<Oid> = [local_tip(repo, into), remote_tip(repo, into)]
            .into_iter()
            .flatten()
            .collect();
        if targets.is_empty() {
            return Err(Error::CommandFailed {
                command: format!("is_merged {branch} {into}"),
                code: None,
                stderr: format!("branch '{into}' not found"),
            });
        }
        Ok(targets)
    }

    /// Start point for a new branch when the user gave none: the default
    /// branch, taken from `origin/<default>` when that is ahead of the local
    /// copy.
    fn default_start(&self, repo: &Repository) -> Result<String> {
        let default = self.resolve_default_branch()?;
        Ok(fresher_ref(repo, &default)?.unwrap_or_else(|| remote_name(&default)))
    }

    /// Replace the symbolic placeholders `HEAD` and `origin/HEAD` with the
    /// branch they stand for. Anything else is passed to git unchanged.
    fn concrete_start(&self, repo: &Repository, start: &str) -> Result<String> {
        match start {
            "HEAD" => self.default_start(repo),
            "origin/HEAD" | "refs/remotes/origin/HEAD" => {
                match symbolic_target(repo, "refs/remotes/origin/HEAD")
                    .as_deref()
                    .and_then(|t| t.strip_prefix(REMOTE_PREFIX))
                    .filter(|name| *name != "HEAD" && remote_tip(repo, name).is_some())
                {
                    Some(name) => Ok(remote_name(name)),
                    None => self.default_start(repo),
                }
            }
            other => Ok(other.to_string()),
        }
    }
}

fn remote_name(branch: &str) -> String {
    format!("{REMOTE}/{branch}")
}

fn symbolic_target(repo: &Repository, name: &str) -> Option<String> {
    repo.find_reference(name)
        .ok()
        .and_then(|r| r.symbolic_target().map(str::to_string))
}

/// Branch name for a `refs/heads/x` or `refs/remotes/origin/x` target, if
/// that ref exists. `refs/remotes/origin/HEAD` is followed one more level.
fn branch_from_target(repo: &Repository, target: &str) -> Option<String> {
    if let Some(name) = target.strip_prefix(LOCAL_PREFIX) {
        return branch_exists(repo, name, BranchType::Local).then(|| name.to_string());
    }
    if let Some(name) = target.strip_prefix(REMOTE_PREFIX) {
        if name == "HEAD" {
            let next = symbolic_target(repo, target)?;
            return next
                .strip_prefix(REMOTE_PREFIX)
                .filter(|n| *n != "HEAD")
                .filter(|n| branch_exists(repo, &remote_name(n), BranchType::Remote))
                .map(str::to_string);
        }
        return branch_exists(repo, &remote_name(name), BranchType::Remote)
            .then(|| name.to_string());
    }
    None
}

fn branch_exists(repo: &Repository, name: &str, kind: BranchType) -> bool {
    repo.find_branch(name, kind).is_ok()
}

fn local_tip(repo: &Repository, name: &str) -> Option<Oid> {
    repo.find_branch(name, BranchType::Local)
        .ok()
        .and_then(|b| b.get().target())
}

fn remote_tip(repo: &Repository, name: &str) -> Option<Oid> {
    repo.find_branch(&remote_name(name), BranchType::Remote)
        .ok()
        .and_then(|b| b.get().target())
}

/// `name` or `origin/<name>`, whichever is newer. The local branch wins
/// unless the remote one strictly descends from it.
fn fresher_ref(repo: &Repository, name: &str) -> Result<Option<String>> {
    Ok(match (local_tip(repo, name), remote_tip(repo, name)) {
        (Some(local), Some(remote))
            if local != remote && repo.graph_descendant_of(remote, local)? =>
        {
            Some(remote_name(name))
        }
        (Some(_), _) => Some(name.to_string()),
        (None, Some(_)) => Some(remote_name(name)),
        (None, None) => None,
    })
}

fn reachable_from_any(repo: &Repository, tip: Oid, targets: &[Oid]) -> Result<bool> {
    for &target in targets {
        if target == tip || repo.graph_descendant_of(target, tip)? {
            return Ok(true);
        }
    }
    Ok(false)
}
