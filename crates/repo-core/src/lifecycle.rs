//! Registering repositories and creating/removing worktrees
//!
//! Git runs first and the config is saved last, so a failure part-way
//! through never leaves an entry pointing at a worktree that does not exist.

use std::path::PathBuf;

use repo_git::{CheckoutKind, Git, RefResolver, RemoveMode};

use crate::config::{Config, ConfigStore, RepoEntry, WorktreeEntry, WorktreeKey};
use crate::github::owner_repo_from_url;
use crate::{Error, Result};

/// Options for [`WorktreeLifecycle::register_repo`].
#[derive(Debug, Clone, Copy, Default)]
pub struct RegisterOptions {
    /// Replace an existing registration.
    pub force: bool,
}

/// An existing bare repository whose `origin` differs from the URL just
/// registered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteMismatch {
    pub bare: PathBuf,
    pub current: String,
    pub requested: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterOutcome {
    pub owner_repo: Option<String>,
    /// Set when the caller should decide whether to update `origin`.
    pub remote_mismatch: Option<RemoteMismatch>,
    pub replaced: bool,
}

/// Options for [`WorktreeLifecycle::create_worktree`].
#[derive(Debug, Clone, Default)]
pub struct CreateOptions {
    /// Start point for a branch that exists nowhere yet.
    pub start_point: Option<String>,
    /// URL to register the repository with if it is not registered yet.
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateOutcome {
    pub path: PathBuf,
    pub kind: CheckoutKind,
    /// Ref the branch was created from (recorded as `start_point`).
    pub start_ref: String,
    pub submodules: usize,
    /// The repository was registered as part of this call.
    pub registered: bool,
    pub cloned: bool,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoveOutcome {
    pub path: PathBuf,
    pub submodules_deinitialized: bool,
    pub warnings: Vec<String>,
}

/// Which branches to delete after a worktree is removed.
#[derive(Debug, Clone, Copy, Default)]
pub struct BranchDeletion {
    pub local: bool,
    pub remote: bool,
    pub force: bool,
}

/// Worktree operations against one config store.
pub struct WorktreeLifecycle<'a> {
    store: &'a ConfigStore,
    git: Git,
}

impl<'a> WorktreeLifecycle<'a> {
    pub fn new(store: &'a ConfigStore, git: Git) -> Self {
        Self { store, git }
    }

    pub fn git(&self) -> &Git {
        &self.git
    }

    fn resolver(&self, config: &Config, alias: &str) -> Result<RefResolver> {
        Ok(RefResolver::new(config.bare_repo_path(alias)?, self.git.clone()))
    }

    /// Register `alias` for `url` and persist it.
    pub fn register_repo(
        &self,
        config: &mut Config,
        alias: &str,
        url: &str,
        options: RegisterOptions,
    ) -> Result<RegisterOutcome> {
        repo_git::validate_repo_alias(alias)?;
        let owner_repo = owner_repo_from_url(url)?;

        let replaced = config.repos.contains_key(alias);
        if replaced && !options.force {
            return Err(Error::AliasExists {
                alias: alias.to_string(),
            });
        }

        let bare = config.bare_repo_path(alias)?;
        let remote_mismatch = if bare.exists() {
            self.git
                .remote_url(&bare)?
                .filter(|current| current != url)
                .map(|current| RemoteMismatch {
                    bare: bare.clone(),
                    current,
                    requested: url.to_string(),
                })
        } else {
            None
        };

        config.repos.insert(
            alias.to_string(),
            RepoEntry {
                url: url.to_string(),
                owner_repo: owner_repo.clone(),
            },
        );
        self.store.save(config)?;
        tracing::info!(alias, url, owner_repo = ?owner_repo, "Registered repository");

        Ok(RegisterOutcome {
            owner_repo,
            remote_mismatch,
            replaced,
        })
    }

    /// Point the bare repository's `origin` at the registered URL.
    pub fn sync_remote_url(&self, config: &Config, alias: &str) -> Result<()> {
        let entry = config.repo(alias).ok_or_else(|| Error::UnknownRepo {
            alias: alias.to_string(),
        })?;
        let bare = config.bare_repo_path(alias)?;
        self.git.set_remote_url(&bare, &entry.url)?;
        tracing::info!(alias, url = %entry.url, "Updated origin URL");
        Ok(())
    }

    /// Create the worktree for `(repo, branch)` and record it.
    ///
    /// An unknown repository is registered on the fly when
    /// [`CreateOptions::url`] is given. Nothing is written to the config
    /// unless the worktree directory was created.
    pub fn create_worktree(
        &self,
        config: &mut Config,
        repo: &str,
        branch: &str,
        options: &CreateOptions,
    ) -> Result<CreateOutcome> {
        repo_git::validate_repo_alias(repo)?;
        repo_git::validate_branch_name(branch)?;
        if let Some(start) = &options.start_point {
            repo_git::validate_start_point(start)?;
        }

        let (url, new_entry) = match (config.repo(repo), &options.url) {
            (Some(entry), _) => (entry.url.clone(), None),
            (None, Some(url)) => {
                let owner_repo = owner_repo_from_url(url)?;
                (
                    url.clone(),
                    Some(RepoEntry {
                        url: url.clone(),
                        owner_repo,
                    }),
                )
            }
            (None, None) => {
                return Err(Error::UnknownRepo {
                    alias: repo.to_string(),
                });
            }
        };

        let path = config.worktree_path(repo, branch)?;
        let exists = |path: PathBuf| Error::WorktreeExists {
            repo: repo.to_string(),
            branch: branch.to_string(),
            path,
        };
        if config.worktree(repo, branch).is_some() || path.exists() {
            return Err(exists(path));
        }
        // `a-b` + `c` and `a` + `b-c` share a directory name.
        for other in config.worktrees.values() {
            if config.worktree_path(&other.repo, &other.branch).ok().as_ref() == Some(&path) {
                return Err(exists(path));
            }
        }
        std::fs::create_dir_all(&config.base_dir)
            .map_err(|e| repo_fs::Error::io(&config.base_dir, e))?;
        repo_fs::ensure_within(&path, &config.base_dir)?;

        let bare = config.bare_repo_path(repo)?;
        let cloned = !bare.exists();
        if cloned {
            self.git.clone_bare(&url, &bare)?;
        }

        let plan = RefResolver::new(&bare, self.git.clone())
            .plan_checkout(branch, options.start_point.as_deref())?;
        let mut warnings = plan.warnings.clone();

        self.git.add_worktree(&bare, &path, &plan)?;

        let submodules = match self.git.init_submodules(&path) {
            Ok(count) => count,
            Err(e) => {
                tracing::warn!(repo, branch, error = %e, "Submodule init failed");
                warnings.push(format!("Submodule initialization failed: {e}"));
                0
            }
        };

        let registered = new_entry.is_some();
        if let Some(entry) = new_entry {
            config.repos.insert(repo.to_string(), entry);
        }
        let entry = WorktreeEntry::new(repo, branch, plan.start_ref.clone());
        config.worktrees.insert(entry.key(), entry);
        self.store.save(config)?;

        tracing::info!(repo, branch, path = %path.display(), start = %plan.start_ref, "Created worktree");
        Ok(CreateOutcome {
            path,
            kind: plan.kind,
            start_ref: plan.start_ref,
            submodules,
            registered,
            cloned,
            warnings,
        })
    }

    /// Fail fast if the deletion described by `deletion` would lose
    /// unmerged work.
    ///
    /// Fetches first so work merged upstream counts as merged. The local
    /// branch is checked when `deletion.local` is set and `origin/<branch>`
    /// when `deletion.remote` is. Run before anything destructive and before
    /// asking for confirmation.
    pub fn check_branch_deletion(
        &self,
        config: &Config,
        repo: &str,
        branch: &str,
        deletion: BranchDeletion,
    ) -> Result<()> {
        if deletion.force || !(deletion.local || deletion.remote) {
            return Ok(());
        }
        let refs = self.resolver(config, repo)?;
        if let Err(e) = refs.fetch() {
            tracing::warn!(repo, branch, error = %e, "Fetch failed, checking merge state on local refs");
        }

        let local = deletion.local && refs.local_branch_exists(branch)?;
        let remote = deletion.remote && refs.remote_branch_exists(branch)?;
        if !local && !remote {
            return Ok(());
        }

        let into = refs.resolve_default_branch()?;
        if into == branch {
            return Err(Error::Validation(format!(
                "Refusing to delete the default branch '{branch}'"
            )));
        }
        let unmerged = |name: String| Error::BranchNotMerged {
            branch: name,
            into: into.clone(),
        };
        if local && !refs.is_merged(branch, &into)? {
            return Err(unmerged(branch.to_string()));
        }
        if remote && !refs.is_remote_merged(branch, &into)? {
            return Err(unmerged(format!("origin/{branch}")));
        }
        Ok(())
    }

    /// Remove the worktree for `(repo, branch)` and then its entry.
    ///
    /// Initialized submodules make `git worktree remove` refuse; in that
    /// case they are deinitialized and removal is forced. Any other git
    /// failure is returned and the entry is kept.
    pub fn remove_worktree(
        &self,
        config: &mut Config,
        repo: &str,
        branch: &str,
    ) -> Result<RemoveOutcome> {
        if config.worktree(repo, branch).is_none() {
            return Err(Error::WorktreeNotFound {
                repo: repo.to_string(),
                branch: branch.to_string(),
            });
        }
        let path = config.worktree_path(repo, branch)?;
        let bare = config.bare_repo_path(repo)?;
        let mut warnings = Vec::new();
        let mut submodules_deinitialized = false;

        if path.exists() {
            match self.git.remove_worktree(&bare, &path, RemoveMode::Normal) {
                Ok(()) => {}
                Err(repo_git::Error::SubmodulesBlockRemoval { .. }) => {
                    tracing::debug!(repo, branch, "Submodules block removal, deinitializing");
                    self.git.deinit_submodules(&path)?;
                    self.git.remove_worktree(&bare, &path, RemoveMode::Force)?;
                    submodules_deinitialized = true;
                }
                Err(e) => return Err(e.into()),
            }
        } else {
            warnings.push(format!(
                "Worktree directory {} was already gone",
                path.display()
            ));
            if bare.exists() {
                self.git.prune_worktrees(&bare)?;
            }
        }

        config.worktrees.remove(&WorktreeKey::new(repo, branch));
        self.store.save(config)?;

        tracing::info!(repo, branch, path = %path.display(), "Removed worktree");
        Ok(RemoveOutcome {
            path,
            submodules_deinitialized,
            warnings,
        })
    }

    /// Delete `branch` locally and/or on `origin`. Call
    /// [`check_branch_deletion`](Self::check_branch_deletion) first.
    pub fn delete_branch(
        &self,
        config: &Config,
        repo: &str,
        branch: &str,
        deletion: BranchDeletion,
    ) -> Result<()> {
        let refs = self.resolver(config, repo)?;
        if deletion.local && refs.local_branch_exists(branch)? {
            self.git
                .delete_local_branch(refs.bare_path(), branch, deletion.force)?;
            tracing::info!(repo, branch, "Deleted local branch");
        }
        if deletion.remote {
            self.git.delete_remote_branch(refs.bare_path(), branch)?;
            tracing::info!(repo, branch, "Deleted remote branch");
        }
        Ok(())
    }
}

/// Directory of an existing worktree entry.
pub fn worktree_path(config: &Config, repo: &str, branch: &str) -> Result<PathBuf> {
    if config.worktree(repo, branch).is_none() {
        return Err(Error::WorktreeNotFound {
            repo: repo.to_string(),
            branch: branch.to_string(),
        });
    }
    Ok(config.worktree_path(repo, branch)?)
}
