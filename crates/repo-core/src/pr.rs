//! Linking worktrees to pull requests

use crate::config::{Config, ConfigStore};
use crate::github::{PrStatus, PrStatusProvider};
use crate::{Error, Result};

/// Result of [`link_pr`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkOutcome {
    /// Status reported by the provider while validating, if it answered.
    pub status: Option<PrStatus>,
    pub warnings: Vec<String>,
}

/// Attach PR `number` to an existing worktree and persist it.
///
/// The provider is consulted to check the PR exists, but only advisorily:
/// any failure there becomes a warning and the link is still saved.
pub fn link_pr(
    store: &ConfigStore,
    config: &mut Config,
    repo: &str,
    branch: &str,
    number: u64,
    provider: &dyn PrStatusProvider,
) -> Result<LinkOutcome> {
    if number == 0 {
        return Err(Error::Validation("PR number must be a positive integer".into()));
    }
    if config.worktree(repo, branch).is_none() {
        return Err(Error::WorktreeNotFound {
            repo: repo.to_string(),
            branch: branch.to_string(),
        });
    }

    let mut outcome = LinkOutcome::default();
    match config.repo(repo).and_then(|r| r.owner_repo.clone()) {
        None => outcome.warnings.push(format!(
            "'{repo}' is not hosted on GitHub; PR #{number} cannot be verified"
        )),
        Some(_) if !provider.is_available() => outcome
            .warnings
            .push("GitHub CLI (gh) not available; PR was not verified".to_string()),
        Some(slug) => match provider.status(number, &slug) {
            Ok(PrStatus::Unknown) | Err(_) => outcome.warnings.push(format!(
                "Could not verify PR #{number} in {slug}; linking anyway"
            )),
            Ok(status) => outcome.status = Some(status),
        },
    }

    if let Some(entry) = config.worktree_mut(repo, branch) {
        entry.pr = Some(number);
    }
    store.save(config)?;
    tracing::info!(repo, branch, pr = number, "Linked PR");
    Ok(outcome)
}

/// Status of the PR linked to `(repo, branch)`.
///
/// `None` when no PR is linked. Never fails because of the provider: a
/// non-GitHub host, a missing `gh` or an offline lookup all yield
/// [`PrStatus::Unknown`].
pub fn pr_status(
    config: &Config,
    repo: &str,
    branch: &str,
    provider: &dyn PrStatusProvider,
) -> Option<PrStatus> {
    let number = config.worktree(repo, branch)?.pr?;
    let Some(slug) = config.repo(repo).and_then(|r| r.owner_repo.as_deref()) else {
        return Some(PrStatus::Unknown);
    };
    if !provider.is_available() {
        return Some(PrStatus::Unknown);
    }
    Some(provider.status(number, slug).unwrap_or_else(|e| {
        tracing::debug!(repo, branch, pr = number, error = %e, "PR status unavailable");
        PrStatus::Unknown
    }))
}
