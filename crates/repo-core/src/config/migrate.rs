//! Schema migrations
//!
//! Migrations operate on the raw YAML mapping before it is deserialized, so
//! documents written by any older version can be read. They run strictly in
//! order, each on the previous one's output, and only when the document's
//! `version` is below the migration's target. A document without a
//! `version` is treated as `0.0.0`.

use std::path::{Path, PathBuf};

use semver::Version;
use serde_yaml::{Mapping, Value};

use repo_git::naming::legacy_dir_name;
use repo_git::{Git, bare_repo_dir, worktree_dir};

use crate::backup::BackupManager;
use crate::config::model::WorktreeKey;
use crate::{Error, Result};

const VERSION_KEY: &str = "version";
const BASE_DIR_KEY: &str = "base_dir";
const WORKTREES_KEY: &str = "worktrees";

/// Moves a worktree directory in a way that keeps git's bookkeeping valid.
pub trait WorktreeMover {
    fn relocate(&self, bare: &Path, from: &Path, to: &Path) -> repo_git::Result<()>;

    /// Branch checked out in `worktree`; `None` when it cannot be told.
    fn checked_out_branch(&self, worktree: &Path) -> repo_git::Result<Option<String>>;
}

impl WorktreeMover for Git {
    fn relocate(&self, bare: &Path, from: &Path, to: &Path) -> repo_git::Result<()> {
        self.move_worktree(bare, from, to)
    }

    fn checked_out_branch(&self, worktree: &Path) -> repo_git::Result<Option<String>> {
        Git::checked_out_branch(self, worktree)
    }
}

/// What a migration may touch besides the document itself.
pub struct MigrationContext<'a> {
    pub config_path: &'a Path,
    pub backups: &'a BackupManager,
    pub mover: &'a dyn WorktreeMover,
}

impl MigrationContext<'_> {
    fn corrupt(&self, reason: impl Into<String>) -> Error {
        Error::ConfigCorrupt {
            path: self.config_path.to_path_buf(),
            reason: reason.into(),
            backup: self.backups.latest(),
        }
    }
}

/// One step of the migration chain.
pub trait Migration {
    /// Version the document is at after this migration.
    fn target(&self) -> Version;

    fn description(&self) -> &'static str;

    /// Rewrite `doc` in place. Returns whether anything besides the version
    /// changed. Must be idempotent.
    fn apply(&self, doc: &mut Mapping, ctx: &MigrationContext<'_>) -> Result<bool>;
}

/// Outcome of [`run_migrations`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationReport {
    pub from: Version,
    pub to: Version,
    pub applied: Vec<Version>,
    /// True when the document must be written back.
    pub changed: bool,
}

/// The full chain, in version order.
pub fn migrations() -> Vec<Box<dyn Migration>> {
    vec![
        Box::new(UnambiguousKeys),
        Box::new(EncodedWorktreeDirs),
        Box::new(AbsoluteBaseDir),
    ]
}

/// Run every migration whose target is above the document's version.
pub fn run_migrations(doc: &mut Mapping, ctx: &MigrationContext<'_>) -> Result<MigrationReport> {
    run_chain(&migrations(), doc, ctx)
}

pub fn run_chain(
    chain: &[Box<dyn Migration>],
    doc: &mut Mapping,
    ctx: &MigrationContext<'_>,
) -> Result<MigrationReport> {
    let from = document_version(doc, ctx)?;
    let mut current = from.clone();
    let mut applied = Vec::new();
    let mut changed = false;

    for migration in chain {
        let target = migration.target();
        if current >= target {
            continue;
        }

        tracing::info!(from = %current, to = %target, "Migrating config: {}", migration.description());
        let touched = migration.apply(doc, ctx)?;
        tracing::debug!(version = %target, touched, "Migration applied");
        doc.insert(VERSION_KEY.into(), Value::String(target.to_string()));
        current = target.clone();
        applied.push(target);
        // A version bump alone is a change worth persisting.
        changed = true;
    }

    Ok(MigrationReport {
        from,
        to: current,
        applied,
        changed,
    })
}

fn document_version(doc: &Mapping, ctx: &MigrationContext<'_>) -> Result<Version> {
    match doc.get(VERSION_KEY) {
        None | Some(Value::Null) => Ok(Version::new(0, 0, 0)),
        Some(Value::String(raw)) => {
            Version::parse(raw).map_err(|e| ctx.corrupt(format!("invalid version '{raw}': {e}")))
        }
        Some(other) => Err(ctx.corrupt(format!("invalid version {other:?}"))),
    }
}

fn str_field<'a>(entry: &'a Value, field: &str) -> Option<&'a str> {
    entry.get(field).and_then(Value::as_str)
}

fn base_dir_of(doc: &Mapping, ctx: &MigrationContext<'_>) -> Result<PathBuf> {
    let raw = doc
        .get(BASE_DIR_KEY)
        .and_then(Value::as_str)
        .ok_or_else(|| ctx.corrupt("missing base_dir"))?;
    Ok(repo_fs::expand_path(raw)?)
}

/// 0.1.0: rebuild worktree keys as `repo::branch` from each entry's own
/// fields. Older keys joined alias and branch with `-`, which cannot be
/// split back when either side contains a dash.
struct UnambiguousKeys;

impl Migration for UnambiguousKeys {
    fn target(&self) -> Version {
        Version::new(0, 1, 0)
    }

    fn description(&self) -> &'static str {
        "rewrite worktree keys with the '::' delimiter"
    }

    fn apply(&self, doc: &mut Mapping, ctx: &MigrationContext<'_>) -> Result<bool> {
        let Some(Value::Mapping(worktrees)) = doc.get(WORKTREES_KEY) else {
            return Ok(false);
        };

        let mut rebuilt = Mapping::new();
        let mut changed = false;
        for (key, entry) in worktrees {
            let new_key = match (str_field(entry, "repo"), str_field(entry, "branch")) {
                (Some(repo), Some(branch)) => {
                    Value::String(WorktreeKey::new(repo, branch).to_string())
                }
                // Left alone; typed parsing reports it as corruption.
                _ => key.clone(),
            };
            if rebuilt.contains_key(&new_key) {
                return Err(ctx.corrupt(format!("duplicate worktree entry {new_key:?}")));
            }
            changed |= new_key != *key;
            rebuilt.insert(new_key, entry.clone());
        }

        if changed {
            doc.insert(WORKTREES_KEY.into(), Value::Mapping(rebuilt));
        }
        Ok(changed)
    }
}

/// 0.2.0: move worktree directories from the lossy `/`→`__` names to the
/// percent-encoded names. Structural, so a backup is taken first and
/// completed moves are undone in reverse order if one fails.
struct EncodedWorktreeDirs;

struct PendingMove {
    key: String,
    bare: PathBuf,
    from: PathBuf,
    to: PathBuf,
}

impl PendingMove {
    fn describe(&self) -> String {
        format!("{} ({} -> {})", self.key, self.from.display(), self.to.display())
    }
}

impl EncodedWorktreeDirs {
    fn plan(&self, doc: &Mapping, ctx: &MigrationContext<'_>) -> Result<Vec<PendingMove>> {
        let Some(Value::Mapping(worktrees)) = doc.get(WORKTREES_KEY) else {
            return Ok(Vec::new());
        };
        let base_dir = base_dir_of(doc, ctx)?;

        let mut pending = Vec::new();
        for entry in worktrees.values() {
            let (Some(repo), Some(branch)) = (str_field(entry, "repo"), str_field(entry, "branch"))
            else {
                continue;
            };
            let (to, bare) = match (
                worktree_dir(&base_dir, repo, branch),
                bare_repo_dir(&base_dir, repo),
            ) {
                (Ok(to), Ok(bare)) => (to, bare),
                (Err(e), _) | (_, Err(e)) => {
                    tracing::warn!(repo, branch, error = %e, "Skipping worktree with invalid name");
                    continue;
                }
            };
            let from = base_dir.join(legacy_dir_name(repo, branch));

            if from == to || to.exists() || !from.exists() {
                continue;
            }
            // `a/b` and `a__b` share a legacy name; only the owner moves.
            if let Some(found) = ctx.mover.checked_out_branch(&from)?
                && found != branch
            {
                tracing::warn!(
                    repo,
                    branch,
                    dir = %from.display(),
                    checked_out = %found,
                    "Legacy directory belongs to another branch, not moving it"
                );
                continue;
            }
            pending.push(PendingMove {
                key: WorktreeKey::new(repo, branch).to_string(),
                bare,
                from,
                to,
            });
        }
        Ok(pending)
    }
}

impl Migration for EncodedWorktreeDirs {
    fn target(&self) -> Version {
        Version::new(0, 2, 0)
    }

    fn description(&self) -> &'static str {
        "move worktree directories to percent-encoded names"
    }

    fn apply(&self, doc: &mut Mapping, ctx: &MigrationContext<'_>) -> Result<bool> {
        let pending = self.plan(doc, ctx)?;
        if pending.is_empty() {
            return Ok(false);
        }

        let backup = ctx.backups.create(ctx.config_path)?;

        let mut completed: Vec<&PendingMove> = Vec::new();
        for step in &pending {
            match ctx.mover.relocate(&step.bare, &step.from, &step.to) {
                Ok(()) => {
                    tracing::info!(entry = %step.key, to = %step.to.display(), "Moved worktree");
                    completed.push(step);
                }
                Err(e) => {
                    tracing::error!(entry = %step.key, error = %e, "Worktree move failed, rolling back");
                    let mut entries = vec![step.describe()];
                    for done in completed.iter().rev() {
                        if let Err(rollback) = ctx.mover.relocate(&done.bare, &done.to, &done.from) {
                            tracing::error!(entry = %done.key, error = %rollback, "Rollback failed");
                            entries.push(format!("{} [rollback failed: {rollback}]", done.describe()));
                        }
                    }
                    return Err(Error::MigrationFailed {
                        backup,
                        reason: format!("could not move {}: {e}", step.key),
                        entries,
                    });
                }
            }
        }

        Ok(true)
    }
}

/// 0.3.0: store `base_dir` as an absolute path.
struct AbsoluteBaseDir;

impl Migration for AbsoluteBaseDir {
    fn target(&self) -> Version {
        Version::new(0, 3, 0)
    }

    fn description(&self) -> &'static str {
        "make base_dir absolute"
    }

    fn apply(&self, doc: &mut Mapping, ctx: &MigrationContext<'_>) -> Result<bool> {
        let absolute = base_dir_of(doc, ctx)?;
        let absolute = Value::String(absolute.to_string_lossy().to_string());
        if doc.get(BASE_DIR_KEY) == Some(&absolute) {
            return Ok(false);
        }
        doc.insert(BASE_DIR_KEY.into(), absolute);
        Ok(true)
    }
}
