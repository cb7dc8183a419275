//! Persisted config model
//!
//! ```yaml
//! version: 0.3.0
//! base_dir: /home/me/code
//! repos:
//!   demo:
//!     url: git@github.com:acme/demo.git
//!     owner_repo: acme/demo
//! worktrees:
//!   demo::feature/login:
//!     repo: demo
//!     branch: feature/login
//!     pr: 42
//!     start_point: main
//!     created_at: 2025-01-01T12:00:00Z
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDateTime, Utc};
use semver::Version;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use repo_git::validate::KEY_DELIMITER;

/// Schema version written by this build.
pub const CURRENT_VERSION: Version = Version::new(0, 3, 0);

/// Composite key of a worktree entry.
///
/// Only becomes the string `repo::branch` when written to disk. Neither an
/// alias nor a branch can contain `::`, so the split is unambiguous.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WorktreeKey {
    pub repo: String,
    pub branch: String,
}

impl WorktreeKey {
    pub fn new(repo: impl Into<String>, branch: impl Into<String>) -> Self {
        Self {
            repo: repo.into(),
            branch: branch.into(),
        }
    }

    /// Parse a serialized key. Splits on the first delimiter.
    pub fn parse(key: &str) -> Option<Self> {
        let (repo, branch) = key.split_once(KEY_DELIMITER)?;
        if repo.is_empty() || branch.is_empty() {
            return None;
        }
        Some(Self::new(repo, branch))
    }
}

impl fmt::Display for WorktreeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{KEY_DELIMITER}{}", self.repo, self.branch)
    }
}

impl Serialize for WorktreeKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for WorktreeKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).ok_or_else(|| {
            serde::de::Error::custom(format!("worktree key '{raw}' is not of the form repo::branch"))
        })
    }
}

/// A registered repository. The alias is its key in [`Config::repos`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoEntry {
    pub url: String,
    /// `owner/name` for GitHub-family hosts only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_repo: Option<String>,
}

/// One checked-out branch of one repository.
///
/// Holds no path: the directory is always derived from
/// `(base_dir, repo, branch)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorktreeEntry {
    pub repo: String,
    pub branch: String,
    #[serde(default)]
    pub pr: Option<u64>,
    /// The ref the branch was actually created from, after resolution.
    #[serde(default)]
    pub start_point: Option<String>,
    #[serde(default, deserialize_with = "deserialize_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
}

impl WorktreeEntry {
    pub fn new(repo: impl Into<String>, branch: impl Into<String>, start_point: impl Into<String>) -> Self {
        Self {
            repo: repo.into(),
            branch: branch.into(),
            pr: None,
            start_point: Some(start_point.into()),
            created_at: Some(Utc::now()),
        }
    }

    pub fn key(&self) -> WorktreeKey {
        WorktreeKey::new(&self.repo, &self.branch)
    }
}

/// Accepts RFC 3339 as well as the naive ISO timestamps older versions
/// wrote (`2025-01-01T12:00:00.123456`), read as UTC.
fn deserialize_timestamp<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<Option<DateTime<Utc>>, D::Error> {
    let Some(raw) = Option::<String>::deserialize(deserializer)? else {
        return Ok(None);
    };
    if let Ok(parsed) = DateTime::parse_from_rfc3339(&raw) {
        return Ok(Some(parsed.with_timezone(&Utc)));
    }
    NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| Some(naive.and_utc()))
        .map_err(|e| serde::de::Error::custom(format!("invalid created_at '{raw}': {e}")))
}

/// Aggregate root of everything persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub version: Version,
    pub base_dir: PathBuf,
    #[serde(default)]
    pub repos: BTreeMap<String, RepoEntry>,
    #[serde(default)]
    pub worktrees: BTreeMap<WorktreeKey, WorktreeEntry>,
}

impl Config {
    /// An empty config at the current schema version.
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            version: CURRENT_VERSION,
            base_dir: base_dir.into(),
            repos: BTreeMap::new(),
            worktrees: BTreeMap::new(),
        }
    }

    pub fn repo(&self, alias: &str) -> Option<&RepoEntry> {
        self.repos.get(alias)
    }

    pub fn worktree(&self, repo: &str, branch: &str) -> Option<&WorktreeEntry> {
        self.worktrees.get(&WorktreeKey::new(repo, branch))
    }

    pub fn worktree_mut(&mut self, repo: &str, branch: &str) -> Option<&mut WorktreeEntry> {
        self.worktrees.get_mut(&WorktreeKey::new(repo, branch))
    }

    /// Worktrees, optionally restricted to one repository, in key order.
    pub fn worktrees_for<'a>(
        &'a self,
        repo: Option<&'a str>,
    ) -> impl Iterator<Item = &'a WorktreeEntry> + 'a {
        self.worktrees
            .values()
            .filter(move |entry| repo.is_none_or(|r| entry.repo == r))
    }

    /// Directory of the worktree for `(repo, branch)`.
    pub fn worktree_path(&self, repo: &str, branch: &str) -> repo_git::Result<PathBuf> {
        repo_git::worktree_dir(&self.base_dir, repo, branch)
    }

    /// Directory of the bare repository for `alias`.
    pub fn bare_repo_path(&self, alias: &str) -> repo_git::Result<PathBuf> {
        repo_git::bare_repo_dir(&self.base_dir, alias)
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Consistency checks serde cannot express.
    pub(crate) fn check_consistency(&self) -> std::result::Result<(), String> {
        if !self.base_dir.is_absolute() {
            return Err(format!("base_dir '{}' is not absolute", self.base_dir.display()));
        }
        for (key, entry) in &self.worktrees {
            if *key != entry.key() {
                return Err(format!(
                    "worktree key '{key}' does not match its entry ({}::{})",
                    entry.repo, entry.branch
                ));
            }
        }
        Ok(())
    }
}
