//! Git remote URL parsing and PR status lookup
//!
//! PR features are optional: a non-GitHub host simply has no `owner_repo`,
//! and a missing or failing `gh` turns every status into
//! [`PrStatus::Unknown`].

use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::{LazyLock, OnceLock};

use regex::Regex;
use serde::Deserialize;

use crate::{Error, Result};

/// `user@host:path`
static SCP_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9._-]+@([A-Za-z0-9.-]+):([^/].*)$").expect("static regex")
});

/// `scheme://[user@]host[:port]/path`
static SCHEME_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:https?|ssh|git)://(?:[^@/]+@)?([A-Za-z0-9.-]+)(?::[0-9]+)?/(.+)$")
        .expect("static regex")
});

static PATH_SEGMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9._-]+$").expect("static regex"));

/// The parts of a git remote URL repo cares about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitUrl {
    pub host: String,
    /// Everything before the final path segment, e.g. `acme` or
    /// `group/subgroup`.
    pub owner: String,
    /// Final path segment without `.git`.
    pub name: String,
}

impl GitUrl {
    /// `github.com` and GitHub Enterprise hosts (`github.<domain>`).
    pub fn is_github(&self) -> bool {
        let host = self.host.to_ascii_lowercase();
        host == "github.com" || host.starts_with("github.")
    }

    /// `owner/name` when the host is GitHub-family and the path has exactly
    /// two segments.
    pub fn owner_repo(&self) -> Option<String> {
        (self.is_github() && !self.owner.contains('/'))
            .then(|| format!("{}/{}", self.owner, self.name))
    }
}

/// Parse an SSH (`git@host:owner/repo.git`, `ssh://...`) or HTTPS remote URL.
pub fn parse_git_url(url: &str) -> Result<GitUrl> {
    let invalid = |reason: &str| Error::InvalidUrl {
        url: url.to_string(),
        reason: reason.to_string(),
    };

    let url_trimmed = url.trim();
    if url_trimmed.is_empty() {
        return Err(invalid("URL cannot be empty"));
    }

    let captures = SCHEME_URL
        .captures(url_trimmed)
        .or_else(|| SCP_URL.captures(url_trimmed))
        .ok_or_else(|| invalid("expected git@host:owner/repo or https://host/owner/repo"))?;

    let host = captures[1].to_string();
    let path = captures[2].trim_end_matches('/');
    let path = path.strip_suffix(".git").unwrap_or(path);

    let segments: Vec<&str> = path.split('/').collect();
    if segments.len() < 2 {
        return Err(invalid("path must contain an owner and a repository name"));
    }
    if let Some(bad) = segments
        .iter()
        .find(|s| !PATH_SEGMENT.is_match(s) || s.chars().all(|c| c == '.'))
    {
        return Err(invalid(&format!("invalid path segment '{bad}'")));
    }

    let (name, owner) = segments.split_last().ok_or_else(|| invalid("empty path"))?;
    Ok(GitUrl {
        host,
        owner: owner.join("/"),
        name: (*name).to_string(),
    })
}

/// True for `file://` URLs and absolute filesystem paths, which git clones
/// directly and which never have a PR host.
pub fn is_local_url(url: &str) -> bool {
    let url = url.trim();
    match url.strip_prefix("file://") {
        Some(rest) => !rest.is_empty(),
        None => Path::new(url).is_absolute(),
    }
}

/// Validate `url` and derive its `owner/name` slug, if it has one.
pub fn owner_repo_from_url(url: &str) -> Result<Option<String>> {
    if is_local_url(url) {
        return Ok(None);
    }
    Ok(parse_git_url(url)?.owner_repo())
}

/// Coarse PR state shown next to a worktree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrStatus {
    Open,
    InReview,
    Draft,
    Merged,
    Closed,
    Unknown,
}

impl PrStatus {
    pub fn label(self) -> &'static str {
        match self {
            Self::Open => "Open",
            Self::InReview => "In Review",
            Self::Draft => "Draft",
            Self::Merged => "Merged",
            Self::Closed => "Closed",
            Self::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for PrStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// `gh pr view --json state,isDraft,reviewDecision` output.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrView {
    pub state: String,
    #[serde(default)]
    pub is_draft: bool,
    #[serde(default)]
    pub review_decision: Option<String>,
}

impl From<&PrView> for PrStatus {
    fn from(view: &PrView) -> Self {
        match view.state.as_str() {
            "MERGED" => Self::Merged,
            "CLOSED" => Self::Closed,
            "OPEN" if view.is_draft => Self::Draft,
            "OPEN" if view.review_decision.as_deref() == Some("REVIEW_REQUIRED") => Self::InReview,
            "OPEN" => Self::Open,
            _ => Self::Unknown,
        }
    }
}

/// Source of PR status.
pub trait PrStatusProvider {
    fn is_available(&self) -> bool;

    /// Status of PR `number` in `owner_repo`. Errors are for callers that
    /// want to tell "not found" from "unknown"; most degrade instead.
    fn status(&self, number: u64, owner_repo: &str) -> Result<PrStatus>;
}

/// The GitHub CLI.
///
/// Availability is probed once per handle and remembered, so listing many
/// worktrees spawns `gh --version` a single time.
#[derive(Debug, Clone)]
pub struct GhCli {
    program: PathBuf,
    available: OnceLock<bool>,
}

impl Default for GhCli {
    fn default() -> Self {
        Self::with_program("gh")
    }
}

impl GhCli {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            available: OnceLock::new(),
        }
    }

    fn run(&self, args: &[&str]) -> Result<String> {
        let command = format!("{} {}", self.program.display(), args.join(" "));
        tracing::debug!(%command, "Running gh");

        let output = Command::new(&self.program)
            .args(args)
            .output()
            .map_err(|e| Error::Provider {
                command: command.clone(),
                stderr: e.to_string(),
            })?;

        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).to_string())
        } else {
            Err(Error::Provider {
                command,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            })
        }
    }
}

impl PrStatusProvider for GhCli {
    fn is_available(&self) -> bool {
        *self.available.get_or_init(|| {
            let available = self.run(&["--version"]).is_ok();
            tracing::debug!(program = %self.program.display(), available, "Checked for gh");
            available
        })
    }

    fn status(&self, number: u64, owner_repo: &str) -> Result<PrStatus> {
        let number = number.to_string();
        let stdout = self.run(&[
            "pr",
            "view",
            &number,
            "--repo",
            owner_repo,
            "--json",
            "state,isDraft,reviewDecision",
        ])?;

        let view: PrView = serde_json::from_str(&stdout).map_err(|e| Error::Provider {
            command: format!("gh pr view {number}"),
            stderr: format!("unexpected output: {e}"),
        })?;
        Ok(PrStatus::from(&view))
    }
}
