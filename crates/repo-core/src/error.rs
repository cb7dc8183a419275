//! Error types for repo-core

use std::path::PathBuf;

/// Result type for repo-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in repo-core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Configuration file not found at expected path
    #[error("Config not found at {path}. Run 'repo init' first")]
    ConfigNotFound { path: PathBuf },

    /// `init` without `--force` on an existing config
    #[error("Config already exists at {path}. Use --force to overwrite")]
    ConfigExists { path: PathBuf },

    /// Persisted config is malformed. Never auto-repaired.
    #[error("Config at {path} is corrupt: {reason}{}", backup_hint(.backup))]
    ConfigCorrupt {
        path: PathBuf,
        reason: String,
        backup: Option<PathBuf>,
    },

    /// A structural migration failed and could not be fully undone.
    #[error(
        "Config migration failed: {reason}. Backup saved at {backup}. Entries needing manual repair: {}",
        .entries.join(", ")
    )]
    MigrationFailed {
        backup: PathBuf,
        reason: String,
        entries: Vec<String>,
    },

    #[error("Invalid git URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Repository '{alias}' is not registered")]
    UnknownRepo { alias: String },

    #[error("Repository '{alias}' is already registered. Use --force to overwrite")]
    AliasExists { alias: String },

    #[error("No worktree for {repo}::{branch}")]
    WorktreeNotFound { repo: String, branch: String },

    #[error("Worktree for {repo}::{branch} already exists at {path}")]
    WorktreeExists {
        repo: String,
        branch: String,
        path: PathBuf,
    },

    #[error("Branch '{branch}' is not merged into '{into}'. Use --force to delete it anyway")]
    BranchNotMerged { branch: String, into: String },

    #[error("{0}")]
    Validation(String),

    #[error("Could not determine home directory")]
    NoHomeDir,

    /// PR provider failure. Only surfaced by callers that opt in; status
    /// queries degrade to unknown instead.
    #[error("`{command}` failed: {stderr}")]
    Provider { command: String, stderr: String },

    // Transparent wrappers for underlying crate errors
    /// Filesystem error from repo-fs
    #[error(transparent)]
    Fs(#[from] repo_fs::Error),

    /// Git error from repo-git
    #[error(transparent)]
    Git(#[from] repo_git::Error),

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

fn backup_hint(backup: &Option<PathBuf>) -> String {
    match backup {
        Some(path) => format!(". Most recent backup: {}", path.display()),
        None => String::new(),
    }
}

/// Coarse category of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad input from the user; nothing was attempted.
    UserInput,
    /// git or the PR provider failed or is missing.
    ExternalTool,
    /// Persisted data is malformed.
    Corruption,
    /// A structural migration left entries needing manual repair.
    FatalMigration,
    /// Anything else (I/O, environment).
    Environment,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        use repo_git::Error as GitError;

        match self {
            Self::ConfigNotFound { .. }
            | Self::ConfigExists { .. }
            | Self::InvalidUrl { .. }
            | Self::UnknownRepo { .. }
            | Self::AliasExists { .. }
            | Self::WorktreeNotFound { .. }
            | Self::WorktreeExists { .. }
            | Self::BranchNotMerged { .. }
            | Self::Validation(_) => ErrorKind::UserInput,
            Self::Git(
                GitError::InvalidBranchName { .. }
                | GitError::InvalidRepoAlias { .. }
                | GitError::InvalidStartPoint { .. },
            ) => ErrorKind::UserInput,
            Self::Git(GitError::Decode(_)) => ErrorKind::Corruption,
            Self::Git(_) | Self::Provider { .. } => ErrorKind::ExternalTool,
            Self::ConfigCorrupt { .. } => ErrorKind::Corruption,
            Self::MigrationFailed { .. } => ErrorKind::FatalMigration,
            Self::Fs(repo_fs::Error::ConfigParse { .. }) => ErrorKind::Corruption,
            Self::Fs(repo_fs::Error::PathEscapesBase { .. }) => ErrorKind::UserInput,
            Self::Fs(_) | Self::Io(_) | Self::NoHomeDir => ErrorKind::Environment,
        }
    }
}
