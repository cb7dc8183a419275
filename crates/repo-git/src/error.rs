//! Error types for repo-git

use std::path::PathBuf;

/// Result type for repo-git operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in repo-git operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("git is not installed or not on PATH")]
    NotInstalled,

    #[error("`{command}` failed: {stderr}")]
    CommandFailed {
        command: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("Worktree at {path} has initialized submodules: {stderr}")]
    SubmodulesBlockRemoval { path: PathBuf, stderr: String },

    #[error("Git error: {0}")]
    Git2(#[from] git2::Error),

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid branch name '{name}': {reason}")]
    InvalidBranchName { name: String, reason: String },

    #[error("Invalid repo alias '{alias}': {reason}")]
    InvalidRepoAlias { alias: String, reason: String },

    #[error("Invalid start point '{start_point}': {reason}")]
    InvalidStartPoint { start_point: String, reason: String },

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(
        "Could not determine the default branch of {repo}: HEAD is {head} and neither 'main' nor 'master' exists"
    )]
    DefaultBranchUnresolved { repo: PathBuf, head: String },
}

impl Error {
    /// Stderr text of a failed git invocation, if this error carries one.
    pub fn stderr(&self) -> Option<&str> {
        match self {
            Self::CommandFailed { stderr, .. } | Self::SubmodulesBlockRemoval { stderr, .. } => {
                Some(stderr)
            }
            _ => None,
        }
    }
}

/// A worktree directory segment that is not a valid encoding of a branch name.
///
/// Signals on-disk corruption; callers surface it, never repair it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("truncated escape sequence at byte {offset} in '{segment}'")]
    Truncated { segment: String, offset: usize },

    #[error("invalid escape sequence '{sequence}' at byte {offset} in '{segment}'")]
    InvalidEscape {
        segment: String,
        offset: usize,
        sequence: String,
    },

    #[error("unescaped path separator at byte {offset} in '{segment}'")]
    UnescapedSeparator { segment: String, offset: usize },

    #[error("decoded name is not valid UTF-8: '{segment}'")]
    NotUtf8 { segment: String },
}
