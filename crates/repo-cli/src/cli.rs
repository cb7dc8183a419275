//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

/// repo - Git worktrees on top of shared bare clones
#[derive(Parser, Debug)]
#[command(name = "repo")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file to use instead of ~/.repo-cli/config.yaml
    #[arg(long, global = true, env = "REPO_CLI_CONFIG", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// The command to run
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Create the config file and base directory
    ///
    /// Examples:
    ///   repo init
    ///   repo init --base-dir ~/src
    Init {
        /// Directory holding bare clones and worktrees
        #[arg(long, default_value = "~/code")]
        base_dir: String,

        /// Overwrite an existing config
        #[arg(long)]
        force: bool,
    },

    /// Register a repository alias
    ///
    /// Examples:
    ///   repo register demo git@github.com:acme/demo.git
    Register {
        /// Short name used in other commands
        alias: String,

        /// Git remote URL (SSH or HTTPS)
        url: String,

        /// Overwrite an existing alias
        #[arg(long)]
        force: bool,

        /// Update an existing bare clone's origin without asking
        #[arg(short, long)]
        yes: bool,
    },

    /// Create a worktree for a branch
    ///
    /// The branch is checked out if it exists locally, tracked if it only
    /// exists on origin, and created otherwise.
    ///
    /// Examples:
    ///   repo create demo feature/login
    ///   repo create demo hotfix --from v1.2.0
    Create {
        /// Repository alias
        repo: String,

        /// Branch name
        branch: String,

        /// Start point for a new branch (branch, tag or commit)
        #[arg(long = "from", value_name = "REF")]
        from: Option<String>,

        /// URL to register the repository with if it is unknown
        #[arg(long)]
        url: Option<String>,
    },

    /// List worktrees with their PR status
    List {
        /// Only show worktrees of this repository
        repo: Option<String>,
    },

    /// Remove a worktree
    Delete {
        /// Repository alias
        repo: String,

        /// Branch name
        branch: String,

        /// Skip confirmation
        #[arg(short, long)]
        yes: bool,

        /// Also delete the local branch
        #[arg(long)]
        delete_branch: bool,

        /// Also delete the branch on origin
        #[arg(long)]
        delete_remote: bool,

        /// Delete branches even if they are not merged
        #[arg(long)]
        force: bool,
    },

    /// Show or enter a worktree
    ///
    /// Examples:
    ///   cd "$(repo activate demo feature/login --print)"
    ///   repo activate demo feature/login --shell
    Activate {
        /// Repository alias
        repo: String,

        /// Branch name
        branch: String,

        /// Print the path only
        #[arg(short, long, conflicts_with = "shell")]
        print: bool,

        /// Start $SHELL inside the worktree
        #[arg(short, long)]
        shell: bool,
    },

    /// Link a pull request to a worktree
    PrLink {
        /// Repository alias
        repo: String,

        /// Branch name
        branch: String,

        /// Pull request number
        number: u64,
    },

    /// Check the environment and config for problems
    Doctor,

    /// Generate shell completions
    ///
    /// Examples:
    ///   repo completions bash > ~/.local/share/bash-completion/completions/repo
    ///   repo completions zsh > ~/.zfunc/_repo
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}
