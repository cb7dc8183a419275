//! Activate command

use std::process::Command;

use colored::Colorize;

use crate::context::Context;
use crate::error::{CliError, Result};

pub fn run_activate(ctx: &Context, repo: &str, branch: &str, print: bool, shell: bool) -> Result<()> {
    let config = ctx.store.load()?;
    let path = repo_core::worktree_path(&config, repo, branch)?;

    if !path.is_dir() {
        return Err(CliError::user(format!(
            "Worktree directory {} does not exist. Run 'repo list' to check your worktrees",
            path.display()
        )));
    }

    if print {
        println!("{}", path.display());
        return Ok(());
    }

    if shell {
        let program = std::env::var("SHELL").unwrap_or_else(|_| "sh".to_string());
        tracing::debug!(shell = %program, path = %path.display(), "Starting shell");
        println!(
            "{} Entering {} (exit to return)",
            "=>".blue().bold(),
            path.display().to_string().cyan()
        );
        let status = Command::new(&program).current_dir(&path).status()?;
        if !status.success() {
            tracing::debug!(?status, "Shell exited with failure");
        }
        return Ok(());
    }

    println!("Worktree path: {}", path.display().to_string().cyan());
    println!();
    println!("  cd {}", path.display());
    println!();
    println!(
        "{}",
        format!("Tip: cd \"$(repo activate {repo} {branch} --print)\"").dimmed()
    );
    Ok(())
}
