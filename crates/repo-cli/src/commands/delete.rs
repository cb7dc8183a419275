//! Delete command

use colored::Colorize;
use repo_core::BranchDeletion;

use crate::context::Context;
use crate::error::Result;
use crate::interactive;

use super::print_warnings;

/// Flags of `repo delete`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeleteArgs {
    pub yes: bool,
    pub delete_branch: bool,
    pub delete_remote: bool,
    pub force: bool,
}

pub fn run_delete(ctx: &Context, repo: &str, branch: &str, args: DeleteArgs) -> Result<()> {
    let mut config = ctx.store.load()?;
    let path = repo_core::worktree_path(&config, repo, branch)?;
    let lifecycle = ctx.lifecycle();

    // Refuse before asking when the branch would lose unmerged work.
    let deletion = BranchDeletion {
        local: args.delete_branch,
        remote: args.delete_remote,
        force: args.force,
    };
    let deletes_branch = args.delete_branch || args.delete_remote;
    if deletes_branch {
        lifecycle.check_branch_deletion(&config, repo, branch, deletion)?;
    }

    if !args.yes {
        let prompt = format!("Delete worktree {}/{} at {}?", repo, branch, path.display());
        if !interactive::confirm(&prompt, false)? {
            println!("Cancelled");
            return Ok(());
        }
    }

    let outcome = lifecycle.remove_worktree(&mut config, repo, branch)?;
    print_warnings(&outcome.warnings);
    if outcome.submodules_deinitialized {
        println!("   Deinitialized submodules");
    }
    println!(
        "{} Removed worktree {}",
        "OK".green().bold(),
        outcome.path.display().to_string().cyan()
    );

    if deletes_branch {
        lifecycle.delete_branch(&config, repo, branch, deletion)?;
        if args.delete_branch {
            println!("{} Deleted local branch {}", "OK".green().bold(), branch.cyan());
        }
        if args.delete_remote {
            println!("{} Deleted origin/{}", "OK".green().bold(), branch.cyan());
        }
    }
    Ok(())
}
