//! Create command

use colored::Colorize;
use repo_core::CreateOptions;
use repo_git::CheckoutKind;

use crate::context::Context;
use crate::error::Result;
use crate::interactive;

use super::print_warnings;

pub fn run_create(
    ctx: &Context,
    repo: &str,
    branch: &str,
    from: Option<String>,
    url: Option<String>,
) -> Result<()> {
    let mut config = ctx.store.load()?;

    let url = match url {
        Some(url) => Some(url),
        None if config.repo(repo).is_none() => {
            repo_git::validate_repo_alias(repo)?;
            println!("{} Repository '{}' is not registered", "=>".blue().bold(), repo);
            Some(interactive::prompt_url(repo)?)
        }
        None => None,
    };
    if url.is_some() && config.repo(repo).is_some() {
        tracing::debug!(repo, "Already registered, ignoring --url");
    }

    println!(
        "{} Creating worktree for {}/{}",
        "=>".blue().bold(),
        repo.cyan(),
        branch.cyan()
    );
    let options = CreateOptions {
        start_point: from,
        url,
    };
    let outcome = ctx
        .lifecycle()
        .create_worktree(&mut config, repo, branch, &options)?;

    if outcome.registered {
        println!("{} Registered {}", "OK".green().bold(), repo.cyan());
    }
    if outcome.cloned {
        println!("{} Cloned bare repository", "OK".green().bold());
    }
    print_warnings(&outcome.warnings);

    let how = match outcome.kind {
        CheckoutKind::ExistingLocal => "existing".to_string(),
        CheckoutKind::TrackRemote => format!("tracking {}", outcome.start_ref),
        CheckoutKind::NewBranch => format!("new, from {}", outcome.start_ref),
    };
    println!(
        "{} Created worktree {}",
        "OK".green().bold(),
        outcome.path.display().to_string().cyan()
    );
    println!("   Branch: {} ({})", branch.cyan(), how);
    if outcome.submodules > 0 {
        println!("   Initialized {} submodule(s)", outcome.submodules);
    }

    println!();
    println!("  cd {}", outcome.path.display());
    Ok(())
}
