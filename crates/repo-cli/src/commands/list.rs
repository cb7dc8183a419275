//! List command

use colored::Colorize;
use repo_core::PrStatus;

use crate::context::Context;
use crate::error::Result;

pub fn run_list(ctx: &Context, repo: Option<&str>) -> Result<()> {
    let config = ctx.store.load()?;
    let entries: Vec<_> = config.worktrees_for(repo).collect();

    if entries.is_empty() {
        match repo {
            Some(repo) => println!("No worktrees found for '{}'", repo),
            None => println!(
                "No worktrees found. Create one with {}",
                "repo create <repo> <branch>".yellow()
            ),
        }
        return Ok(());
    }

    // Pad before coloring; escape codes would count toward the width.
    println!(
        "{} {} {} {}",
        format!("{:<16}", "REPO").bold(),
        format!("{:<32}", "BRANCH").bold(),
        format!("{:<8}", "PR").bold(),
        "STATUS".bold()
    );
    for entry in entries {
        let pr = entry
            .pr
            .map(|n| format!("#{n}"))
            .unwrap_or_else(|| "-".to_string());
        let status = match repo_core::pr_status(&config, &entry.repo, &entry.branch, &ctx.gh) {
            None | Some(PrStatus::Unknown) => "-".dimmed(),
            Some(PrStatus::Merged) => PrStatus::Merged.label().green(),
            Some(PrStatus::Closed) => PrStatus::Closed.label().red(),
            Some(PrStatus::Draft) => PrStatus::Draft.label().dimmed(),
            Some(status) => status.label().yellow(),
        };
        println!(
            "{} {:<32} {:<8} {}",
            format!("{:<16}", entry.repo).cyan(),
            entry.branch,
            pr,
            status
        );
    }
    Ok(())
}
