//! PR link command

use colored::Colorize;

use crate::context::Context;
use crate::error::Result;

use super::print_warnings;

pub fn run_pr_link(ctx: &Context, repo: &str, branch: &str, number: u64) -> Result<()> {
    let mut config = ctx.store.load()?;
    let outcome = repo_core::link_pr(&ctx.store, &mut config, repo, branch, number, &ctx.gh)?;

    if let Some(status) = outcome.status {
        println!("{} Verified PR #{} ({})", "OK".green().bold(), number, status);
    }
    print_warnings(&outcome.warnings);
    println!(
        "{} Linked PR #{} to {}/{}",
        "OK".green().bold(),
        number,
        repo.cyan(),
        branch.cyan()
    );
    Ok(())
}
