//! Init command

use colored::Colorize;

use crate::context::Context;
use crate::error::Result;

pub fn run_init(ctx: &Context, base_dir: &str, force: bool) -> Result<()> {
    let existed = repo_fs::expand_path(base_dir)?.is_dir();
    let config = ctx.store.init(base_dir, force)?;

    println!(
        "{} Created config at {}",
        "OK".green().bold(),
        ctx.store.path().display().to_string().cyan()
    );
    let label = if existed { "Using" } else { "Created" };
    println!(
        "{} {} base directory {}",
        "OK".green().bold(),
        label,
        config.base_dir.display().to_string().cyan()
    );

    println!();
    println!(
        "Run {} to get started.",
        "repo create <repo> <branch> --url <url>".yellow()
    );
    Ok(())
}
