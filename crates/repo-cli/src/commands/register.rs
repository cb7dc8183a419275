//! Register command

use colored::Colorize;
use repo_core::RegisterOptions;

use crate::context::Context;
use crate::error::Result;
use crate::interactive;

pub fn run_register(ctx: &Context, alias: &str, url: &str, force: bool, yes: bool) -> Result<()> {
    let mut confirm = |prompt: &str| interactive::confirm(prompt, false);
    register_with(ctx, alias, url, force, yes, &mut confirm)
}

fn register_with(
    ctx: &Context,
    alias: &str,
    url: &str,
    force: bool,
    yes: bool,
    confirm: &mut dyn FnMut(&str) -> Result<bool>,
) -> Result<()> {
    let mut config = ctx.store.load()?;

    // Replacing a registered URL needs consent before anything is saved.
    let replacing = config
        .repo(alias)
        .map(|entry| entry.url.clone())
        .filter(|current| force && current != url);
    if let Some(current) = &replacing
        && !yes
        && !confirm(&format!("Replace URL {current} with {url}?"))?
    {
        println!("Cancelled");
        return Ok(());
    }

    let lifecycle = ctx.lifecycle();
    let outcome = lifecycle.register_repo(&mut config, alias, url, RegisterOptions { force })?;

    let verb = if outcome.replaced { "Updated" } else { "Registered" };
    println!("{} {} {} -> {}", "OK".green().bold(), verb, alias.cyan(), url);
    match &outcome.owner_repo {
        Some(slug) => println!("   GitHub: {}", slug.cyan()),
        None => println!("   {}", "Not a GitHub URL; PR features are disabled".dimmed()),
    }

    if let Some(mismatch) = outcome.remote_mismatch {
        println!(
            "{} {} has origin {}",
            "warning:".yellow().bold(),
            mismatch.bare.display(),
            mismatch.current.yellow()
        );
        // An accepted URL replacement covers origin too.
        let update = yes
            || replacing.is_some()
            || confirm("Update origin to the new URL?")?;
        if update {
            lifecycle.sync_remote_url(&config, alias)?;
            println!("{} Updated origin to {}", "OK".green().bold(), mismatch.requested);
        } else {
            println!("   Origin left unchanged");
        }
    }
    Ok(())
}
