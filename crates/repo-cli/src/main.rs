//! repo - Git worktrees on top of shared bare clones

mod cli;
mod commands;
mod context;
mod error;
mod interactive;

use std::process::ExitCode;

use clap::Parser;
use colored::Colorize;
use tracing::Level;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use cli::{Cli, Commands};
use context::Context;
use error::Result;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let Some(command) = cli.command else {
        println!(
            "{} Run {} to see available commands.",
            "repo".cyan().bold(),
            "repo --help".yellow()
        );
        return Ok(());
    };

    // Completions need no config.
    if let Commands::Completions { shell } = command {
        commands::completions::run_completions(shell);
        return Ok(());
    }

    let ctx = Context::new(cli.config)?;
    execute_command(&ctx, command)
}

fn init_tracing(verbose: bool) {
    let builder = FmtSubscriber::builder()
        .with_writer(std::io::stderr)
        .with_target(verbose);
    let result = if verbose {
        tracing::subscriber::set_global_default(builder.with_max_level(Level::DEBUG).finish())
    } else {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
        tracing::subscriber::set_global_default(builder.with_env_filter(filter).finish())
    };
    if let Err(e) = result {
        eprintln!("{}: failed to set up logging: {}", "warning".yellow(), e);
    }
}

fn execute_command(ctx: &Context, command: Commands) -> Result<()> {
    match command {
        Commands::Init { base_dir, force } => commands::init::run_init(ctx, &base_dir, force),
        Commands::Register {
            alias,
            url,
            force,
            yes,
        } => commands::register::run_register(ctx, &alias, &url, force, yes),
        Commands::Create {
            repo,
            branch,
            from,
            url,
        } => commands::create::run_create(ctx, &repo, &branch, from, url),
        Commands::List { repo } => commands::list::run_list(ctx, repo.as_deref()),
        Commands::Delete {
            repo,
            branch,
            yes,
            delete_branch,
            delete_remote,
            force,
        } => commands::delete::run_delete(
            ctx,
            &repo,
            &branch,
            commands::delete::DeleteArgs {
                yes,
                delete_branch,
                delete_remote,
                force,
            },
        ),
        Commands::Activate {
            repo,
            branch,
            print,
            shell,
        } => commands::activate::run_activate(ctx, &repo, &branch, print, shell),
        Commands::PrLink {
            repo,
            branch,
            number,
        } => commands::pr::run_pr_link(ctx, &repo, &branch, number),
        Commands::Doctor => commands::doctor::run_doctor(ctx),
        Commands::Completions { shell } => {
            commands::completions::run_completions(shell);
            Ok(())
        }
    }
}
