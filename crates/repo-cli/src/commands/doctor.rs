//! Doctor command
//!
//! Read-only health checks: tools on PATH, the config, the base directory
//! and whether the directories in it still match the config.

use std::path::Path;

use colored::Colorize;
use repo_core::{Config, PrStatusProvider};
use repo_git::command::parse_version;

use crate::context::Context;
use crate::error::{CliError, Result};

/// `git worktree` subcommands used here need at least this version.
const MIN_GIT_VERSION: (u32, u32) = (2, 17);

const WRITE_PROBE: &str = ".repo-cli-write-test";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Level {
    Pass,
    Warn,
    Fail,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Check {
    level: Level,
    message: String,
}

impl Check {
    fn pass(message: impl Into<String>) -> Self {
        Self {
            level: Level::Pass,
            message: message.into(),
        }
    }

    fn warn(message: impl Into<String>) -> Self {
        Self {
            level: Level::Warn,
            message: message.into(),
        }
    }

    fn fail(message: impl Into<String>) -> Self {
        Self {
            level: Level::Fail,
            message: message.into(),
        }
    }

    fn print(&self) {
        let tag = match self.level {
            Level::Pass => "OK".green().bold(),
            Level::Warn => "WARN".yellow().bold(),
            Level::Fail => "FAIL".red().bold(),
        };
        println!("{} {}", tag, self.message);
    }
}

pub fn run_doctor(ctx: &Context) -> Result<()> {
    println!("{} Checking repo setup", "=>".blue().bold());

    let mut checks = vec![check_git(ctx), check_gh(ctx)];
    match ctx.store.load_with_report() {
        Ok((config, report)) => {
            let message = if report.applied.is_empty() {
                format!("Config {} (schema {})", ctx.store.path().display(), config.version)
            } else {
                format!(
                    "Config {} migrated {} -> {}",
                    ctx.store.path().display(),
                    report.from,
                    report.to
                )
            };
            checks.push(Check::pass(message));
            checks.extend(check_base_dir(&config.base_dir));
            if config.base_dir.is_dir() {
                checks.extend(scan_base_dir(&config)?);
            }
        }
        Err(e) => checks.push(Check::fail(e.to_string())),
    }

    for check in &checks {
        check.print();
    }

    println!();
    let failed = checks.iter().filter(|c| c.level == Level::Fail).count();
    if failed == 0 {
        println!("{} All checks passed", "OK".green().bold());
        Ok(())
    } else {
        println!(
            "Tip: run {} to create a fresh config",
            "repo init --base-dir ~/code".yellow()
        );
        Err(CliError::user(format!("{failed} check(s) failed")))
    }
}

fn check_git(ctx: &Context) -> Check {
    match ctx.git.version() {
        Ok(output) => match parse_version(&output) {
            Some(version) if version >= MIN_GIT_VERSION => Check::pass(output.trim().to_string()),
            Some((major, minor)) => Check::warn(format!(
                "git {major}.{minor} is older than {}.{}; worktree commands may fail",
                MIN_GIT_VERSION.0, MIN_GIT_VERSION.1
            )),
            None => Check::warn(format!("Unrecognized git version: {}", output.trim())),
        },
        Err(e) => Check::fail(format!("git not usable: {e}")),
    }
}

fn check_gh(ctx: &Context) -> Check {
    if ctx.gh.is_available() {
        Check::pass("GitHub CLI (gh) available")
    } else {
        Check::warn("GitHub CLI (gh) not found; PR features will be limited")
    }
}

fn check_base_dir(base_dir: &Path) -> Vec<Check> {
    let shown = base_dir.display();
    if !base_dir.exists() {
        return vec![Check::warn(format!(
            "Base directory {shown} does not exist yet; it is created on first use"
        ))];
    }
    if !base_dir.is_dir() {
        return vec![Check::fail(format!("Base directory {shown} is not a directory"))];
    }

    let probe = base_dir.join(WRITE_PROBE);
    let writable = std::fs::write(&probe, b"").is_ok();
    if writable && let Err(e) = std::fs::remove_file(&probe) {
        tracing::debug!(path = %probe.display(), error = %e, "Could not remove write probe");
    }
    if writable {
        vec![Check::pass(format!("Base directory {shown} is writable"))]
    } else {
        vec![Check::fail(format!("Base directory {shown} is not writable"))]
    }
}

/// Compare the directories under the base dir with the recorded worktrees.
fn scan_base_dir(config: &Config) -> Result<Vec<Check>> {
    let mut checks = Vec::new();

    // Longest alias first so `app-web` is the reported guess for `app-web-main`.
    let mut aliases: Vec<&str> = config.repos.keys().map(String::as_str).collect();
    aliases.sort_by_key(|a| std::cmp::Reverse(a.len()));

    let mut names: Vec<String> = std::fs::read_dir(&config.base_dir)?
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path().is_dir())
        .filter_map(|entry| entry.file_name().to_str().map(str::to_string))
        .collect();
    names.sort();

    for name in names {
        if let Some(alias) = name.strip_suffix(".git") {
            if !config.repos.contains_key(alias) {
                checks.push(Check::warn(format!(
                    "Bare repository {name} has no registered alias"
                )));
            }
            continue;
        }

        // `app-web-main` may be `app-web/main` or `app/web-main`; any
        // recorded reading claims it.
        let mut candidates = Vec::new();
        let mut invalid = None;
        for alias in &aliases {
            match repo_git::naming::parse_worktree_dir_name(&name, alias) {
                Ok(Some(branch)) => candidates.push((*alias, branch)),
                Ok(None) => {}
                Err(e) => {
                    invalid.get_or_insert(e);
                }
            }
        }
        if candidates
            .iter()
            .any(|(alias, branch)| config.worktree(alias, branch).is_some())
        {
            continue;
        }
        match (candidates.first(), invalid) {
            (Some((alias, branch)), _) => checks.push(Check::warn(format!(
                "{name} looks like {alias}/{branch} but is not in the config"
            ))),
            (None, Some(e)) => checks.push(Check::fail(format!("{name}: {e}"))),
            (None, None) => tracing::debug!(dir = %name, "Ignoring unrelated directory"),
        }
    }

    for entry in config.worktrees.values() {
        let path = config.worktree_path(&entry.repo, &entry.branch)?;
        if !path.exists() {
            checks.push(Check::warn(format!(
                "{}/{} is recorded but {} is missing",
                entry.repo,
                entry.branch,
                path.display()
            )));
        }
    }

    if checks.is_empty() {
        checks.push(Check::pass(format!(
            "{} worktree(s) match the base directory",
            config.worktrees.len()
        )));
    }
    Ok(checks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use repo_core::{RepoEntry, WorktreeEntry};
    use tempfile::TempDir;

    fn config_in(dir: &TempDir) -> Config {
        let mut config = Config::new(dir.path());
        for alias in ["app", "app-web"] {
            config.repos.insert(
                alias.to_string(),
                RepoEntry {
                    url: format!("https://example.com/{alias}.git"),
                    owner_repo: None,
                },
            );
        }
        config
    }

    fn record(config: &mut Config, repo: &str, branch: &str) {
        let entry = WorktreeEntry::new(repo, branch, "main");
        config.worktrees.insert(entry.key(), entry);
    }

    #[test]
    fn test_scan_clean_layout() {
        let dir = TempDir::new().unwrap();
        let mut config = config_in(&dir);
        record(&mut config, "app", "feature/x");
        std::fs::create_dir(dir.path().join("app.git")).unwrap();
        std::fs::create_dir(dir.path().join("app-feature%2Fx")).unwrap();

        let checks = scan_base_dir(&config).unwrap();
        assert_eq!(checks.len(), 1);
        assert_eq!(checks[0].level, Level::Pass);
    }

    #[test]
    fn test_scan_reports_orphans_and_missing() {
        let dir = TempDir::new().unwrap();
        let mut config = config_in(&dir);
        record(&mut config, "app", "gone");
        std::fs::create_dir(dir.path().join("app-web-main")).unwrap();
        std::fs::create_dir(dir.path().join("other.git")).unwrap();

        let checks = scan_base_dir(&config).unwrap();
        let messages: Vec<_> = checks.iter().map(|c| c.message.as_str()).collect();
        assert!(messages.iter().any(|m| m.contains("app-web/main")));
        assert!(messages.iter().any(|m| m.contains("other.git")));
        assert!(messages.iter().any(|m| m.contains("app/gone")));
        assert!(checks.iter().all(|c| c.level == Level::Warn));
    }

    #[test]
    fn test_scan_accepts_dir_claimed_by_shorter_alias() {
        let dir = TempDir::new().unwrap();
        let mut config = config_in(&dir);
        record(&mut config, "app", "web-main");
        std::fs::create_dir(dir.path().join("app-web-main")).unwrap();

        let checks = scan_base_dir(&config).unwrap();
        assert_eq!(checks.len(), 1);
        assert_eq!(checks[0].level, Level::Pass);
    }

    #[test]
    fn test_scan_fails_on_undecodable_name() {
        let dir = TempDir::new().unwrap();
        let config = config_in(&dir);
        std::fs::create_dir(dir.path().join("app-bad%zz")).unwrap();

        let checks = scan_base_dir(&config).unwrap();
        assert_eq!(checks.len(), 1);
        assert_eq!(checks[0].level, Level::Fail);
    }

    #[test]
    fn test_base_dir_checks() {
        let dir = TempDir::new().unwrap();
        assert_eq!(check_base_dir(dir.path())[0].level, Level::Pass);
        assert_eq!(check_base_dir(&dir.path().join("nope"))[0].level, Level::Warn);

        let file = dir.path().join("file");
        std::fs::write(&file, "x").unwrap();
        assert_eq!(check_base_dir(&file)[0].level, Level::Fail);
        assert!(!dir.path().join(WRITE_PROBE).exists());
    }
}
