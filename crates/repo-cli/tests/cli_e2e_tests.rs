//! End-to-end tests that run the compiled `repo` binary against a
//! temporary origin repository and base directory.

use assert_cmd::Command;
use predicates::prelude::*;
use repo_test_utils::git::{checkout, commit_file, create_branch, run_git};
use repo_test_utils::workspace::TestWorkspace;

/// Get a Command for the repo binary
fn repo_cmd() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("repo"))
}

/// `repo` pointed at the workspace config, isolated from the user's HOME.
fn repo(ws: &TestWorkspace) -> Command {
    let mut cmd = repo_cmd();
    cmd.env("HOME", ws.root())
        .env("REPO_CLI_CONFIG", ws.config_path())
        .env("GIT_CONFIG_NOSYSTEM", "1")
        .env_remove("RUST_LOG");
    cmd
}

fn init(ws: &TestWorkspace) {
    repo(ws)
        .args(["init", "--base-dir"])
        .arg(ws.base_dir())
        .assert()
        .success();
}

fn create(ws: &TestWorkspace, branch: &str) {
    repo(ws)
        .args(["create", "demo", branch, "--url", &ws.origin_url()])
        .assert()
        .success();
}

// ============================================================================
// Help and completions
// ============================================================================

#[test]
fn test_help_lists_commands() {
    repo_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("create"))
        .stdout(predicate::str::contains("pr-link"))
        .stdout(predicate::str::contains("doctor"));
}

#[test]
fn test_version() {
    repo_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("repo"));
}

#[test]
fn test_no_command_prints_hint() {
    repo_cmd()
        .assert()
        .success()
        .stdout(predicate::str::contains("repo --help"));
}

#[test]
fn test_completions_bash() {
    repo_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("_repo"));
}

// ============================================================================
// Init
// ============================================================================

#[test]
fn test_init_writes_config() {
    let ws = TestWorkspace::new();
    repo(&ws)
        .args(["init", "--base-dir"])
        .arg(ws.base_dir())
        .assert()
        .success()
        .stdout(predicate::str::contains("Created config"));

    let text = std::fs::read_to_string(ws.config_path()).unwrap();
    let doc: serde_yaml::Value = serde_yaml::from_str(&text).unwrap();
    assert_eq!(doc["version"].as_str(), Some("0.3.0"));
}

#[test]
fn test_init_refuses_overwrite_without_force() {
    let ws = TestWorkspace::new();
    init(&ws);

    repo(&ws)
        .args(["init", "--base-dir"])
        .arg(ws.base_dir())
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));

    repo(&ws)
        .args(["init", "--force", "--base-dir"])
        .arg(ws.base_dir())
        .assert()
        .success();
}

#[test]
fn test_missing_config_fails() {
    let ws = TestWorkspace::new();
    repo(&ws)
        .arg("list")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("repo init"));
}

// ============================================================================
// Worktree lifecycle
// ============================================================================

#[test]
fn test_create_list_activate_delete() {
    let ws = TestWorkspace::new();
    init(&ws);

    repo(&ws)
        .args(["create", "demo", "feature/login", "--url", &ws.origin_url()])
        .assert()
        .success()
        .stdout(predicate::str::contains("new, from main"))
        .stdout(predicate::str::contains("demo-feature%2Flogin"));

    let path = ws.base_dir().join("demo-feature%2Flogin");
    assert!(path.join("README.md").exists());
    assert!(ws.base_dir().join("demo.git").is_dir());

    repo(&ws)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("feature/login"));

    repo(&ws)
        .args(["activate", "demo", "feature/login", "--print"])
        .assert()
        .success()
        .stdout(format!("{}\n", path.display()));

    repo(&ws)
        .args(["delete", "demo", "feature/login", "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed worktree"));

    assert!(!path.exists());
    repo(&ws)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("No worktrees found"));
}

#[test]
fn test_create_checks_out_existing_remote_branch() {
    let ws = TestWorkspace::new();
    create_branch(&ws.origin(), "release");
    checkout(&ws.origin(), "release");
    commit_file(&ws.origin(), "notes.txt", "v1", "Release notes");
    checkout(&ws.origin(), "main");
    init(&ws);

    repo(&ws)
        .args(["create", "demo", "release", "--url", &ws.origin_url()])
        .assert()
        .success()
        .stdout(predicate::str::contains("tracking origin/release"));

    assert!(ws.base_dir().join("demo-release").join("notes.txt").exists());
}

#[test]
fn test_create_twice_fails() {
    let ws = TestWorkspace::new();
    init(&ws);
    create(&ws, "topic");

    repo(&ws)
        .args(["create", "demo", "topic"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn test_create_rejects_invalid_branch() {
    let ws = TestWorkspace::new();
    init(&ws);

    repo(&ws)
        .args(["create", "demo", "bad..name", "--url", &ws.origin_url()])
        .assert()
        .failure();
    assert!(!ws.base_dir().join("demo.git").exists());
}

#[test]
fn test_list_filters_by_repo() {
    let ws = TestWorkspace::new();
    init(&ws);
    create(&ws, "topic");

    repo(&ws)
        .args(["list", "other"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No worktrees found for 'other'"));
}

#[test]
fn test_activate_unknown_worktree_fails() {
    let ws = TestWorkspace::new();
    init(&ws);

    repo(&ws)
        .args(["activate", "demo", "nope", "--print"])
        .assert()
        .failure();
}

#[test]
fn test_delete_unmerged_branch_refused_before_removal() {
    let ws = TestWorkspace::new();
    init(&ws);
    create(&ws, "wip");
    let path = ws.base_dir().join("demo-wip");
    run_git(&path, &["config", "user.email", "test@example.com"]);
    run_git(&path, &["config", "user.name", "Test"]);
    commit_file(&path, "wip.txt", "wip", "Work in progress");

    repo(&ws)
        .args(["delete", "demo", "wip", "--yes", "--delete-branch"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not merged"));
    assert!(path.exists());

    repo(&ws)
        .args(["delete", "demo", "wip", "--yes", "--delete-branch", "--force"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted local branch"));
    assert!(!path.exists());
}

#[test]
fn test_delete_remote_checks_remote_branch() {
    let ws = TestWorkspace::new();
    let origin = ws.origin();
    run_git(&origin, &["checkout", "-q", "-b", "experiment"]);
    commit_file(&origin, "exp.txt", "exp", "Experiment");
    checkout(&origin, "main");
    init(&ws);
    create(&ws, "experiment");
    let path = ws.base_dir().join("demo-experiment");

    repo(&ws)
        .args(["delete", "demo", "experiment", "--yes", "--delete-remote"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("origin/experiment"));
    assert!(path.exists());

    repo(&ws)
        .args(["delete", "demo", "experiment", "--yes", "--delete-remote", "--force"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted origin/"));
    let remaining = run_git(&origin, &["branch", "--list", "experiment"]);
    assert!(remaining.is_empty());
}

// ============================================================================
// PR links and doctor
// ============================================================================

#[test]
fn test_pr_link_on_non_github_repo_warns_and_links() {
    let ws = TestWorkspace::new();
    init(&ws);
    create(&ws, "topic");

    repo(&ws)
        .args(["pr-link", "demo", "topic", "7"])
        .assert()
        .success()
        .stdout(predicate::str::contains("cannot be verified"))
        .stdout(predicate::str::contains("Linked PR #7"));

    repo(&ws)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("#7"));
}

#[test]
fn test_pr_link_rejects_zero() {
    let ws = TestWorkspace::new();
    init(&ws);
    create(&ws, "topic");

    repo(&ws)
        .args(["pr-link", "demo", "topic", "0"])
        .assert()
        .failure();
}

#[test]
fn test_doctor_on_healthy_setup() {
    let ws = TestWorkspace::new();
    init(&ws);
    create(&ws, "topic");

    repo(&ws)
        .arg("doctor")
        .assert()
        .success()
        .stdout(predicate::str::contains("All checks passed"));
}

#[test]
fn test_doctor_without_config_fails() {
    let ws = TestWorkspace::new();
    repo(&ws).arg("doctor").assert().failure();
}
