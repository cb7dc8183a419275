use std::fs;

use pretty_assertions::assert_eq;
use repo_git::naming::worktree_dir;
use repo_git::{Error, Git, RefResolver, RemoveMode};
use repo_test_utils::git::{add_submodule, create_branch, local_branches, run_git};
use repo_test_utils::workspace::TestWorkspace;

fn git() -> Git {
    Git::new().with_config("protocol.file.allow", "always")
}

#[test]
fn test_add_worktree_for_new_branch() {
    let ws = TestWorkspace::new();
    let bare = ws.bare_clone("demo");
    let refs = RefResolver::new(&bare, git());
    let path = worktree_dir(&ws.base_dir(), "demo", "feature/login").unwrap();

    let plan = refs.plan_checkout("feature/login", None).unwrap();
    git().add_worktree(&bare, &path, &plan).unwrap();

    assert!(path.join("README.md").exists());
    assert_eq!(
        run_git(&path, &["rev-parse", "--abbrev-ref", "HEAD"]),
        "feature/login"
    );
    assert_eq!(git().list_worktrees(&bare).unwrap().len(), 1);
}

#[test]
fn test_add_worktree_tracks_remote_branch() {
    let ws = TestWorkspace::new();
    let bare = ws.bare_clone("demo");
    create_branch(&ws.origin(), "feature-x");
    let refs = RefResolver::new(&bare, git());
    let path = worktree_dir(&ws.base_dir(), "demo", "feature-x").unwrap();

    let plan = refs.plan_checkout("feature-x", None).unwrap();
    git().add_worktree(&bare, &path, &plan).unwrap();

    assert_eq!(
        run_git(&path, &["rev-parse", "--abbrev-ref", "@{u}"]),
        "origin/feature-x"
    );
}

#[test]
fn test_submodules_block_plain_removal() {
    let ws = TestWorkspace::new();
    let dep = ws.submodule_source("dep");
    let ci = ws.submodule_source("ci-tool");
    add_submodule(&ws.origin(), &dep, "libs/dep");
    add_submodule(&ws.origin(), &ci, ".github/ci-tool");

    let bare = ws.bare_clone("demo");
    let refs = RefResolver::new(&bare, git());
    let path = worktree_dir(&ws.base_dir(), "demo", "feature/sub").unwrap();
    let plan = refs.plan_checkout("feature/sub", None).unwrap();
    git().add_worktree(&bare, &path, &plan).unwrap();

    let mut paths = git().submodule_paths(&path).unwrap();
    paths.sort();
    assert_eq!(paths, vec![".github/ci-tool", "libs/dep"]);

    assert_eq!(git().init_submodules(&path).unwrap(), 1);
    assert!(path.join("libs/dep/README.md").exists());
    assert!(!path.join(".github/ci-tool/README.md").exists());

    let err = git()
        .remove_worktree(&bare, &path, RemoveMode::Normal)
        .unwrap_err();
    assert!(matches!(err, Error::SubmodulesBlockRemoval { .. }));

    git().deinit_submodules(&path).unwrap();
    git()
        .remove_worktree(&bare, &path, RemoveMode::Force)
        .unwrap();
    assert!(!path.exists());
}

#[test]
fn test_remove_missing_worktree_surfaces_git_error() {
    let ws = TestWorkspace::new();
    let bare = ws.bare_clone("demo");

    let err = git()
        .remove_worktree(&bare, &ws.base_dir().join("demo-nope"), RemoveMode::Normal)
        .unwrap_err();
    assert!(matches!(err, Error::CommandFailed { .. }));
    assert!(err.stderr().is_some_and(|s| !s.is_empty()));
}

#[test]
fn test_move_worktree() {
    let ws = TestWorkspace::new();
    let bare = ws.bare_clone("demo");
    let refs = RefResolver::new(&bare, git());
    let old = ws.base_dir().join("demo-feature__login");
    let new = worktree_dir(&ws.base_dir(), "demo", "feature/login").unwrap();

    let plan = refs.plan_checkout("feature/login", None).unwrap();
    git().add_worktree(&bare, &old, &plan).unwrap();
    git().move_worktree(&bare, &old, &new).unwrap();

    assert!(!old.exists());
    assert!(new.join("README.md").exists());
}

#[test]
fn test_checked_out_branch() {
    let ws = TestWorkspace::new();
    let bare = ws.bare_clone("demo");
    let refs = RefResolver::new(&bare, git());
    let path = ws.base_dir().join("demo-a__b");

    let plan = refs.plan_checkout("a__b", None).unwrap();
    git().add_worktree(&bare, &path, &plan).unwrap();

    assert_eq!(
        git().checked_out_branch(&path).unwrap().as_deref(),
        Some("a__b")
    );
    run_git(&path, &["checkout", "-q", "--detach"]);
    assert_eq!(git().checked_out_branch(&path).unwrap(), None);
}

#[test]
fn test_delete_local_branch() {
    let ws = TestWorkspace::new();
    let bare = ws.bare_clone("demo");
    run_git(&bare, &["branch", "stale", "main"]);

    git().delete_local_branch(&bare, "stale", false).unwrap();
    assert!(!local_branches(&bare).contains(&"stale".to_string()));
}

#[test]
fn test_remote_url_roundtrip() {
    let ws = TestWorkspace::new();
    let bare = ws.bare_clone("demo");

    assert_eq!(git().remote_url(&bare).unwrap(), Some(ws.origin_url()));
    git().set_remote_url(&bare, "git@github.com:acme/demo.git").unwrap();
    assert_eq!(
        git().remote_url(&bare).unwrap().as_deref(),
        Some("git@github.com:acme/demo.git")
    );
}

#[test]
fn test_clone_bare_populates_remote_tracking_refs() {
    let ws = TestWorkspace::new();
    let dest = ws.base_dir().join("fresh.git");

    git().clone_bare(&ws.origin_url(), &dest).unwrap();

    let refs = run_git(&dest, &["for-each-ref", "--format=%(refname)", "refs/remotes/"]);
    assert!(refs.lines().any(|r| r == "refs/remotes/origin/main"));
    assert!(fs::metadata(dest.join("HEAD")).is_ok());
}

#[test]
fn test_clone_bare_keeps_only_head_branch() {
    let ws = TestWorkspace::new();
    create_branch(&ws.origin(), "release");
    let dest = ws.base_dir().join("fresh.git");

    git().clone_bare(&ws.origin_url(), &dest).unwrap();

    assert_eq!(local_branches(&dest), vec!["main".to_string()]);
    let remotes = run_git(&dest, &["for-each-ref", "--format=%(refname)", "refs/remotes/"]);
    assert!(remotes.lines().any(|r| r == "refs/remotes/origin/release"));
}

#[test]
fn test_new_branch_from_origin_has_no_upstream() {
    let ws = TestWorkspace::new();
    let bare = ws.bare_clone("demo");
    let refs = RefResolver::new(&bare, git());
    let path = worktree_dir(&ws.base_dir(), "demo", "feature/own").unwrap();

    let plan = refs.plan_checkout("feature/own", Some("origin/main")).unwrap();
    git().add_worktree(&bare, &path, &plan).unwrap();

    let upstream = std::process::Command::new("git")
        .args(["rev-parse", "--abbrev-ref", "@{u}"])
        .current_dir(&path)
        .output()
        .unwrap();
    assert!(!upstream.status.success());
}
