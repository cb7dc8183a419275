use pretty_assertions::assert_eq;
use repo_git::{CheckoutKind, Error, Git, RefResolver};
use repo_test_utils::git::{checkout, commit_file, create_branch, run_git};
use repo_test_utils::workspace::TestWorkspace;

fn resolver(ws: &TestWorkspace, alias: &str) -> RefResolver {
    RefResolver::new(ws.bare_clone(alias), Git::new())
}

// ==========================================================================
// Default branch
// ==========================================================================

#[test]
fn test_default_branch_follows_head() {
    let ws = TestWorkspace::new();
    create_branch(&ws.origin(), "develop");
    let refs = resolver(&ws, "demo");
    run_git(refs.bare_path(), &["branch", "develop", "origin/develop"]);
    run_git(refs.bare_path(), &["symbolic-ref", "HEAD", "refs/heads/develop"]);

    assert_eq!(refs.resolve_default_branch().unwrap(), "develop");
}

#[test]
fn test_default_branch_follows_origin_head_when_head_dangles() {
    let ws = TestWorkspace::new();
    create_branch(&ws.origin(), "trunk");
    let refs = resolver(&ws, "demo");
    let bare = refs.bare_path();
    run_git(bare, &["symbolic-ref", "HEAD", "refs/heads/gone"]);
    run_git(
        bare,
        &[
            "symbolic-ref",
            "refs/remotes/origin/HEAD",
            "refs/remotes/origin/trunk",
        ],
    );

    assert_eq!(refs.resolve_default_branch().unwrap(), "trunk");
}

#[test]
fn test_default_branch_falls_back_to_master() {
    let ws = TestWorkspace::new();
    let refs = resolver(&ws, "demo");
    let bare = refs.bare_path();
    run_git(bare, &["symbolic-ref", "HEAD", "refs/heads/gone"]);
    run_git(bare, &["branch", "-m", "main", "master"]);
    run_git(bare, &["update-ref", "-d", "refs/remotes/origin/main"]);

    assert_eq!(refs.resolve_default_branch().unwrap(), "master");
}

#[test]
fn test_default_branch_unresolvable_is_an_error() {
    let ws = TestWorkspace::new();
    let refs = resolver(&ws, "demo");
    let bare = refs.bare_path();
    run_git(bare, &["symbolic-ref", "HEAD", "refs/heads/gone"]);
    run_git(bare, &["branch", "-m", "main", "trunk"]);
    run_git(bare, &["update-ref", "-d", "refs/remotes/origin/main"]);

    match refs.resolve_default_branch().unwrap_err() {
        Error::DefaultBranchUnresolved { head, .. } => assert_eq!(head, "refs/heads/gone"),
        other => panic!("expected DefaultBranchUnresolved, got {other:?}"),
    }
}

// ==========================================================================
// Checkout planning
// ==========================================================================

#[test]
fn test_plan_existing_local_branch() {
    let ws = TestWorkspace::new();
    let refs = resolver(&ws, "demo");

    let plan = refs.plan_checkout("main", None).unwrap();
    assert_eq!(plan.kind, CheckoutKind::ExistingLocal);
    assert_eq!(plan.start_ref, "main");
    assert!(!plan.create_branch);
}

#[test]
fn test_plan_remote_only_branch_tracks_remote() {
    let ws = TestWorkspace::new();
    let refs = resolver(&ws, "demo");
    // Pushed by a collaborator after the clone.
    create_branch(&ws.origin(), "feature-x");

    let plan = refs.plan_checkout("feature-x", None).unwrap();
    assert_eq!(plan.kind, CheckoutKind::TrackRemote);
    assert_eq!(plan.start_ref, "origin/feature-x");
    assert!(plan.create_branch);
    assert!(plan.warnings.is_empty());
}

#[test]
fn test_plan_new_branch_starts_from_resolved_default() {
    let ws = TestWorkspace::new();
    let refs = resolver(&ws, "demo");

    let plan = refs.plan_checkout("feature/login", None).unwrap();
    assert_eq!(plan.kind, CheckoutKind::NewBranch);
    assert_eq!(plan.start_ref, "main");
    assert!(plan.create_branch);
}

#[test]
fn test_plan_branch_present_at_clone_tracks_remote() {
    let ws = TestWorkspace::new();
    create_branch(&ws.origin(), "release");
    let refs = resolver(&ws, "demo");
    checkout(&ws.origin(), "release");
    commit_file(&ws.origin(), "notes.txt", "v2\n", "Release notes");
    checkout(&ws.origin(), "main");

    let plan = refs.plan_checkout("release", None).unwrap();
    assert_eq!(plan.kind, CheckoutKind::TrackRemote);
    assert_eq!(plan.start_ref, "origin/release");
}

#[test]
fn test_plan_new_branch_starts_from_origin_when_ahead() {
    let ws = TestWorkspace::new();
    let refs = resolver(&ws, "demo");
    commit_file(&ws.origin(), "later.txt", "later\n", "Pushed after clone");

    let plan = refs.plan_checkout("feature/fresh", None).unwrap();
    assert_eq!(plan.kind, CheckoutKind::NewBranch);
    assert_eq!(plan.start_ref, "origin/main");
}

#[test]
fn test_plan_warns_when_local_branch_is_behind() {
    let ws = TestWorkspace::new();
    let refs = resolver(&ws, "demo");
    commit_file(&ws.origin(), "later.txt", "later\n", "Pushed after clone");

    let plan = refs.plan_checkout("main", None).unwrap();
    assert_eq!(plan.kind, CheckoutKind::ExistingLocal);
    assert_eq!(plan.warnings.len(), 1);
    assert!(plan.warnings[0].contains("origin/main"));
}

#[test]
fn test_plan_resolves_symbolic_start_points() {
    let ws = TestWorkspace::new();
    create_branch(&ws.origin(), "trunk");
    let refs = resolver(&ws, "demo");

    let plan = refs.plan_checkout("feature/a", Some("HEAD")).unwrap();
    assert_eq!(plan.start_ref, "main");

    let plan = refs.plan_checkout("feature/b", Some("origin/HEAD")).unwrap();
    assert_eq!(plan.start_ref, "main");

    run_git(
        refs.bare_path(),
        &[
            "symbolic-ref",
            "refs/remotes/origin/HEAD",
            "refs/remotes/origin/trunk",
        ],
    );
    let plan = refs.plan_checkout("feature/c", Some("origin/HEAD")).unwrap();
    assert_eq!(plan.start_ref, "origin/trunk");
}

#[test]
fn test_plan_new_branch_honours_user_start_point() {
    let ws = TestWorkspace::new();
    let refs = resolver(&ws, "demo");

    let plan = refs.plan_checkout("feature/login", Some("origin/main")).unwrap();
    assert_eq!(plan.start_ref, "origin/main");
}

#[test]
fn test_plan_survives_fetch_failure() {
    let ws = TestWorkspace::new();
    let refs = resolver(&ws, "demo");
    run_git(
        refs.bare_path(),
        &["remote", "set-url", "origin", "/nonexistent/upstream"],
    );

    let plan = refs.plan_checkout("feature/offline", None).unwrap();
    assert_eq!(plan.kind, CheckoutKind::NewBranch);
    assert_eq!(plan.warnings.len(), 1);
}

#[test]
fn test_plan_rejects_invalid_branch() {
    let ws = TestWorkspace::new();
    let refs = resolver(&ws, "demo");

    assert!(matches!(
        refs.plan_checkout("bad..name", None),
        Err(Error::InvalidBranchName { .. })
    ));
}

// ==========================================================================
// Merge check
// ==========================================================================

#[test]
fn test_merge_check_is_exact() {
    let ws = TestWorkspace::new();
    let origin = ws.origin();

    run_git(&origin, &["checkout", "-q", "-b", "fix"]);
    commit_file(&origin, "fix.txt", "fix\n", "Fix");
    run_git(&origin, &["checkout", "-q", "main"]);
    run_git(&origin, &["checkout", "-q", "-b", "hotfix"]);
    commit_file(&origin, "hotfix.txt", "hotfix\n", "Hotfix");
    run_git(&origin, &["checkout", "-q", "main"]);
    run_git(&origin, &["merge", "-q", "--no-edit", "hotfix"]);

    let refs = resolver(&ws, "demo");
    assert!(refs.is_merged("hotfix", "main").unwrap());
    assert!(!refs.is_merged("fix", "main").unwrap());
}

#[test]
fn test_missing_branch_is_not_merged() {
    let ws = TestWorkspace::new();
    let refs = resolver(&ws, "demo");

    assert!(!refs.is_merged("never-created", "main").unwrap());
}

#[test]
fn test_branch_merged_upstream_is_merged_after_fetch() {
    let ws = TestWorkspace::new();
    let refs = resolver(&ws, "demo");
    let origin = ws.origin();

    run_git(&origin, &["checkout", "-q", "-b", "feature/done"]);
    commit_file(&origin, "done.txt", "done\n", "Done");
    run_git(&origin, &["checkout", "-q", "main"]);
    run_git(&origin, &["merge", "-q", "--no-ff", "--no-edit", "feature/done"]);
    refs.fetch().unwrap();
    // As if the branch had been created locally and pushed.
    run_git(refs.bare_path(), &["branch", "feature/done", "origin/feature/done"]);

    assert!(refs.is_merged("feature/done", "main").unwrap());
    assert!(refs.is_remote_merged("feature/done", "main").unwrap());
}

#[test]
fn test_remote_only_branch_merge_check() {
    let ws = TestWorkspace::new();
    let origin = ws.origin();
    run_git(&origin, &["checkout", "-q", "-b", "experiment"]);
    commit_file(&origin, "exp.txt", "exp\n", "Experiment");
    run_git(&origin, &["checkout", "-q", "main"]);
    let refs = resolver(&ws, "demo");

    assert!(!refs.local_branch_exists("experiment").unwrap());
    assert!(!refs.is_remote_merged("experiment", "main").unwrap());
    assert!(!refs.is_merged("experiment", "main").unwrap());
    assert!(!refs.is_remote_merged("never-pushed", "main").unwrap());
}

#[test]
fn test_merge_check_into_missing_branch_is_an_error() {
    let ws = TestWorkspace::new();
    let refs = resolver(&ws, "demo");

    assert!(refs.is_merged("main", "no-such-branch").is_err());
}
