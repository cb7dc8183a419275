//! Git fixtures built with the `git` binary.
//!
//! Every helper panics with git's stderr on failure so a broken fixture
//! points straight at the cause.

use std::fs;
use std::path::Path;
use std::process::Command;

/// Run `git <args>` inside `dir` and return trimmed stdout.
///
/// # Panics
/// Panics if git cannot be spawned or exits non-zero.
pub fn run_git(dir: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .unwrap_or_else(|e| panic!("run_git: failed to run `git {args:?}`: {e}"));
    if !output.status.success() {
        panic!(
            "run_git: `git {args:?}` in {} failed:\n{}",
            dir.display(),
            String::from_utf8_lossy(&output.stderr)
        );
    }
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

/// Initialise a non-bare repository at `path` whose first commit lands on
/// `main`, regardless of the host's `init.defaultBranch`.
///
/// # Panics
/// Panics if any git operation fails.
pub fn real_git_repo_with_commit(path: &Path) {
    fs::create_dir_all(path)
        .unwrap_or_else(|e| panic!("real_git_repo_with_commit: create {}: {e}", path.display()));

    run_git(path, &["init"]);
    run_git(path, &["symbolic-ref", "HEAD", "refs/heads/main"]);
    run_git(path, &["config", "user.email", "test@test.com"]);
    run_git(path, &["config", "user.name", "Test User"]);
    run_git(path, &["config", "commit.gpgsign", "false"]);

    commit_file(path, "README.md", "# Test\n", "Initial commit");
}

/// Write `name` with `contents` and commit it on the current branch.
pub fn commit_file(repo: &Path, name: &str, contents: &str, message: &str) {
    let file = repo.join(name);
    if let Some(parent) = file.parent() {
        fs::create_dir_all(parent)
            .unwrap_or_else(|e| panic!("commit_file: create {}: {e}", parent.display()));
    }
    fs::write(&file, contents)
        .unwrap_or_else(|e| panic!("commit_file: write {}: {e}", file.display()));
    run_git(repo, &["add", name]);
    run_git(repo, &["commit", "-m", message]);
}

/// Create `branch` at the current HEAD without checking it out.
pub fn create_branch(repo: &Path, branch: &str) {
    run_git(repo, &["branch", branch]);
}

/// Check out `branch` in a non-bare repository.
pub fn checkout(repo: &Path, branch: &str) {
    run_git(repo, &["checkout", "-q", branch]);
}

/// Add `source` as a submodule of `repo` at `sub_path` and commit it.
///
/// Local submodule URLs need `protocol.file.allow=always` on modern git.
pub fn add_submodule(repo: &Path, source: &Path, sub_path: &str) {
    let source = source.to_string_lossy();
    run_git(
        repo,
        &[
            "-c",
            "protocol.file.allow=always",
            "submodule",
            "add",
            "-q",
            &source,
            sub_path,
        ],
    );
    run_git(repo, &["commit", "-m", &format!("Add submodule {sub_path}")]);
}

/// Name of every local branch in `repo`.
pub fn local_branches(repo: &Path) -> Vec<String> {
    run_git(repo, &["for-each-ref", "--format=%(refname:short)", "refs/heads/"])
        .lines()
        .map(str::to_string)
        .collect()
}
