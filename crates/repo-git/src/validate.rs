//! Validation of repo aliases, branch names and start points
//!
//! Aliases and branch names end up in directory names and in the composite
//! worktree key `alias::branch`, so both must be rejected early when they
//! could escape `base_dir` or make that key ambiguous.

use std::sync::LazyLock;

use regex::Regex;

use crate::{Error, Result};

/// Delimiter of the serialized worktree key. Never valid in an alias or branch.
pub const KEY_DELIMITER: &str = "::";

static ALIAS_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9._-]+$").expect("static regex"));

/// Characters git refuses in ref names, plus `:` which would collide with
/// the worktree key delimiter.
const PROHIBITED_BRANCH_CHARS: &[char] = &[' ', '~', '^', ':', '?', '*', '[', '\\'];

/// Validate a repository alias.
///
/// Allowed: ASCII letters, digits, `.`, `-`, `_`. Rejects path traversal
/// (`..`, `/`), names made only of dots, and the key delimiter.
pub fn validate_repo_alias(alias: &str) -> Result<()> {
    let fail = |reason: &str| {
        Err(Error::InvalidRepoAlias {
            alias: alias.to_string(),
            reason: reason.to_string(),
        })
    };

    if alias.is_empty() {
        return fail("alias cannot be empty");
    }
    if alias.contains(KEY_DELIMITER) {
        return fail("alias cannot contain '::'");
    }
    if alias.contains('/') || alias.contains('\\') {
        return fail("alias cannot contain path separators");
    }
    if alias.chars().all(|c| c == '.') {
        return fail("alias cannot consist only of dots");
    }
    if alias.contains("..") {
        return fail("alias cannot contain '..'");
    }
    if alias.starts_with('-') {
        return fail("alias cannot start with '-'");
    }
    if !ALIAS_PATTERN.is_match(alias) {
        return fail("only letters, digits, '.', '-' and '_' are allowed");
    }
    Ok(())
}

/// Validate a branch name against git's ref-name rules.
///
/// Mirrors `git check-ref-format --branch` closely enough that a name
/// accepted here is accepted by git, and additionally forbids `:` so the
/// worktree key delimiter can never appear in a branch.
pub fn validate_branch_name(name: &str) -> Result<()> {
    let fail = |reason: &str| {
        Err(Error::InvalidBranchName {
            name: name.to_string(),
            reason: reason.to_string(),
        })
    };

    if name.is_empty() {
        return fail("branch name cannot be empty");
    }
    if name == "@" {
        return fail("branch name cannot be single '@' character");
    }
    if name == "HEAD" {
        return fail("'HEAD' is not a valid branch name");
    }
    if name.starts_with('-') {
        return fail("branch name cannot start with '-'");
    }
    if name
        .chars()
        .any(|c| c.is_control() || PROHIBITED_BRANCH_CHARS.contains(&c))
    {
        return fail("branch name contains prohibited characters");
    }
    if name.contains("@{") {
        return fail("branch name cannot contain '@{'");
    }
    if name.contains("..") {
        return fail("branch name cannot contain '..'");
    }
    if name.starts_with('/') || name.ends_with('/') {
        return fail("branch name cannot start or end with '/'");
    }
    if name.contains("//") {
        return fail("branch name cannot contain consecutive slashes");
    }
    if name.ends_with('.') {
        return fail("branch name cannot end with '.'");
    }
    for component in name.split('/') {
        if component.starts_with('.') {
            return fail("path components cannot start with '.'");
        }
        if component.ends_with(".lock") {
            return fail("path components cannot end with '.lock'");
        }
    }
    Ok(())
}

/// Validate a user-supplied start point (branch, tag or commit).
///
/// Only guards against values git would parse as options or that cannot be
/// refs at all; whether the ref exists is left to git.
pub fn validate_start_point(start_point: &str) -> Result<()> {
    let fail = |reason: &str| {
        Err(Error::InvalidStartPoint {
            start_point: start_point.to_string(),
            reason: reason.to_string(),
        })
    };

    if start_point.trim().is_empty() {
        return fail("start point cannot be empty");
    }
    if start_point.starts_with('-') {
        return fail("start point cannot start with '-'");
    }
    if start_point
        .chars()
        .any(|c| c.is_control() || c.is_whitespace())
    {
        return fail("start point cannot contain whitespace or control characters");
    }
    Ok(())
}
