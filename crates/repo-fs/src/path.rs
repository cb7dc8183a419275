//! Path expansion and containment checks

use std::path::{Component, Path, PathBuf};

use crate::{Error, Result};

/// Expand `~` and make a path absolute without touching the filesystem.
///
/// `..` and `.` components are folded lexically, so the result is stable
/// even when the directory does not exist yet.
pub fn expand_path(input: &str) -> Result<PathBuf> {
    let expanded = if input == "~" {
        dirs::home_dir().ok_or_else(|| Error::NoHomeDir {
            input: input.to_string(),
        })?
    } else if let Some(rest) = input.strip_prefix("~/") {
        dirs::home_dir()
            .ok_or_else(|| Error::NoHomeDir {
                input: input.to_string(),
            })?
            .join(rest)
    } else {
        PathBuf::from(input)
    };

    let absolute = if expanded.is_absolute() {
        expanded
    } else {
        let cwd = std::env::current_dir().map_err(|e| Error::io(".", e))?;
        cwd.join(expanded)
    };

    Ok(normalize_lexically(&absolute))
}

fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Reject `target` unless it resolves to a location inside `base`.
///
/// Symlinks are resolved on the deepest existing ancestor of `target`, so a
/// link planted inside `base` that points elsewhere is caught, while paths
/// that do not exist yet (about to be created) are still accepted.
pub fn ensure_within(target: &Path, base: &Path) -> Result<()> {
    let base_resolved = dunce::canonicalize(base).unwrap_or_else(|_| normalize_lexically(base));
    let target_resolved = resolve_existing_prefix(target);

    if target_resolved.starts_with(&base_resolved) {
        Ok(())
    } else {
        Err(Error::PathEscapesBase {
            path: target.to_path_buf(),
            base: base.to_path_buf(),
        })
    }
}

fn resolve_existing_prefix(target: &Path) -> PathBuf {
    let target = normalize_lexically(target);
    let mut existing = target.as_path();
    let mut remainder = Vec::new();

    loop {
        if let Ok(resolved) = dunce::canonicalize(existing) {
            let mut out = resolved;
            for part in remainder.iter().rev() {
                out.push(part);
            }
            return out;
        }
        match (existing.parent(), existing.file_name()) {
            (Some(parent), Some(name)) => {
                remainder.push(name.to_os_string());
                existing = parent;
            }
            _ => return target,
        }
    }
}
