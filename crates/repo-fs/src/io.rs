//! Atomic I/O operations

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::{Error, Result};

/// Write content atomically to a file.
///
/// Uses write-to-temp-then-rename: the temp file lives in the destination's
/// directory so the rename never crosses a filesystem boundary, and its data
/// is forced to disk before the rename. The destination is never opened for
/// writing, so readers observe either the old or the new content.
pub fn write_atomic(path: &Path, content: &[u8]) -> Result<()> {
    write_atomic_with(path, content, |_| Ok(()))
}

/// [`write_atomic`] with a hook that runs between the durable temp write and
/// the rename. A failing hook behaves like a crash at that point.
fn write_atomic_with<F>(path: &Path, content: &[u8], before_rename: F) -> Result<()>
where
    F: FnOnce(&Path) -> std::io::Result<()>,
{
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }

    let temp_path = temp_path_for(path);

    let result = write_temp(&temp_path, content)
        .and_then(|()| before_rename(&temp_path).map_err(|e| Error::io(&temp_path, e)))
        .and_then(|()| fs::rename(&temp_path, path).map_err(|e| Error::io(path, e)));

    match result {
        Ok(()) => {
            sync_parent_dir(path);
            tracing::debug!(path = %path.display(), bytes = content.len(), "Wrote file atomically");
            Ok(())
        }
        Err(e) => {
            if let Err(cleanup) = fs::remove_file(&temp_path)
                && cleanup.kind() != std::io::ErrorKind::NotFound
            {
                tracing::warn!(
                    path = %temp_path.display(),
                    error = %cleanup,
                    "Failed to remove temp file after aborted write"
                );
            }
            Err(e)
        }
    }
}

/// Temp file path next to `path`: `.<name>.<pid>.tmp`.
fn temp_path_for(path: &Path) -> PathBuf {
    let temp_name = format!(
        ".{}.{}.tmp",
        path.file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default(),
        std::process::id()
    );
    path.with_file_name(temp_name)
}

fn write_temp(temp_path: &Path, content: &[u8]) -> Result<()> {
    let mut temp_file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(temp_path)
        .map_err(|e| Error::io(temp_path, e))?;

    temp_file
        .write_all(content)
        .map_err(|e| Error::io(temp_path, e))?;

    temp_file.sync_all().map_err(|e| Error::io(temp_path, e))
}

/// Best-effort fsync of the containing directory so the rename itself is durable.
fn sync_parent_dir(path: &Path) {
    let Some(parent) = path.parent() else {
        return;
    };
    let parent = if parent.as_os_str().is_empty() {
        Path::new(".")
    } else {
        parent
    };
    if let Ok(dir) = File::open(parent)
        && let Err(e) = dir.sync_all()
    {
        tracing::debug!(path = %parent.display(), error = %e, "Directory fsync not supported");
    }
}

/// Read text content from a file.
pub fn read_text(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| Error::io(path, e))
}

/// Write text content to a file atomically.
pub fn write_text(path: &Path, content: &str) -> Result<()> {
    write_atomic(path, content.as_bytes())
}
