//! Timestamped config backups
//!
//! Taken before any migration that moves directories on disk. Backups are
//! plain copies at `<config dir>/backups/config-<YYYYMMDD-HHMMSS.fff>.yaml`
//! and are never pruned automatically.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;

use crate::Result;

const PREFIX: &str = "config-";
const SUFFIX: &str = ".yaml";
/// Length of `YYYYMMDD-HHMMSS.fff`.
const STAMP_LEN: usize = 19;

/// Manages backups of one config file.
#[derive(Debug, Clone)]
pub struct BackupManager {
    backups_dir: PathBuf,
}

impl BackupManager {
    /// Backups for the config at `config_path`, stored next to it.
    pub fn for_config(config_path: &Path) -> Self {
        let dir = config_path.parent().unwrap_or_else(|| Path::new("."));
        Self {
            backups_dir: dir.join("backups"),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.backups_dir
    }

    /// Copy `config_path` into a new backup and return the backup's path.
    pub fn create(&self, config_path: &Path) -> Result<PathBuf> {
        fs::create_dir_all(&self.backups_dir)
            .map_err(|e| repo_fs::Error::io(&self.backups_dir, e))?;

        let stamp = Utc::now().format("%Y%m%d-%H%M%S%.3f").to_string();
        let mut dest = self.backups_dir.join(format!("{PREFIX}{stamp}{SUFFIX}"));
        let mut n = 1;
        while dest.exists() {
            dest = self
                .backups_dir
                .join(format!("{PREFIX}{stamp}-{n}{SUFFIX}"));
            n += 1;
        }

        let content = fs::read(config_path).map_err(|e| repo_fs::Error::io(config_path, e))?;
        repo_fs::io::write_atomic(&dest, &content)?;

        tracing::info!(backup = %dest.display(), "Config backed up");
        Ok(dest)
    }

    /// All backups, oldest first.
    pub fn list(&self) -> Result<Vec<PathBuf>> {
        let entries = match fs::read_dir(&self.backups_dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(repo_fs::Error::io(&self.backups_dir, e).into()),
        };

        let mut backups: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| {
                path.file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.starts_with(PREFIX) && n.ends_with(SUFFIX))
            })
            .collect();
        backups.sort_by_key(|path| order_key(path));
        Ok(backups)
    }

    /// Most recent backup, if any.
    pub fn latest(&self) -> Option<PathBuf> {
        self.list().ok().and_then(|mut backups| backups.pop())
    }
}

/// `(timestamp, collision counter)`. Timestamps are zero-padded, so
/// string order is creation order.
fn order_key(path: &Path) -> (String, u32) {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .and_then(|n| n.strip_prefix(PREFIX))
        .and_then(|n| n.strip_suffix(SUFFIX))
        .unwrap_or_default();
    match name.char_indices().nth(STAMP_LEN) {
        Some((split, _)) => {
            let (stamp, counter) = name.split_at(split);
            let n = counter.trim_start_matches('-').parse().unwrap_or(0);
            (stamp.to_string(), n)
        }
        None => (name.to_string(), 0),
    }
}
