//! Loading and saving the config file

use std::path::{Path, PathBuf};

use serde_yaml::Value;

use repo_fs::DocumentStore;
use repo_git::Git;

use crate::backup::BackupManager;
use crate::config::migrate::{self, MigrationContext, MigrationReport, WorktreeMover};
use crate::config::model::Config;
use crate::{Error, Result};

/// Directory under the home directory holding the config and its backups.
pub const CONFIG_DIR_NAME: &str = ".repo-cli";
pub const CONFIG_FILE_NAME: &str = "config.yaml";

/// `~/.repo-cli/config.yaml`
pub fn default_config_path() -> Result<PathBuf> {
    let home = dirs::home_dir().ok_or(Error::NoHomeDir)?;
    Ok(home.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
}

/// Handle on one config file.
///
/// Passed explicitly to every operation; nothing caches a loaded config
/// behind the caller's back.
pub struct ConfigStore {
    path: PathBuf,
    documents: DocumentStore,
    backups: BackupManager,
    mover: Box<dyn WorktreeMover>,
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self {
            backups: BackupManager::for_config(&path),
            documents: DocumentStore::new(),
            mover: Box::new(Git::new()),
            path,
        }
    }

    /// Use a different collaborator for structural migrations.
    pub fn with_mover(mut self, mover: Box<dyn WorktreeMover>) -> Self {
        self.mover = mover;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    pub fn backups(&self) -> &BackupManager {
        &self.backups
    }

    /// Load the config, migrating it to the current schema.
    ///
    /// Written back only when a migration changed something, so plain reads
    /// never touch the file.
    pub fn load(&self) -> Result<Config> {
        self.load_with_report().map(|(config, _)| config)
    }

    pub fn load_with_report(&self) -> Result<(Config, MigrationReport)> {
        let value = match self.documents.load_value(&self.path) {
            Ok(value) => value,
            Err(e) if e.is_not_found() => {
                return Err(Error::ConfigNotFound {
                    path: self.path.clone(),
                });
            }
            Err(repo_fs::Error::ConfigParse { message, .. }) => return Err(self.corrupt(message)),
            Err(e) => return Err(e.into()),
        };

        let mut doc = match value {
            Value::Mapping(doc) => doc,
            Value::Null => return Err(self.corrupt("file is empty")),
            _ => return Err(self.corrupt("top level is not a mapping")),
        };

        let ctx = MigrationContext {
            config_path: &self.path,
            backups: &self.backups,
            mover: self.mover.as_ref(),
        };
        let report = migrate::run_migrations(&mut doc, &ctx)?;

        let config: Config =
            serde_yaml::from_value(Value::Mapping(doc)).map_err(|e| self.corrupt(e.to_string()))?;
        config.check_consistency().map_err(|reason| self.corrupt(reason))?;

        if report.changed {
            self.save(&config)?;
            tracing::info!(from = %report.from, to = %report.to, path = %self.path.display(), "Config migrated");
        }

        Ok((config, report))
    }

    /// Atomically replace the config file.
    pub fn save(&self, config: &Config) -> Result<()> {
        self.documents.save(&self.path, config)?;
        tracing::debug!(path = %self.path.display(), "Config saved");
        Ok(())
    }

    /// Write a fresh config with an absolute `base_dir` and create that
    /// directory. Refuses to overwrite unless `force`.
    pub fn init(&self, base_dir: &str, force: bool) -> Result<Config> {
        if self.exists() && !force {
            return Err(Error::ConfigExists {
                path: self.path.clone(),
            });
        }

        let base_dir = repo_fs::expand_path(base_dir)?;
        std::fs::create_dir_all(&base_dir).map_err(|e| repo_fs::Error::io(&base_dir, e))?;

        let config = Config::new(base_dir);
        self.save(&config)?;
        tracing::info!(path = %self.path.display(), base_dir = %config.base_dir.display(), "Config initialized");
        Ok(config)
    }

    fn corrupt(&self, reason: impl Into<String>) -> Error {
        Error::ConfigCorrupt {
            path: self.path.clone(),
            reason: reason.into(),
            backup: self.backups.latest(),
        }
    }
}
