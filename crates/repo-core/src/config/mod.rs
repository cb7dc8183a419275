//! The persisted config: model, store and schema migrations

pub mod migrate;
pub mod model;
pub mod store;

pub use migrate::{MigrationContext, MigrationReport, WorktreeMover, run_migrations};
pub use model::{CURRENT_VERSION, Config, RepoEntry, WorktreeEntry, WorktreeKey};
pub use store::{ConfigStore, default_config_path};
