//! Filesystem primitives for repo
//!
//! Provides crash-safe writes, format-agnostic document loading and the
//! path helpers used to keep every managed directory inside `base_dir`.

pub mod document;
pub mod error;
pub mod io;
pub mod path;

pub use document::DocumentStore;
pub use error::{Error, Result};
pub use path::{ensure_within, expand_path};
