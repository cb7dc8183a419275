//! Git plumbing for repo
//!
//! Everything that touches git lives here: the `git` subprocess runner,
//! branch/alias validation, the reversible branch-to-directory codec, the
//! ref resolver that decides how a worktree gets checked out, and the
//! worktree/submodule operations themselves.

pub mod command;
pub mod error;
pub mod naming;
pub mod refs;
pub mod validate;
pub mod worktree;

pub use command::Git;
pub use error::{DecodeError, Error, Result};
pub use naming::{bare_repo_dir, decode_segment, encode_branch, worktree_dir};
pub use refs::{CheckoutKind, CheckoutPlan, RefResolver};
pub use validate::{validate_branch_name, validate_repo_alias, validate_start_point};
pub use worktree::RemoveMode;
