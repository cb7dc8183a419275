//! Shared test fixtures for the repo workspace.
//!
//! Dev-dependency only, never published.
//!
//! # Modules
//!
//! - [`git`] - thin panicking wrappers around the `git` binary
//! - [`workspace`] - [`TestWorkspace`](workspace::TestWorkspace): an origin
//!   repository plus an empty base directory and config path

pub mod git;
pub mod workspace;
