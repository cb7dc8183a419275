//! Command implementations

pub mod activate;
pub mod completions;
pub mod create;
pub mod delete;
pub mod doctor;
pub mod init;
pub mod list;
pub mod pr;
pub mod register;

use colored::Colorize;

/// Print warnings collected by a core operation.
pub(crate) fn print_warnings(warnings: &[String]) {
    for warning in warnings {
        println!("{} {}", "warning:".yellow().bold(), warning);
    }
}
