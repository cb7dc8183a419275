//! Interactive prompts for CLI commands
//!
//! Uses dialoguer for terminal-based confirmation and input.

use dialoguer::{Confirm, Input};

use crate::error::Result;

/// Ask a yes/no question.
pub fn confirm(prompt: &str, default: bool) -> Result<bool> {
    Ok(Confirm::new()
        .with_prompt(prompt)
        .default(default)
        .interact()?)
}

/// Ask for the URL of an unregistered repository.
pub fn prompt_url(alias: &str) -> Result<String> {
    let url: String = Input::new()
        .with_prompt(format!("Repository URL for '{alias}'"))
        .interact_text()?;
    Ok(url.trim().to_string())
}
