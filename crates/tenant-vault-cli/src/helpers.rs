//! Input and parsing helper functions for the CLI.

use chrono::{DateTime, Utc};
use dialoguer::Password;

use crate::constants::PASSWORD_ENV;
use crate::errors::CliError;

/// Password from `TVAULT_PASSWORD`, if set and non-blank.
pub fn env_password() -> Option<String> {
    std::env::var(PASSWORD_ENV)
        .ok()
        .filter(|value| !value.trim().is_empty())
}

/// Prompt for a password, or read it from TVAULT_PASSWORD.
pub fn prompt_password(interactive: bool, prompt: &str) -> anyhow::Result<String> {
    if let Some(value) = env_password() {
        return Ok(value);
    }
    if !interactive {
        return Err(no_password_error().into());
    }
    Password::new()
        .with_prompt(prompt)
        .interact()
        .map_err(|e| anyhow::anyhow!("Failed to read password: {}", e))
}

/// Prompt for a new password with confirmation, or read it from TVAULT_PASSWORD.
pub fn prompt_new_password(interactive: bool) -> anyhow::Result<String> {
    if let Some(value) = env_password() {
        return Ok(value);
    }
    if !interactive {
        return Err(no_password_error().into());
    }
    Password::new()
        .with_prompt("Enter password")
        .with_confirmation("Confirm password", "Passwords do not match")
        .interact()
        .map_err(|e| anyhow::anyhow!("Failed to read password: {}", e))
}

pub fn no_password_error() -> CliError {
    CliError::invalid_input(format!(
        "No password provided and no TTY available. Set {}.",
        PASSWORD_ENV
    ))
}

/// Creation time encoded in a backup key (`.../ung_<unix-seconds>.db.encrypted`).
pub fn backup_timestamp(key: &str) -> Option<DateTime<Utc>> {
    let file = key.rsplit('/').next()?;
    let seconds = file
        .strip_prefix("ung_")?
        .strip_suffix(".db.encrypted")?
        .parse::<i64>()
        .ok()?;
    DateTime::from_timestamp(seconds, 0)
}
