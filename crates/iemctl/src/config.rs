//! CLI-specific configuration wrappers.
//!
//! Folds `GlobalOpts` into the iem-config layering and fills in a missing
//! password interactively when stdin is a terminal.

use std::io::IsTerminal;
use std::path::PathBuf;

use iem_config::{Overrides, Settings};
use iem_core::ConnectionConfig;

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// Global flags as the top configuration layer.
pub fn overrides(global: &GlobalOpts) -> Overrides {
    Overrides {
        url: global.ie_url.clone(),
        username: global.username.clone(),
        password: global.password.clone(),
        timeout: global.timeout,
        strict_tls: global.strict_tls.then_some(true),
        ca_cert: global.ca_cert.clone(),
        ..Overrides::default()
    }
}

/// The file actually consulted: `--config` or the platform default.
pub fn config_path(global: &GlobalOpts) -> PathBuf {
    global.config.clone().unwrap_or_else(iem_config::config_path)
}

/// Load the effective settings for this invocation.
pub fn load(global: &GlobalOpts) -> Result<Settings, CliError> {
    let path = config_path(global);
    Ok(iem_config::load_settings(Some(&path), &overrides(global))?)
}

/// Build the connection, prompting for a missing password on a terminal.
pub fn connection(settings: &Settings) -> Result<ConnectionConfig, CliError> {
    if settings.password.is_none() && settings.username.is_some() && std::io::stdin().is_terminal()
    {
        let password = rpassword::prompt_password("IEM password: ").map_err(CliError::Io)?;
        let completed = Settings {
            password: Some(password),
            ..settings.clone()
        };
        return Ok(completed.connection()?);
    }
    Ok(settings.connection()?)
}
