//! Shared helpers for command handlers.

use std::path::Path;

use chrono::{DateTime, Utc};
use iem_core::iem_api::Response;

use crate::error::CliError;

/// Prompt for confirmation, auto-approving if `--yes` was passed.
pub fn confirm(message: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    if !std::io::IsTerminal::is_terminal(&std::io::stdin()) {
        return Err(CliError::NonInteractiveRequiresYes {
            action: message.into(),
        });
    }
    let confirmed = dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(std::io::Error::other(e)))?;
    Ok(confirmed)
}

/// Read and parse a JSON file for `--from-file` flags.
pub fn read_json_file(path: &Path) -> Result<serde_json::Value, CliError> {
    let contents = std::fs::read_to_string(path)?;
    serde_json::from_str(&contents).map_err(|e| CliError::Validation {
        field: "from-file".into(),
        reason: format!("invalid JSON: {e}"),
    })
}

/// Parse a `--schedule` timestamp.
pub fn parse_schedule(raw: Option<&str>) -> Result<Option<DateTime<Utc>>, CliError> {
    raw.map(|text| {
        DateTime::parse_from_rfc3339(text)
            .map(|at| at.with_timezone(&Utc))
            .map_err(|e| CliError::Validation {
                field: "schedule".into(),
                reason: format!("'{text}' is not an RFC 3339 timestamp: {e}"),
            })
    })
    .transpose()
}

/// Wrap a locally resolved value so it renders like an API result. The
/// listing it came from answered 200.
pub fn resolved<T>(label: &'static str, value: T) -> Response<T> {
    Response {
        status: 200,
        label,
        payload: value,
    }
}
