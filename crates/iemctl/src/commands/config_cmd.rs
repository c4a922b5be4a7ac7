//! `config show` / `config path`. Neither needs a connection.

use serde::Serialize;
use tabled::Tabled;

use iem_config::Settings;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts, OutputFormat};
use crate::config;
use crate::error::CliError;
use crate::output;

#[derive(Serialize)]
struct PathInfo {
    path: String,
    exists: bool,
}

#[derive(Tabled)]
struct PathRow {
    #[tabled(rename = "Config file")]
    path: String,
    #[tabled(rename = "Exists")]
    exists: bool,
}

pub fn handle(
    args: &ConfigArgs,
    global: &GlobalOpts,
    settings: &Settings,
    format: OutputFormat,
) -> Result<(), CliError> {
    let rendered = match args.command {
        ConfigCommand::Show => show(settings, format)?,
        ConfigCommand::Path => {
            let path = config::config_path(global);
            if format == OutputFormat::Plain {
                path.display().to_string()
            } else {
                let info = PathInfo {
                    exists: path.exists(),
                    path: path.display().to_string(),
                };
                output::render_rows(format, std::slice::from_ref(&info), |i| PathRow {
                    path: i.path.clone(),
                    exists: i.exists,
                })
            }
        }
    };
    output::print_output(&rendered, global.quiet);
    Ok(())
}

/// Effective settings with the password masked.
fn show(settings: &Settings, format: OutputFormat) -> Result<String, CliError> {
    match format {
        OutputFormat::Table | OutputFormat::Plain => Ok(settings.to_redacted_toml()?),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(&settings.redacted())?),
        OutputFormat::JsonCompact => Ok(serde_json::to_string(&settings.redacted())?),
        OutputFormat::Yaml => serde_yaml::to_string(&settings.redacted()).map_err(|e| {
            CliError::Validation {
                field: "output".into(),
                reason: e.to_string(),
            }
        }),
    }
}
