//! Application configuration handlers.

use std::path::Path;

use tabled::Tabled;

use iem_core::iem_api::{AppConfiguration, ConfigFile, NewConfiguration};
use iem_core::resolve;

use crate::cli::ConfigsCommand;
use crate::error::CliError;
use crate::output;

use super::{Context, util};

#[derive(Tabled)]
struct ConfigRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Versions")]
    versions: String,
}

impl From<&AppConfiguration> for ConfigRow {
    fn from(c: &AppConfiguration) -> Self {
        Self {
            id: c.app_config_id.clone(),
            name: c.display_name.clone(),
            versions: c
                .versions
                .iter()
                .map(|v| v.ref_name.as_str())
                .collect::<Vec<_>>()
                .join(", "),
        }
    }
}

fn file_name(path: &Path) -> Result<String, CliError> {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| CliError::Validation {
            field: "file".into(),
            reason: format!("{} has no file name", path.display()),
        })
}

pub async fn handle(cmd: ConfigsCommand, ctx: &Context<'_>) -> Result<(), CliError> {
    let token = ctx.login().await?;

    match cmd {
        ConfigsCommand::List { app_id } => {
            let response = ctx.client.list_app_configurations(&token, &app_id).await?;
            ctx.print(&output::render_list(
                ctx.format,
                &response,
                |c| ConfigRow::from(c),
                |c| c.app_config_id.clone(),
            ));
        }

        ConfigsCommand::Add {
            app_id,
            name,
            description,
            vol_path,
            relative_path,
        } => {
            let config = NewConfiguration {
                display_name: name,
                description,
                vol_path,
                relative_path,
            };
            let response = ctx
                .client
                .add_versioned_configuration(&token, &app_id, &config)
                .await?;
            ctx.print(&output::render_single(ctx.format, &response, Clone::clone));
        }

        ConfigsCommand::Upload {
            app_id,
            config,
            file,
            reference_name,
            description,
        } => {
            let config_id = resolve::resolve_config_id(ctx.client, &token, &app_id, &config).await?;
            let upload = ConfigFile {
                reference_name,
                description,
                filename: file_name(&file)?,
                content: std::fs::read_to_string(&file)?,
            };
            let response = ctx
                .client
                .upload_configuration_file(&token, &app_id, &config_id, &upload)
                .await?;
            ctx.print(&output::render_single(ctx.format, &response, Clone::clone));
        }

        ConfigsCommand::Id {
            app_id,
            name,
            version,
        } => {
            let response = match version {
                Some(ref_name) => util::resolved(
                    "Configuration version ID",
                    resolve::resolve_config_version_id(
                        ctx.client, &token, &app_id, &name, &ref_name,
                    )
                    .await?,
                ),
                None => util::resolved(
                    "Configuration ID",
                    resolve::resolve_config_id(ctx.client, &token, &app_id, &name).await?,
                ),
            };
            ctx.print(&output::render_single(ctx.format, &response, Clone::clone));
        }
    }

    Ok(())
}
