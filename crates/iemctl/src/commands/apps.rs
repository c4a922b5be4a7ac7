//! Application command handlers.

use serde::Serialize;
use tabled::Tabled;

use iem_core::iem_api::{Application, InstalledApp};
use iem_core::resolve;

use crate::cli::{AppSelector, AppsCommand};
use crate::error::CliError;
use crate::output;

use super::{Context, util};

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct AppRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Title")]
    title: String,
}

impl From<&Application> for AppRow {
    fn from(app: &Application) -> Self {
        Self {
            id: app.application_id.clone(),
            title: app.title.clone(),
        }
    }
}

impl From<&InstalledApp> for AppRow {
    fn from(app: &InstalledApp) -> Self {
        Self {
            id: app.application_id.clone(),
            title: app.title.clone(),
        }
    }
}

#[derive(Serialize)]
struct InstalledCheck {
    device: String,
    title: String,
    installed: bool,
    application_id: Option<String>,
}

#[derive(Tabled)]
struct InstalledCheckRow {
    #[tabled(rename = "Device")]
    device: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Installed")]
    installed: String,
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(cmd: AppsCommand, ctx: &Context<'_>) -> Result<(), CliError> {
    let token = ctx.login().await?;

    match cmd {
        AppsCommand::List => {
            let response = ctx.client.list_apps(&token).await?;
            ctx.print(&output::render_list(
                ctx.format,
                &response,
                |a| AppRow::from(a),
                |a| a.application_id.clone(),
            ));
        }

        AppsCommand::Installed { device, title } => {
            let device_id = resolve::resolve_device_id(ctx.client, &token, &device).await?;
            if let Some(title) = title {
                let application_id =
                    resolve::find_installed_app(ctx.client, &token, &device_id, &title).await?;
                let check = InstalledCheck {
                    device,
                    title,
                    installed: application_id.is_some(),
                    application_id,
                };
                ctx.print(&output::render_rows(
                    ctx.format,
                    std::slice::from_ref(&check),
                    |c| InstalledCheckRow {
                        device: c.device.clone(),
                        title: c.title.clone(),
                        installed: c
                            .application_id
                            .as_ref()
                            .map_or_else(|| "no".into(), |id| format!("yes ({id})")),
                    },
                ));
            } else {
                let response = ctx.client.list_installed_apps(&token, &device_id).await?;
                ctx.print(&output::render_list(
                    ctx.format,
                    &response,
                    |a| AppRow::from(a),
                    |a| a.application_id.clone(),
                ));
            }
        }

        AppsCommand::Id { title } => {
            let response = ctx.client.app_id_by_title(&token, &title).await?;
            ctx.print(&output::render_single(ctx.format, &response, Clone::clone));
        }

        AppsCommand::LatestVersion(AppSelector { app_id, app_name }) => {
            let app_id = match (app_id, app_name) {
                (Some(id), _) => id,
                (None, Some(title)) => ctx
                    .client
                    .app_id_by_title(&token, &title)
                    .await?
                    .into_payload(),
                (None, None) => {
                    return Err(CliError::Validation {
                        field: "app".into(),
                        reason: "pass --app-id or --app-name".into(),
                    });
                }
            };
            let response = ctx.client.newest_app_version_id(&token, &app_id).await?;
            ctx.print(&output::render_single(ctx.format, &response, Clone::clone));
        }

        AppsCommand::Delete { app_id } => {
            if !util::confirm(&format!("Delete application {app_id}?"), ctx.global.yes)? {
                return Ok(());
            }
            let response = ctx.client.delete_app(&token, &app_id).await?;
            ctx.print(&output::render_single(ctx.format, &response, |data| {
                format!("Deleted {app_id}: {data}")
            }));
        }
    }

    Ok(())
}
