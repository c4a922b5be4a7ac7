//! Device command handlers.

use tabled::Tabled;

use iem_core::iem_api::Device;
use iem_core::resolve;

use crate::cli::DevicesCommand;
use crate::error::CliError;
use crate::output;

use super::{Context, util};

#[derive(Tabled)]
struct DeviceRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
}

impl From<&Device> for DeviceRow {
    fn from(d: &Device) -> Self {
        Self {
            id: d.device_id.clone(),
            name: d.device_name.clone(),
        }
    }
}

pub async fn handle(cmd: DevicesCommand, ctx: &Context<'_>) -> Result<(), CliError> {
    let token = ctx.login().await?;

    match cmd {
        DevicesCommand::List { size, page } => {
            let response = ctx.client.list_devices(&token, size, page).await?;
            ctx.print(&output::render_list(
                ctx.format,
                &response,
                |d| DeviceRow::from(d),
                |d| d.device_id.clone(),
            ));
        }

        DevicesCommand::Id { name } => {
            let id = resolve::resolve_device_id(ctx.client, &token, &name).await?;
            let response = util::resolved("Device ID", id);
            ctx.print(&output::render_single(ctx.format, &response, Clone::clone));
        }

        DevicesCommand::Discover { name } => {
            let response = ctx.client.device_id_by_name(&token, &name).await?;
            ctx.print(&output::render_single(ctx.format, &response, Clone::clone));
        }

        DevicesCommand::Activation { name } => {
            let activated = resolve::activation_status(ctx.client, &token, &name).await?;
            let response = util::resolved("Activation", activated);
            ctx.print(&output::render_single(ctx.format, &response, |confirmed| {
                if *confirmed {
                    format!("{name}: activated")
                } else {
                    format!("{name}: not activated")
                }
            }));
        }

        DevicesCommand::Create { from_file } => {
            let definition = util::read_json_file(&from_file)?;
            let response = ctx.client.create_device(&token, &definition).await?;
            ctx.print(&output::render_single(ctx.format, &response, Clone::clone));
        }
    }

    Ok(())
}
