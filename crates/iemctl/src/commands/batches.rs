//! `install` / `uninstall`: queue a batch for one device.

use iem_core::AppRef;

use crate::cli::BatchArgs;
use crate::error::CliError;
use crate::output;

use super::{Context, util};

fn app_ref(args: &BatchArgs) -> Result<AppRef, CliError> {
    match (&args.app, &args.app_name) {
        (Some(id), _) => Ok(AppRef::Id(id.clone())),
        (None, Some(title)) => Ok(AppRef::Title(title.clone())),
        (None, None) => Err(CliError::Validation {
            field: "app".into(),
            reason: "pass --app or --app-name".into(),
        }),
    }
}

pub async fn install(args: &BatchArgs, ctx: &Context<'_>) -> Result<(), CliError> {
    let app = app_ref(args)?;
    let schedule = util::parse_schedule(args.schedule.as_deref())?;
    let response = ctx
        .workflow()
        .install(&app, &args.device, schedule)
        .await?;
    ctx.print(&output::render_single(ctx.format, &response, |batch| {
        format!("Install queued on {}: {batch}", args.device)
    }));
    Ok(())
}

pub async fn uninstall(args: &BatchArgs, ctx: &Context<'_>) -> Result<(), CliError> {
    let app = app_ref(args)?;
    let schedule = util::parse_schedule(args.schedule.as_deref())?;
    let response = ctx
        .workflow()
        .uninstall(&app, &args.device, schedule)
        .await?;
    ctx.print(&output::render_single(ctx.format, &response, |batch| {
        format!("Uninstall queued on {}: {batch}", args.device)
    }));
    Ok(())
}
