//! `login` and `logout`.

use iem_core::iem_api::BearerToken;

use crate::cli::LogoutArgs;
use crate::error::CliError;
use crate::output;

use super::Context;

/// Log in and print the raw bearer token.
pub async fn login(ctx: &Context<'_>) -> Result<(), CliError> {
    let credentials = &ctx.connection.credentials;
    let response = ctx
        .client
        .login_direct(&credentials.username, &credentials.password)
        .await?;
    ctx.print(&output::render_single(ctx.format, &response, |token| {
        token.expose().to_owned()
    }));
    Ok(())
}

pub async fn logout(args: &LogoutArgs, ctx: &Context<'_>) -> Result<(), CliError> {
    let token = match args.token {
        Some(ref raw) => BearerToken::new(raw.clone()),
        None => ctx.login().await?,
    };
    let response = ctx.client.logout(&token).await?;
    ctx.print(&output::render_single(ctx.format, &response, Clone::clone));
    Ok(())
}
