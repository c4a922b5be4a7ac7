//! Command handlers, one module per top-level command group.

pub mod apps;
pub mod auth;
pub mod batches;
pub mod categories;
pub mod config_cmd;
pub mod configs;
pub mod deploy;
pub mod devices;
pub mod util;

use iem_config::Settings;
use iem_core::iem_api::{BearerToken, IemClient};
use iem_core::{ConnectionConfig, Workflow};

use crate::cli::{Command, GlobalOpts, OutputFormat};
use crate::error::CliError;

/// Everything a connected command needs.
pub struct Context<'a> {
    pub client: &'a IemClient,
    pub connection: &'a ConnectionConfig,
    pub settings: &'a Settings,
    pub global: &'a GlobalOpts,
    pub format: OutputFormat,
}

impl Context<'_> {
    pub fn workflow(&self) -> Workflow<'_> {
        Workflow::new(self.client, &self.connection.credentials)
    }

    /// Fresh bearer token for a single-call command.
    pub async fn login(&self) -> Result<BearerToken, CliError> {
        Ok(self.workflow().login().await?)
    }

    pub fn print(&self, rendered: &str) {
        crate::output::print_output(rendered, self.global.quiet);
    }
}

/// Route a connected command to its handler.
pub async fn dispatch(cmd: Command, ctx: &Context<'_>) -> Result<(), CliError> {
    match cmd {
        Command::Pipeline(args) => deploy::pipeline(&args, ctx).await,
        Command::Standalone(args) => deploy::standalone(&args, ctx).await,
        Command::Login => auth::login(ctx).await,
        Command::Logout(args) => auth::logout(&args, ctx).await,
        Command::Apps(args) => apps::handle(args.command, ctx).await,
        Command::Devices(args) => devices::handle(args.command, ctx).await,
        Command::Install(args) => batches::install(&args, ctx).await,
        Command::Uninstall(args) => batches::uninstall(&args, ctx).await,
        Command::Configs(args) => configs::handle(args.command, ctx).await,
        Command::Categories(args) => categories::handle(args.command, ctx).await,
        // Both are answered before a connection is built.
        Command::Config(_) | Command::Completions(_) => Ok(()),
    }
}
