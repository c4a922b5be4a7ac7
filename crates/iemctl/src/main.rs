mod cli;
mod commands;
mod config;
mod error;
mod output;

use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

use iem_config::Settings;

use crate::cli::{Cli, Command, GlobalOpts, OutputFormat};
use crate::commands::Context;
use crate::error::CliError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.global.verbose);

    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    // Completions need neither config nor a connection.
    if let Command::Completions(args) = &cli.command {
        let mut cmd = Cli::command();
        clap_complete::generate(args.shell, &mut cmd, "iemctl", &mut std::io::stdout());
        return Ok(());
    }

    let settings = config::load(&cli.global)?;
    let format = output::resolve_format(&cli.global, &settings);

    match cli.command {
        Command::Config(args) => {
            commands::config_cmd::handle(&args, &cli.global, &settings, format)
        }
        cmd => {
            let result = execute(cmd, &cli.global, &settings, format).await;
            // Failed API calls also answer in the requested structured format.
            if let Some(flat) = result
                .as_ref()
                .err()
                .and_then(CliError::outcome)
                .and_then(|outcome| output::render_failure(format, outcome))
            {
                output::print_output(&flat, cli.global.quiet);
            }
            result
        }
    }
}

async fn execute(
    cmd: Command,
    global: &GlobalOpts,
    settings: &Settings,
    format: OutputFormat,
) -> Result<(), CliError> {
    let connection = config::connection(settings)?;
    let client = connection.client()?;
    tracing::debug!(url = %connection.url, command = ?cmd, "dispatching command");

    let ctx = Context {
        client: &client,
        connection: &connection,
        settings,
        global,
        format,
    };
    commands::dispatch(cmd, &ctx).await
}
