//! CLI entry point.
//!
//! Loads `.env`, parses arguments, installs logging, resolves the
//! configuration and dispatches to a handler.

use clap::Parser;
use tracing_subscriber::EnvFilter;

use svcshell_cli::{Cli, CliConfig, CliError, Commands, handlers};

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

async fn dispatch(cli: &Cli) -> Result<(), CliError> {
    let config = CliConfig::from_cli(cli)?;
    match cli.resolved_command() {
        Commands::Run => handlers::run::execute(&config).await,
        Commands::Probe => handlers::probe::execute(&config).await,
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env is optional
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(err) = dispatch(&cli).await {
        eprintln!("Error: {err}");
        std::process::exit(err.exit_code());
    }
    Ok(())
}
