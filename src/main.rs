use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;
mod domain;
mod services;

use cli::{Cli, Commands};
use commands::handle_dump_commands;
use domain::models::SettingsFile;
use services::fleet::FleetClient;
use services::settings::{load_settings, resolve, settings_path, Overrides};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "fleetdump=debug"
    } else {
        "fleetdump=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    let file = match settings_path() {
        Some(path) => load_settings(&path)?,
        None => SettingsFile::default(),
    };
    let conn = cli.connection.clone();
    let config = resolve(
        Overrides {
            kibana_host: conn.kibana_host,
            username: conn.username,
            password: conn.password,
            api_key: conn.api_key,
            insecure: conn.insecure,
            timeout_secs: conn.timeout_secs,
        },
        file,
    )?;
    tracing::debug!(host = %config.host, "using Kibana");
    let client = FleetClient::new(config)?;

    match &cli.command {
        Commands::Dump { command } => handle_dump_commands(&cli, command, &client)?,
    }

    Ok(())
}
