use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "fleetdump", version, about = "Export Fleet objects to a local directory")]
pub struct Cli {
    #[arg(long, global = true, help = "Output machine-readable JSON")]
    pub json: bool,
    #[arg(short, long, global = true, help = "Enable debug logging")]
    pub verbose: bool,
    #[command(flatten)]
    pub connection: ConnectionArgs,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args, Debug, Clone, Default)]
pub struct ConnectionArgs {
    #[arg(long, global = true, env = "FLEETDUMP_KIBANA_HOST", help = "Kibana base URL")]
    pub kibana_host: Option<String>,
    #[arg(long, global = true, env = "FLEETDUMP_USERNAME")]
    pub username: Option<String>,
    #[arg(long, global = true, env = "FLEETDUMP_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
    #[arg(long, global = true, env = "FLEETDUMP_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,
    #[arg(long, global = true, help = "Accept invalid TLS certificates")]
    pub insecure: bool,
    #[arg(long, global = true, help = "Request timeout in seconds")]
    pub timeout_secs: Option<u64>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    Dump {
        #[command(subcommand)]
        command: DumpCommands,
    },
}

#[derive(Subcommand, Debug)]
pub enum DumpCommands {
    AgentPolicies {
        #[arg(short, long, help = "Directory the dump is written to")]
        output: PathBuf,
        #[arg(long, conflicts_with = "package", help = "Dump only this agent policy")]
        agent_policy: Option<String>,
        #[arg(long, help = "Dump agent policies using this package")]
        package: Option<String>,
    },
}
