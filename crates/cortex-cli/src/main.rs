use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use cortex_core::api::{DEFAULT_API_HOST, DEFAULT_API_PORT};
use cortex_core::{path, ApiClient, ApiConfig, Id};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "cortex")]
#[command(about = "Query the cortex snapshot API", long_about = None)]
struct Cli {
    /// API server address
    #[arg(long, short = 'H', global = true, default_value = DEFAULT_API_HOST, env = "CORTEX_API_HOST")]
    host: String,

    /// API server port
    #[arg(long, short, global = true, default_value_t = DEFAULT_API_PORT, env = "CORTEX_API_PORT")]
    port: u16,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List all users
    GetUsers,
    /// Show one user's details
    GetUser { user_id: String },
    /// List a user's snapshots
    GetSnapshots { user_id: String },
    /// Show a snapshot and the fields it holds
    GetSnapshot { user_id: String, snapshot_id: String },
    /// Show one field of a snapshot
    GetResult {
        user_id: String,
        snapshot_id: String,
        field: String,
        /// Also write the result as JSON to this file
        #[arg(long, short)]
        save: Option<PathBuf>,
    },
}

impl Commands {
    fn resource_path(&self) -> String {
        match self {
            Commands::GetUsers => path::users(),
            Commands::GetUser { user_id } => path::user(&Id::from(user_id.as_str())),
            Commands::GetSnapshots { user_id } => path::snapshots(&Id::from(user_id.as_str())),
            Commands::GetSnapshot {
                user_id,
                snapshot_id,
            } => path::snapshot(
                &Id::from(user_id.as_str()),
                &Id::from(snapshot_id.as_str()),
            ),
            Commands::GetResult {
                user_id,
                snapshot_id,
                field,
                ..
            } => path::field(
                &Id::from(user_id.as_str()),
                &Id::from(snapshot_id.as_str()),
                field,
            ),
        }
    }

    fn save_path(&self) -> Option<&Path> {
        match self {
            Commands::GetResult { save, .. } => save.as_deref(),
            _ => None,
        }
    }
}

fn save_result(path: &Path, result: &Value) -> Result<()> {
    let contents = serde_json::to_string_pretty(result).context("Failed to encode result")?;
    fs::write(path, contents).with_context(|| format!("Failed to write {}", path.display()))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let client = ApiClient::new(ApiConfig::new(cli.host, cli.port))?;

    let resource = cli.command.resource_path();
    let result = client
        .fetch_resource(&resource)
        .await
        .with_context(|| format!("Failed to fetch {resource}"))?;

    println!("{}", serde_json::to_string_pretty(&result)?);
    if let Some(path) = cli.command.save_path() {
        save_result(path, &result)?;
    }

    Ok(())
}
