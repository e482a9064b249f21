//! syncplicity_sample CLI - Walk through the Syncplicity provisioning and content APIs.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use syncplicity_sample::samples::{ContentSample, ProvisioningSample};
use syncplicity_sample::{Config, Gateway};

/// Sample application for the Syncplicity REST API.
#[derive(Parser)]
#[command(name = "syncplicity_sample")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the properties file with application credentials.
    #[arg(long, env = "SYNCPLICITY_CONFIG", default_value = "config.properties")]
    config: PathBuf,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Clone, Copy)]
enum Commands {
    /// Run the provisioning walkthrough, then the content walkthrough.
    Run,

    /// Create and delete users and a group.
    Provisioning,

    /// Create a syncpoint, upload and share a file, then clean up.
    Content,

    /// Authenticate and immediately revoke the token.
    Revoke,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    info!("Syncplicity sample app starting...");

    let config = Config::from_file(&cli.config)
        .with_context(|| format!("Failed to load configuration from {:?}", cli.config))?;
    config.validate()?;

    let gateway = Gateway::new(config).context("Failed to create HTTP client")?;

    gateway.authenticate().await;
    if !gateway.is_authenticated().await {
        error!("The OAuth authentication has failed, the app cannot continue.");
        std::process::exit(1);
    }
    info!("Authentication was successful.");

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => {
            run_provisioning(&gateway).await;
            run_content(&gateway).await;
        }
        Commands::Provisioning => run_provisioning(&gateway).await,
        Commands::Content => run_content(&gateway).await,
        Commands::Revoke => {
            gateway.revoke_token().await;
            if gateway.is_authenticated().await {
                println!("Token revocation did not invalidate the session.");
            } else {
                println!("Token revoked.");
            }
        }
    }

    Ok(())
}

async fn run_provisioning(gateway: &Gateway) {
    ProvisioningSample::new(gateway).execute().await;
    println!("Provisioning part is completed.");
}

async fn run_content(gateway: &Gateway) {
    println!("Starting Content part...");
    ContentSample::new(gateway).execute().await;
    println!("Content part is completed.");
}
