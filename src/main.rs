mod api;
mod auth;
mod config;
mod error;
mod provider;
mod request;
mod updater;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use crate::provider::digitalocean::DigitalOceanClient;

#[derive(Parser, Debug)]
#[command(name = "ddns-do")]
#[command(about = "A dyndns2-compatible update endpoint for DigitalOcean DNS")]
struct Args {
    /// Path to the configuration file, relative to the install directory
    #[arg(short, long, default_value = "config.json")]
    config: PathBuf,

    /// Install directory to run from
    #[arg(long, env = "DDNS_HOME")]
    home: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    if let Some(home) = &args.home {
        std::env::set_current_dir(home)
            .with_context(|| format!("Failed to enter install directory: {}", home.display()))?;
    }

    // Load and validate configuration first (before logger init)
    let config = config::Config::load_or_init(&args.config)?;
    config
        .validate()
        .with_context(|| format!("Invalid config file: {}", args.config.display()))?;

    // Initialize logger with config log level (env var takes precedence)
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(&config.server.log_level)
    ).init();

    info!("Loaded configuration from: {}", args.config.display());

    let config = Arc::new(config);
    let provider = Arc::new(DigitalOceanClient::new(config.digitalocean_token.clone()));

    // Create router
    let app = api::create_router(config.clone(), provider);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("Server listening on http://{}", addr);
    info!("DDNS endpoint: GET /nic/update?hostname={{host}}&ip={{ip}}");

    axum::serve(listener, app).await?;

    Ok(())
}
