use anyhow::Result;
use clap::Parser;
use log::info;
use std::net::SocketAddr;
use tokio::signal;

use vault_service::{Config, VaultServer};

#[derive(Parser)]
#[command(name = "vault-service")]
#[command(about = "Vault epoch service providing a JSON-RPC endpoint")]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// JSON-RPC server address
    #[arg(long, default_value = "127.0.0.1:8080")]
    json_rpc_addr: SocketAddr,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(&args.log_level)
    ).init();

    info!("Starting vault service");

    // Load configuration
    let config = Config::load(&args.config)?;
    info!("Configuration loaded from: {}", args.config);

    // Initialize server
    let server = VaultServer::new(config).await?;
    let clock = server.service().clock().await;
    info!(
        "Vault initialized with origin {} and {}s epochs",
        clock.origin(),
        clock.epoch_duration()
    );

    let ticker = server.start_epoch_ticker();

    // Start JSON-RPC server
    let json_rpc_server = server.start_json_rpc_server(args.json_rpc_addr).await?;
    info!("JSON-RPC server started on {}", args.json_rpc_addr);
    let handle = tokio::spawn(json_rpc_server);

    info!("Vault service is running");

    // Wait for shutdown signal
    signal::ctrl_c().await?;
    info!("Shutdown signal received, stopping servers...");

    handle.abort();
    if let Some(ticker) = ticker {
        ticker.abort();
    }

    info!("Vault service stopped");
    Ok(())
}
