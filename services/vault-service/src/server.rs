use anyhow::{bail, Result};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use vault_core_types::Timestamp;
use vault_impl::{InMemoryBurnerRouter, InMemoryVault, StateSnapshot};

use crate::config::Config;
use crate::service::{unix_now, VaultService};
use crate::services::{EpochConfig, EpochService};

pub const SNAPSHOT_FILE: &str = "vault.snapshot";

/// Build fresh state from configuration, with epoch 0 starting at the
/// configured origin or `now`
pub fn initial_state(config: &Config, now: Timestamp) -> Result<(InMemoryVault, InMemoryBurnerRouter)> {
    let burner_router = InMemoryBurnerRouter::new(config.burner.params(config.vault.collateral))?;

    let origin = config.clock.origin_timestamp.unwrap_or(now);
    let vault = InMemoryVault::new(
        config.vault.params(config.burner.address)?,
        config.vault.metadata(),
        origin,
    )?;

    Ok((vault, burner_router))
}

pub struct VaultServer {
    service: VaultService,
    epochs: EpochService,
    config: Config,
}

impl VaultServer {
    pub async fn new(config: Config) -> Result<Self> {
        let now = unix_now();

        // Initialize state based on config
        let service = match config.storage.storage_type.as_str() {
            "memory" => {
                let (vault, burner_router) = initial_state(&config, now)?;
                VaultService::new(vault, burner_router, config.clone())
            }
            "file" => {
                let path = Self::snapshot_path(&config);
                let (vault, burner_router) = match StateSnapshot::load(&path)? {
                    Some(snapshot) => {
                        log::info!("Restored state from {}", path.display());
                        (snapshot.vault, snapshot.burner_router)
                    }
                    None => {
                        let (vault, burner_router) = initial_state(&config, now)?;
                        StateSnapshot::new(vault.clone(), burner_router.clone(), now).save(&path)?;
                        log::info!("Created new state at {}", path.display());
                        (vault, burner_router)
                    }
                };
                VaultService::new(vault, burner_router, config.clone()).with_snapshot_path(path)
            }
            _ => {
                bail!("Unsupported storage type: {}", config.storage.storage_type);
            }
        };

        let epochs = EpochService::new(
            EpochConfig {
                tick_interval_ms: config.clock.tick_interval_ms,
                auto_advance: config.clock.auto_advance,
            },
            service.clock().await,
        );

        Ok(Self {
            service,
            epochs,
            config,
        })
    }

    fn snapshot_path(config: &Config) -> PathBuf {
        let data_dir = config.storage.data_dir.as_deref().unwrap_or("data");
        Path::new(data_dir).join(SNAPSHOT_FILE)
    }

    pub fn service(&self) -> &VaultService {
        &self.service
    }

    pub fn epochs(&self) -> &EpochService {
        &self.epochs
    }

    /// Start the epoch ticker; transitions are already logged by the ticker
    pub fn start_epoch_ticker(&self) -> Option<tokio::task::JoinHandle<()>> {
        self.epochs.start()
    }

    pub async fn start_json_rpc_server(
        &self,
        addr: SocketAddr,
    ) -> Result<impl std::future::Future<Output = ()>> {
        use crate::json_rpc::JsonRpcServerImpl;

        let server_impl = JsonRpcServerImpl::new(self.service.clone(), self.config.server.max_connections);
        let server = server_impl.start(addr).await?;

        Ok(async move { server.await })
    }
}
