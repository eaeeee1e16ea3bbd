use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;

use serde::{Deserialize, Serialize};
use vault_core_types::{
    AccessControl, Address, BurnerRouter, Epoch, EpochClock, EpochInfo, RoleId, Timestamp, TokenMetadata,
    TokenizedVault, Vault,
};
use vault_impl::{InMemoryBurnerRouter, InMemoryVault, StateSnapshot};

use crate::config::Config;
use crate::error::ServiceResult;

/// Current Unix time in seconds
pub fn unix_now() -> Timestamp {
    u64::try_from(chrono::Utc::now().timestamp()).unwrap_or(0)
}

/// Vault service answering epoch and collaborator queries
#[derive(Clone)]
pub struct VaultService {
    vault: Arc<RwLock<InMemoryVault>>,
    burner_router: Arc<RwLock<InMemoryBurnerRouter>>,
    config: Config,
    snapshot_path: Option<PathBuf>,
}

impl VaultService {
    pub fn new(vault: InMemoryVault, burner_router: InMemoryBurnerRouter, config: Config) -> Self {
        Self {
            vault: Arc::new(RwLock::new(vault)),
            burner_router: Arc::new(RwLock::new(burner_router)),
            config,
            snapshot_path: None,
        }
    }

    /// Persist state to `path` after every change
    pub fn with_snapshot_path(mut self, path: PathBuf) -> Self {
        self.snapshot_path = Some(path);
        self
    }

    fn resolve(at: Option<Timestamp>) -> Timestamp {
        at.unwrap_or_else(unix_now)
    }

    //--------------------------------------------------------------------------
    // EPOCHS
    //--------------------------------------------------------------------------

    pub async fn clock(&self) -> EpochClock {
        *self.vault.read().await.clock()
    }

    pub async fn epoch_duration(&self) -> u64 {
        self.vault.read().await.epoch_duration()
    }

    /// Veto window of the bound slasher, as configured
    pub fn veto_duration(&self) -> u64 {
        self.config.vault.veto_duration
    }

    pub async fn current_epoch(&self, at: Option<Timestamp>) -> ServiceResult<Epoch> {
        Ok(self.vault.read().await.current_epoch(Self::resolve(at))?)
    }

    pub async fn current_epoch_start(&self, at: Option<Timestamp>) -> ServiceResult<Timestamp> {
        Ok(self.vault.read().await.current_epoch_start(Self::resolve(at))?)
    }

    pub async fn next_epoch_start(&self, at: Option<Timestamp>) -> ServiceResult<Timestamp> {
        Ok(self.vault.read().await.next_epoch_start(Self::resolve(at))?)
    }

    pub async fn previous_epoch_start(&self, at: Option<Timestamp>) -> ServiceResult<Timestamp> {
        Ok(self.vault.read().await.previous_epoch_start(Self::resolve(at))?)
    }

    pub async fn epoch_info(&self, at: Option<Timestamp>) -> ServiceResult<EpochInfo> {
        Ok(self.vault.read().await.epoch_at(Self::resolve(at))?)
    }

    //--------------------------------------------------------------------------
    // VAULT
    //--------------------------------------------------------------------------

    pub async fn collateral(&self) -> Address {
        self.vault.read().await.collateral()
    }

    pub async fn burner(&self) -> Address {
        self.vault.read().await.burner()
    }

    pub async fn delegator(&self) -> Address {
        self.vault.read().await.delegator()
    }

    pub async fn slasher(&self) -> Address {
        self.vault.read().await.slasher()
    }

    pub async fn is_initialized(&self) -> bool {
        self.vault.read().await.is_initialized()
    }

    pub async fn is_delegator_initialized(&self) -> bool {
        self.vault.read().await.is_delegator_initialized()
    }

    pub async fn is_slasher_initialized(&self) -> bool {
        self.vault.read().await.is_slasher_initialized()
    }

    pub async fn token_metadata(&self) -> TokenMetadata {
        self.vault.read().await.metadata().clone()
    }

    pub async fn has_role(&self, role: RoleId, account: Address) -> bool {
        self.vault.read().await.has_role(role, account)
    }

    /// Bind the delegator and persist the result
    ///
    /// The binding only takes effect once the snapshot is written.
    pub async fn set_delegator(&self, caller: Address, delegator: Address) -> ServiceResult<()> {
        let mut vault = self.vault.write().await;
        let mut staged = vault.clone();
        staged.set_delegator(caller, delegator)?;
        self.persist(&staged).await?;
        *vault = staged;
        log::info!("Delegator bound to {}", delegator);
        Ok(())
    }

    /// Bind the slasher and persist the result
    ///
    /// The binding only takes effect once the snapshot is written.
    pub async fn set_slasher(&self, caller: Address, slasher: Address) -> ServiceResult<()> {
        let mut vault = self.vault.write().await;
        let mut staged = vault.clone();
        staged.set_slasher(caller, slasher)?;
        self.persist(&staged).await?;
        *vault = staged;
        log::info!("Slasher bound to {}", slasher);
        Ok(())
    }

    //--------------------------------------------------------------------------
    // BURNER ROUTER
    //--------------------------------------------------------------------------

    pub async fn burner_router(&self) -> BurnerRouterInfo {
        let router = self.burner_router.read().await;
        BurnerRouterInfo {
            owner: router.owner(),
            collateral: router.collateral(),
            global_receiver: router.global_receiver(),
            delay: router.delay(),
        }
    }

    pub async fn receiver_for(&self, network: Address, operator: Address) -> Address {
        self.burner_router.read().await.receiver_for(network, operator)
    }

    /// Write `vault` with the current router state; the caller holds the vault write lock
    async fn persist(&self, vault: &InMemoryVault) -> ServiceResult<()> {
        let Some(path) = &self.snapshot_path else {
            return Ok(());
        };
        let snapshot = StateSnapshot::new(
            vault.clone(),
            self.burner_router.read().await.clone(),
            unix_now(),
        );
        snapshot.save(path)?;
        Ok(())
    }

    /// Health check
    pub async fn health_check(&self) -> ServiceResult<HealthStatus> {
        let now = unix_now();
        let vault = self.vault.read().await;
        Ok(HealthStatus {
            status: "healthy".to_string(),
            timestamp: now,
            epoch: vault.current_epoch(now).ok(),
            is_initialized: vault.is_initialized(),
            storage_type: self.config.storage.storage_type.clone(),
        })
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct BurnerRouterInfo {
    pub owner: Address,
    pub collateral: Address,
    pub global_receiver: Address,
    pub delay: u64,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct HealthStatus {
    pub status: String,
    pub timestamp: u64,
    /// Unset until the clock origin has passed
    pub epoch: Option<Epoch>,
    pub is_initialized: bool,
    pub storage_type: String,
}
