use anyhow::Result;
use jsonrpsee::core::async_trait;
use jsonrpsee::proc_macros::rpc;
use jsonrpsee::server::ServerBuilder;
use jsonrpsee::types::error::{ErrorCode, ErrorObject};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

use vault_core_types::{role_by_name, Address, Epoch, EpochInfo, RoleId, Timestamp, TokenMetadata};

use crate::error::ServiceError;
use crate::service::{BurnerRouterInfo, HealthStatus, VaultService};

/// JSON-RPC API trait definition
///
/// Epoch methods take an optional Unix timestamp and default to the
/// current time.
#[rpc(server)]
pub trait VaultJsonRpcApi {
    #[method(name = "currentEpoch")]
    async fn current_epoch(&self, at: Option<Timestamp>) -> Result<Epoch, ErrorObject<'static>>;

    #[method(name = "currentEpochStart")]
    async fn current_epoch_start(&self, at: Option<Timestamp>) -> Result<Timestamp, ErrorObject<'static>>;

    #[method(name = "nextEpochStart")]
    async fn next_epoch_start(&self, at: Option<Timestamp>) -> Result<Timestamp, ErrorObject<'static>>;

    #[method(name = "previousEpochStart")]
    async fn previous_epoch_start(&self, at: Option<Timestamp>) -> Result<Timestamp, ErrorObject<'static>>;

    /// Epoch index and boundaries in one call
    #[method(name = "epochInfo")]
    async fn epoch_info(&self, at: Option<Timestamp>) -> Result<EpochInfo, ErrorObject<'static>>;

    #[method(name = "epochDuration")]
    async fn epoch_duration(&self) -> Result<u64, ErrorObject<'static>>;

    #[method(name = "vetoDuration")]
    async fn veto_duration(&self) -> Result<u64, ErrorObject<'static>>;

    #[method(name = "collateral")]
    async fn collateral(&self) -> Result<Address, ErrorObject<'static>>;

    #[method(name = "burner")]
    async fn burner(&self) -> Result<Address, ErrorObject<'static>>;

    #[method(name = "delegator")]
    async fn delegator(&self) -> Result<Address, ErrorObject<'static>>;

    #[method(name = "slasher")]
    async fn slasher(&self) -> Result<Address, ErrorObject<'static>>;

    #[method(name = "isInitialized")]
    async fn is_initialized(&self) -> Result<bool, ErrorObject<'static>>;

    #[method(name = "isDelegatorInitialized")]
    async fn is_delegator_initialized(&self) -> Result<bool, ErrorObject<'static>>;

    #[method(name = "isSlasherInitialized")]
    async fn is_slasher_initialized(&self) -> Result<bool, ErrorObject<'static>>;

    /// Bind the delegator; `caller` must hold the default admin role
    #[method(name = "setDelegator")]
    async fn set_delegator(&self, caller: String, delegator: String) -> Result<(), ErrorObject<'static>>;

    /// Bind the slasher; `caller` must hold the default admin role
    #[method(name = "setSlasher")]
    async fn set_slasher(&self, caller: String, slasher: String) -> Result<(), ErrorObject<'static>>;

    #[method(name = "tokenMetadata")]
    async fn token_metadata(&self) -> Result<TokenMetadata, ErrorObject<'static>>;

    /// `role` is a role name or a 32-byte hex identifier
    #[method(name = "hasRole")]
    async fn has_role(&self, role: String, account: String) -> Result<bool, ErrorObject<'static>>;

    #[method(name = "burnerRouter")]
    async fn burner_router(&self) -> Result<BurnerRouterInfo, ErrorObject<'static>>;

    /// Health check
    #[method(name = "health")]
    async fn health(&self) -> Result<HealthStatus, ErrorObject<'static>>;

    /// Get version
    #[method(name = "version")]
    async fn version(&self) -> Result<VersionInfo, ErrorObject<'static>>;
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct VersionInfo {
    pub version: String,
    pub commit: String,
    pub build_time: String,
}

/// JSON-RPC server implementation
#[derive(Clone)]
pub struct JsonRpcServerImpl {
    service: VaultService,
    max_connections: u32,
}

impl JsonRpcServerImpl {
    pub fn new(service: VaultService, max_connections: u32) -> Self {
        Self {
            service,
            max_connections,
        }
    }

    pub async fn start(&self, addr: SocketAddr) -> Result<impl std::future::Future<Output = ()>> {
        let server = ServerBuilder::default()
            .max_connections(self.max_connections)
            .build(addr)
            .await?;

        let handle = server.start(self.clone().into_rpc());

        Ok(async move { handle.stopped().await })
    }

    fn invalid_params(message: impl Into<String>) -> ErrorObject<'static> {
        ErrorObject::owned(ErrorCode::InvalidParams.code(), message.into(), None::<()>)
    }

    fn parse_address(address: &str) -> Result<Address, ErrorObject<'static>> {
        address
            .parse()
            .map_err(|e| Self::invalid_params(format!("Invalid address {}: {}", address, e)))
    }

    fn parse_role(role: &str) -> Result<RoleId, ErrorObject<'static>> {
        if let Some(id) = role_by_name(role) {
            return Ok(id);
        }
        role.parse()
            .map_err(|_| Self::invalid_params(format!("Unknown role: {}", role)))
    }

    fn map_service_error(err: ServiceError) -> ErrorObject<'static> {
        if err.is_caller_error() {
            Self::invalid_params(err.to_string())
        } else {
            ErrorObject::owned(ErrorCode::InternalError.code(), err.to_string(), None::<()>)
        }
    }
}

#[async_trait]
impl VaultJsonRpcApiServer for JsonRpcServerImpl {
    async fn current_epoch(&self, at: Option<Timestamp>) -> Result<Epoch, ErrorObject<'static>> {
        self.service
            .current_epoch(at)
            .await
            .map_err(Self::map_service_error)
    }

    async fn current_epoch_start(&self, at: Option<Timestamp>) -> Result<Timestamp, ErrorObject<'static>> {
        self.service
            .current_epoch_start(at)
            .await
            .map_err(Self::map_service_error)
    }

    async fn next_epoch_start(&self, at: Option<Timestamp>) -> Result<Timestamp, ErrorObject<'static>> {
        self.service
            .next_epoch_start(at)
            .await
            .map_err(Self::map_service_error)
    }

    async fn previous_epoch_start(&self, at: Option<Timestamp>) -> Result<Timestamp, ErrorObject<'static>> {
        self.service
            .previous_epoch_start(at)
            .await
            .map_err(Self::map_service_error)
    }

    async fn epoch_info(&self, at: Option<Timestamp>) -> Result<EpochInfo, ErrorObject<'static>> {
        self.service
            .epoch_info(at)
            .await
            .map_err(Self::map_service_error)
    }

    async fn epoch_duration(&self) -> Result<u64, ErrorObject<'static>> {
        Ok(self.service.epoch_duration().await)
    }

    async fn veto_duration(&self) -> Result<u64, ErrorObject<'static>> {
        Ok(self.service.veto_duration())
    }

    async fn collateral(&self) -> Result<Address, ErrorObject<'static>> {
        Ok(self.service.collateral().await)
    }

    async fn burner(&self) -> Result<Address, ErrorObject<'static>> {
        Ok(self.service.burner().await)
    }

    async fn delegator(&self) -> Result<Address, ErrorObject<'static>> {
        Ok(self.service.delegator().await)
    }

    async fn slasher(&self) -> Result<Address, ErrorObject<'static>> {
        Ok(self.service.slasher().await)
    }

    async fn is_initialized(&self) -> Result<bool, ErrorObject<'static>> {
        Ok(self.service.is_initialized().await)
    }

    async fn is_delegator_initialized(&self) -> Result<bool, ErrorObject<'static>> {
        Ok(self.service.is_delegator_initialized().await)
    }

    async fn is_slasher_initialized(&self) -> Result<bool, ErrorObject<'static>> {
        Ok(self.service.is_slasher_initialized().await)
    }

    async fn set_delegator(&self, caller: String, delegator: String) -> Result<(), ErrorObject<'static>> {
        let caller = Self::parse_address(&caller)?;
        let delegator = Self::parse_address(&delegator)?;
        self.service
            .set_delegator(caller, delegator)
            .await
            .map_err(Self::map_service_error)
    }

    async fn set_slasher(&self, caller: String, slasher: String) -> Result<(), ErrorObject<'static>> {
        let caller = Self::parse_address(&caller)?;
        let slasher = Self::parse_address(&slasher)?;
        self.service
            .set_slasher(caller, slasher)
            .await
            .map_err(Self::map_service_error)
    }

    async fn token_metadata(&self) -> Result<TokenMetadata, ErrorObject<'static>> {
        Ok(self.service.token_metadata().await)
    }

    async fn has_role(&self, role: String, account: String) -> Result<bool, ErrorObject<'static>> {
        let role = Self::parse_role(&role)?;
        let account = Self::parse_address(&account)?;
        Ok(self.service.has_role(role, account).await)
    }

    async fn burner_router(&self) -> Result<BurnerRouterInfo, ErrorObject<'static>> {
        Ok(self.service.burner_router().await)
    }

    async fn health(&self) -> Result<HealthStatus, ErrorObject<'static>> {
        self.service
            .health_check()
            .await
            .map_err(Self::map_service_error)
    }

    async fn version(&self) -> Result<VersionInfo, ErrorObject<'static>> {
        Ok(VersionInfo {
            version: env!("CARGO_PKG_VERSION").to_string(),
            commit: option_env!("GIT_COMMIT").unwrap_or("unknown").to_string(),
            build_time: env!("BUILD_TIME").to_string(),
        })
    }
}
