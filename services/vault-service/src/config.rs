use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use vault_core_types::{
    Address, TokenMetadata, DEFAULT_BURNER_DELAY, DEFAULT_EPOCH_DURATION, DEFAULT_VETO_DURATION,
};
use vault_impl::{BurnerRouterParams, NetworkReceiver, OperatorNetworkReceiver, VaultParams};

// Local development accounts used by the default configuration
const DEV_OWNER: Address = Address::new([0x5a; 20]);
const DEV_GOVERNANCE: Address = Address::new([0x60; 20]);
const DEV_COLLATERAL: Address = Address::new([0xc2; 20]);
const DEV_BURNER_ROUTER: Address = Address::new([0xb7; 20]);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub clock: ClockConfig,
    pub vault: VaultConfig,
    pub burner: BurnerConfig,
    pub storage: StorageConfig,
    pub server: ServerConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClockConfig {
    /// Epoch 0 start; the first start time when unset
    pub origin_timestamp: Option<u64>,
    /// Epoch ticker period in milliseconds
    pub tick_interval_ms: u64,
    /// Whether the ticker runs on its own
    pub auto_advance: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VaultConfig {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
    pub collateral: Address,
    /// Epoch duration in seconds
    pub epoch_duration: u64,
    /// Veto window of the bound slasher in seconds
    pub veto_duration: u64,
    pub deposit_whitelist: bool,
    pub is_deposit_limit: bool,
    /// Decimal string; TOML integers stop at i64
    pub deposit_limit: String,
    /// Holder of the admin and deposit configuration roles
    pub owner: Address,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BurnerConfig {
    /// Address the vault routes slashed collateral to
    pub address: Address,
    pub owner: Address,
    /// Receiver change delay in seconds
    pub delay: u64,
    pub global_receiver: Address,
    #[serde(default)]
    pub network_receivers: Vec<NetworkReceiver>,
    #[serde(default)]
    pub operator_network_receivers: Vec<OperatorNetworkReceiver>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Storage type: "memory" or "file"
    pub storage_type: String,
    /// Data directory for file-based storage
    pub data_dir: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Maximum concurrent connections
    pub max_connections: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            clock: ClockConfig {
                origin_timestamp: None,
                tick_interval_ms: 1000,
                auto_advance: true,
            },
            vault: VaultConfig {
                name: "Staked Spark".to_string(),
                symbol: "stSPK".to_string(),
                decimals: 18,
                collateral: DEV_COLLATERAL,
                epoch_duration: DEFAULT_EPOCH_DURATION,
                veto_duration: DEFAULT_VETO_DURATION,
                deposit_whitelist: false,
                is_deposit_limit: false,
                deposit_limit: "0".to_string(),
                owner: DEV_OWNER,
            },
            burner: BurnerConfig {
                address: DEV_BURNER_ROUTER,
                owner: DEV_OWNER,
                delay: DEFAULT_BURNER_DELAY,
                global_receiver: DEV_GOVERNANCE,
                network_receivers: Vec::new(),
                operator_network_receivers: Vec::new(),
            },
            storage: StorageConfig {
                storage_type: "memory".to_string(),
                data_dir: None,
            },
            server: ServerConfig {
                max_connections: 1000,
            },
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Config = toml::from_str(&content)?;
            Ok(config)
        } else {
            // Create default config file
            let config = Config::default();
            let content = toml::to_string_pretty(&config)?;
            std::fs::write(path, content)?;
            Ok(config)
        }
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

impl VaultConfig {
    pub fn params(&self, burner: Address) -> Result<VaultParams> {
        anyhow::ensure!(
            self.veto_duration < self.epoch_duration,
            "Veto duration {} must be shorter than the epoch duration {}",
            self.veto_duration,
            self.epoch_duration
        );

        let deposit_limit = self
            .deposit_limit
            .trim()
            .parse::<u128>()
            .with_context(|| format!("Invalid deposit limit: {}", self.deposit_limit))?;

        let mut params = VaultParams::owned_by(self.owner, self.collateral, burner, self.epoch_duration);
        params.deposit_whitelist = self.deposit_whitelist;
        params.is_deposit_limit = self.is_deposit_limit;
        params.deposit_limit = deposit_limit;
        Ok(params)
    }

    pub fn metadata(&self) -> TokenMetadata {
        TokenMetadata {
            name: self.name.clone(),
            symbol: self.symbol.clone(),
            decimals: self.decimals,
        }
    }
}

impl BurnerConfig {
    pub fn params(&self, collateral: Address) -> BurnerRouterParams {
        BurnerRouterParams {
            owner: self.owner,
            collateral,
            delay: self.delay,
            global_receiver: self.global_receiver,
            network_receivers: self.network_receivers.clone(),
            operator_network_receivers: self.operator_network_receivers.clone(),
        }
    }
}
