//! In-memory implementations of the vault collaborators
//!
//! - [`InMemoryVault`]: vault configuration, module bindings and epoch reads
//! - [`InMemoryRoleTable`]: role-based access control
//! - [`InMemoryBurnerRouter`]: slashed-collateral receiver routing
//! - [`StateSnapshot`]: file persistence for the above

pub mod burner_router;
pub mod role_table;
pub mod snapshot;
pub mod vault;

// Re-export the main types for convenience
pub use burner_router::{
    BurnerRouterParams,
    InMemoryBurnerRouter,
    NetworkReceiver,
    OperatorNetworkReceiver,
    Pending,
};
pub use role_table::InMemoryRoleTable;
pub use snapshot::{SnapshotError, StateSnapshot};
pub use vault::{InMemoryVault, VaultParams};
