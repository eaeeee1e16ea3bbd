pub mod access;
pub mod binding;
pub mod burner;
pub mod constants;
pub mod epoch;
pub mod error;
pub mod id;
pub mod vault;

// Re-export the main types for convenience
pub use constants::{
    DAY,
    WEEK,
    DEFAULT_EPOCH_DURATION,
    DEFAULT_BURNER_DELAY,
    DEFAULT_VETO_DURATION,
    role_by_name,
};
pub use id::{
    Address,
    RoleId,
    Subnetwork,
    DEFAULT_ADMIN_ROLE,
    MAX_SUBNETWORK_IDENTIFIER,
};

// Re-export epoch types
pub use epoch::{
    Epoch,
    EpochClock,
    EpochInfo,
    Timestamp,
};

pub use binding::{AlreadyBound, Binding};

// Re-export error types
pub use error::{
    AccessError,
    BurnerError,
    EpochError,
    IdError,
    VaultError,
};

// Re-export collaborator traits
pub use access::AccessControl;
pub use burner::BurnerRouter;
pub use vault::{TokenMetadata, TokenizedVault, Vault};
