use thiserror::Error;

use crate::epoch::Timestamp;
use crate::id::{Address, RoleId};

/// Errors raised while parsing identifiers
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IdError {
    #[error("Invalid hex: {0}")]
    InvalidHex(String),

    #[error("Invalid length: expected {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("Subnetwork identifier {0} exceeds 96 bits")]
    IdentifierOutOfRange(u128),
}

/// Errors raised by epoch computations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EpochError {
    #[error("Invalid time: {now} precedes origin {origin}")]
    InvalidTime { now: Timestamp, origin: Timestamp },

    #[error("No previous epoch: current epoch is 0")]
    NoPreviousEpoch,

    #[error("Epoch duration must be positive")]
    InvalidEpochDuration,

    #[error("Epoch arithmetic overflow")]
    Overflow,
}

/// Errors raised by role checks and role administration
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AccessError {
    #[error("Account {account} is missing role {role}")]
    MissingRole { role: RoleId, account: Address },

    #[error("Accounts can only renounce roles for themselves")]
    BadConfirmation,
}

/// Errors raised by the vault collaborator
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VaultError {
    #[error("Delegator already initialized")]
    DelegatorAlreadyInitialized,

    #[error("Slasher already initialized")]
    SlasherAlreadyInitialized,

    #[error("Invalid address for {field}")]
    InvalidAddress { field: &'static str },

    #[error("Vault parameter invalid: {message}")]
    InvalidParams { message: String },

    #[error("Value already set")]
    AlreadySet,

    #[error("Epoch error: {0}")]
    Epoch(#[from] EpochError),

    #[error("Access error: {0}")]
    Access(#[from] AccessError),
}

impl VaultError {
    pub fn invalid_params(message: impl Into<String>) -> Self {
        Self::InvalidParams {
            message: message.into(),
        }
    }

    /// Whether this is a one-time initialization guard failure
    pub fn is_already_initialized(&self) -> bool {
        matches!(
            self,
            VaultError::DelegatorAlreadyInitialized | VaultError::SlasherAlreadyInitialized
        )
    }
}

/// Errors raised by the burner router collaborator
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BurnerError {
    #[error("Caller {caller} is not the owner")]
    NotOwner { caller: Address },

    #[error("Invalid receiver")]
    InvalidReceiver,

    #[error("No pending change")]
    NoPendingChange,

    #[error("Pending change not ready until {ready_at}")]
    NotReady { ready_at: Timestamp },

    #[error("Value already set")]
    AlreadySet,

    #[error("Burner arithmetic overflow")]
    Overflow,
}
