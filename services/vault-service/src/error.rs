use thiserror::Error;

use vault_core_types::{BurnerError, EpochError, VaultError};
use vault_impl::SnapshotError;

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Vault error: {0}")]
    Vault(#[from] VaultError),

    #[error("Burner router error: {0}")]
    Burner(#[from] BurnerError),

    #[error("Snapshot error: {0}")]
    Snapshot(#[from] SnapshotError),

    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<EpochError> for ServiceError {
    fn from(err: EpochError) -> Self {
        Self::Vault(VaultError::Epoch(err))
    }
}

impl ServiceError {
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }

    /// Whether the error stems from the request rather than the service
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            Self::Vault(_) | Self::Burner(_) | Self::InvalidRequest { .. }
        )
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;
