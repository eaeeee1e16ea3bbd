//! Vault Service Library
//!
//! Serves the vault's epoch clock and collaborator state over JSON-RPC and
//! tracks epoch transitions in the background.

pub mod config;
pub mod error;
pub mod json_rpc;
pub mod server;
pub mod service;
pub mod services;

// Re-export commonly used types
pub use config::Config;
pub use error::{ServiceError, ServiceResult};
pub use server::VaultServer;
pub use service::VaultService;
pub use services::{EpochEvent, EpochService};
