//! Background services that run alongside the JSON-RPC endpoint

pub mod epoch_service;

// Re-export service types
pub use epoch_service::{EpochConfig, EpochEvent, EpochService, EpochStats};
