//! Vault trait definitions
//!
//! The vault binds a delegator and a slasher exactly once and answers epoch
//! queries against its own clock.

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};

use crate::access::AccessControl;
use crate::epoch::{Epoch, EpochClock, EpochInfo, Timestamp};
use crate::error::VaultError;
use crate::id::Address;

/// ERC20 metadata of a tokenized vault
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct TokenMetadata {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
}

/// Read surface and one-time setters of a staking vault
pub trait Vault: AccessControl {
    //--------------------------------------------------------------------------
    // CONFIGURATION
    //--------------------------------------------------------------------------

    /// Collateral token accepted by the vault
    fn collateral(&self) -> Address;

    /// Contract receiving slashed collateral
    fn burner(&self) -> Address;

    /// Clock the vault measures epochs with
    fn clock(&self) -> &EpochClock;

    fn epoch_duration(&self) -> u64 {
        self.clock().epoch_duration()
    }

    //--------------------------------------------------------------------------
    // MODULE BINDING
    //--------------------------------------------------------------------------

    /// Bound delegator, zero while unset
    fn delegator(&self) -> Address;

    /// Bound slasher, zero while unset or bound to no slasher
    fn slasher(&self) -> Address;

    fn is_delegator_initialized(&self) -> bool;

    fn is_slasher_initialized(&self) -> bool;

    /// A vault is initialized once both modules are bound
    fn is_initialized(&self) -> bool {
        self.is_delegator_initialized() && self.is_slasher_initialized()
    }

    /// Bind the delegator; fails with `DelegatorAlreadyInitialized` on a second call
    fn set_delegator(&mut self, caller: Address, delegator: Address) -> Result<(), VaultError>;

    /// Bind the slasher; fails with `SlasherAlreadyInitialized` on a second call
    fn set_slasher(&mut self, caller: Address, slasher: Address) -> Result<(), VaultError>;

    //--------------------------------------------------------------------------
    // EPOCHS
    //--------------------------------------------------------------------------

    fn current_epoch(&self, now: Timestamp) -> Result<Epoch, VaultError> {
        Ok(self.clock().current_epoch(now)?)
    }

    fn current_epoch_start(&self, now: Timestamp) -> Result<Timestamp, VaultError> {
        Ok(self.clock().current_epoch_start(now)?)
    }

    fn next_epoch_start(&self, now: Timestamp) -> Result<Timestamp, VaultError> {
        Ok(self.clock().next_epoch_start(now)?)
    }

    fn previous_epoch_start(&self, now: Timestamp) -> Result<Timestamp, VaultError> {
        Ok(self.clock().previous_epoch_start(now)?)
    }

    fn epoch_at(&self, now: Timestamp) -> Result<EpochInfo, VaultError> {
        Ok(self.clock().epoch_at(now)?)
    }
}

/// A vault that also behaves as an ERC20 share token
pub trait TokenizedVault: Vault {
    fn metadata(&self) -> &TokenMetadata;

    fn name(&self) -> &str {
        &self.metadata().name
    }

    fn symbol(&self) -> &str {
        &self.metadata().symbol
    }

    fn decimals(&self) -> u8 {
        self.metadata().decimals
    }
}
