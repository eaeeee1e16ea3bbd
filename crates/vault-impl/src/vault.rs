//! In-memory tokenized vault
//!
//! Holds the vault configuration, the one-time module bindings, deposit
//! gating flags and the role table. Balances and slashing are not modelled.

use std::collections::HashSet;

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};
use vault_core_types::constants::{
    DEPOSITOR_WHITELIST_ROLE, DEPOSIT_LIMIT_SET_ROLE, DEPOSIT_WHITELIST_SET_ROLE,
    IS_DEPOSIT_LIMIT_SET_ROLE,
};
use vault_core_types::{
    AccessControl, Address, Binding, EpochClock, RoleId, Timestamp, TokenMetadata,
    TokenizedVault, Vault, VaultError, DEFAULT_ADMIN_ROLE,
};

use crate::role_table::InMemoryRoleTable;

/// Vault initialization parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultParams {
    pub collateral: Address,
    pub burner: Address,
    pub epoch_duration: u64,
    pub deposit_whitelist: bool,
    pub is_deposit_limit: bool,
    pub deposit_limit: u128,
    pub default_admin_role_holder: Address,
    pub deposit_whitelist_set_role_holder: Address,
    pub depositor_whitelist_role_holder: Address,
    pub is_deposit_limit_set_role_holder: Address,
    pub deposit_limit_set_role_holder: Address,
}

impl VaultParams {
    /// Parameters with every role held by `owner` and deposits unrestricted
    pub fn owned_by(owner: Address, collateral: Address, burner: Address, epoch_duration: u64) -> Self {
        Self {
            collateral,
            burner,
            epoch_duration,
            deposit_whitelist: false,
            is_deposit_limit: false,
            deposit_limit: 0,
            default_admin_role_holder: owner,
            deposit_whitelist_set_role_holder: owner,
            depositor_whitelist_role_holder: owner,
            is_deposit_limit_set_role_holder: owner,
            deposit_limit_set_role_holder: owner,
        }
    }
}

/// In-memory vault implementing the vault and access control traits
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct InMemoryVault {
    collateral: Address,
    burner: Address,
    clock: EpochClock,
    metadata: TokenMetadata,
    delegator: Binding<Address>,
    slasher: Binding<Address>,
    deposit_whitelist: bool,
    whitelisted_depositors: HashSet<Address>,
    is_deposit_limit: bool,
    deposit_limit: u128,
    roles: InMemoryRoleTable,
}

impl InMemoryVault {
    /// Create a vault whose epoch 0 starts at `initialized_at`
    pub fn new(params: VaultParams, metadata: TokenMetadata, initialized_at: Timestamp) -> Result<Self, VaultError> {
        if params.collateral.is_zero() {
            return Err(VaultError::InvalidAddress { field: "collateral" });
        }
        if !params.is_deposit_limit && params.deposit_limit != 0 {
            return Err(VaultError::invalid_params(
                "deposit limit set while deposit limit is disabled",
            ));
        }
        let clock = EpochClock::new(initialized_at, params.epoch_duration)?;

        let mut roles = InMemoryRoleTable::new();
        let holders = [
            (DEFAULT_ADMIN_ROLE, params.default_admin_role_holder),
            (RoleId::from_name(DEPOSIT_WHITELIST_SET_ROLE), params.deposit_whitelist_set_role_holder),
            (RoleId::from_name(DEPOSITOR_WHITELIST_ROLE), params.depositor_whitelist_role_holder),
            (RoleId::from_name(IS_DEPOSIT_LIMIT_SET_ROLE), params.is_deposit_limit_set_role_holder),
            (RoleId::from_name(DEPOSIT_LIMIT_SET_ROLE), params.deposit_limit_set_role_holder),
        ];
        for (role, holder) in holders {
            if !holder.is_zero() {
                roles.insert_role(role, holder);
            }
        }

        log::info!(
            "Vault {} ({}) initialized at {} with {}s epochs",
            metadata.name,
            metadata.symbol,
            initialized_at,
            params.epoch_duration
        );

        Ok(Self {
            collateral: params.collateral,
            burner: params.burner,
            clock,
            metadata,
            delegator: Binding::Unset,
            slasher: Binding::Unset,
            deposit_whitelist: params.deposit_whitelist,
            whitelisted_depositors: HashSet::new(),
            is_deposit_limit: params.is_deposit_limit,
            deposit_limit: params.deposit_limit,
            roles,
        })
    }

    pub fn roles(&self) -> &InMemoryRoleTable {
        &self.roles
    }

    //--------------------------------------------------------------------------
    // ROLE ADMINISTRATION
    //--------------------------------------------------------------------------

    pub fn grant_role(&mut self, caller: Address, role: RoleId, account: Address) -> Result<bool, VaultError> {
        Ok(self.roles.grant_role(caller, role, account)?)
    }

    pub fn revoke_role(&mut self, caller: Address, role: RoleId, account: Address) -> Result<bool, VaultError> {
        Ok(self.roles.revoke_role(caller, role, account)?)
    }

    pub fn renounce_role(&mut self, caller: Address, role: RoleId, confirmation: Address) -> Result<bool, VaultError> {
        Ok(self.roles.renounce_role(caller, role, confirmation)?)
    }

    //--------------------------------------------------------------------------
    // DEPOSIT GATING
    //--------------------------------------------------------------------------

    pub fn deposit_whitelist(&self) -> bool {
        self.deposit_whitelist
    }

    pub fn is_depositor_whitelisted(&self, account: Address) -> bool {
        self.whitelisted_depositors.contains(&account)
    }

    pub fn is_deposit_limit(&self) -> bool {
        self.is_deposit_limit
    }

    pub fn deposit_limit(&self) -> u128 {
        self.deposit_limit
    }

    pub fn set_deposit_whitelist(&mut self, caller: Address, status: bool) -> Result<(), VaultError> {
        self.check_role(RoleId::from_name(DEPOSIT_WHITELIST_SET_ROLE), caller)?;
        if self.deposit_whitelist == status {
            return Err(VaultError::AlreadySet);
        }
        self.deposit_whitelist = status;
        log::debug!("Deposit whitelist set to {}", status);
        Ok(())
    }

    pub fn set_depositor_whitelist_status(
        &mut self,
        caller: Address,
        account: Address,
        status: bool,
    ) -> Result<(), VaultError> {
        self.check_role(RoleId::from_name(DEPOSITOR_WHITELIST_ROLE), caller)?;
        if account.is_zero() {
            return Err(VaultError::InvalidAddress { field: "account" });
        }
        let changed = if status {
            self.whitelisted_depositors.insert(account)
        } else {
            self.whitelisted_depositors.remove(&account)
        };
        if !changed {
            return Err(VaultError::AlreadySet);
        }
        log::debug!("Depositor {} whitelist status set to {}", account, status);
        Ok(())
    }

    pub fn set_is_deposit_limit(&mut self, caller: Address, status: bool) -> Result<(), VaultError> {
        self.check_role(RoleId::from_name(IS_DEPOSIT_LIMIT_SET_ROLE), caller)?;
        if self.is_deposit_limit == status {
            return Err(VaultError::AlreadySet);
        }
        self.is_deposit_limit = status;
        log::debug!("Deposit limit enabled: {}", status);
        Ok(())
    }

    pub fn set_deposit_limit(&mut self, caller: Address, limit: u128) -> Result<(), VaultError> {
        self.check_role(RoleId::from_name(DEPOSIT_LIMIT_SET_ROLE), caller)?;
        if self.deposit_limit == limit {
            return Err(VaultError::AlreadySet);
        }
        self.deposit_limit = limit;
        log::debug!("Deposit limit set to {}", limit);
        Ok(())
    }
}

impl AccessControl for InMemoryVault {
    fn has_role(&self, role: RoleId, account: Address) -> bool {
        self.roles.has_role(role, account)
    }

    fn get_role_admin(&self, role: RoleId) -> RoleId {
        self.roles.get_role_admin(role)
    }
}

impl Vault for InMemoryVault {
    fn collateral(&self) -> Address {
        self.collateral
    }

    fn burner(&self) -> Address {
        self.burner
    }

    fn clock(&self) -> &EpochClock {
        &self.clock
    }

    fn delegator(&self) -> Address {
        self.delegator.get_or_default()
    }

    fn slasher(&self) -> Address {
        self.slasher.get_or_default()
    }

    fn is_delegator_initialized(&self) -> bool {
        self.delegator.is_set()
    }

    fn is_slasher_initialized(&self) -> bool {
        self.slasher.is_set()
    }

    fn set_delegator(&mut self, caller: Address, delegator: Address) -> Result<(), VaultError> {
        // The one-time guard is checked before authorization.
        if self.delegator.is_set() {
            return Err(VaultError::DelegatorAlreadyInitialized);
        }
        self.check_role(DEFAULT_ADMIN_ROLE, caller)?;
        if delegator.is_zero() {
            return Err(VaultError::InvalidAddress { field: "delegator" });
        }
        self.delegator
            .bind(delegator)
            .map_err(|_| VaultError::DelegatorAlreadyInitialized)?;
        log::debug!("Delegator bound to {}", delegator);
        Ok(())
    }

    fn set_slasher(&mut self, caller: Address, slasher: Address) -> Result<(), VaultError> {
        if self.slasher.is_set() {
            return Err(VaultError::SlasherAlreadyInitialized);
        }
        self.check_role(DEFAULT_ADMIN_ROLE, caller)?;
        // A zero slasher binds the vault to having no slasher at all.
        self.slasher
            .bind(slasher)
            .map_err(|_| VaultError::SlasherAlreadyInitialized)?;
        log::debug!("Slasher bound to {}", slasher);
        Ok(())
    }
}

impl TokenizedVault for InMemoryVault {
    fn metadata(&self) -> &TokenMetadata {
        &self.metadata
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vault_core_types::{AccessError, Epoch, EpochError, DAY, DEFAULT_EPOCH_DURATION};

    const OWNER: Address = Address::new([0x7a; 20]);
    const ALICE: Address = Address::new([0xa1; 20]);
    const SPK: Address = Address::new([0xc2; 20]);
    const ROUTER: Address = Address::new([0x8b; 20]);
    const DELEGATOR: Address = Address::new([0x2c; 20]);
    const SLASHER: Address = Address::new([0x4b; 20]);

    fn staked_spark(at: Timestamp) -> InMemoryVault {
        InMemoryVault::new(
            VaultParams::owned_by(OWNER, SPK, ROUTER, DEFAULT_EPOCH_DURATION),
            TokenMetadata {
                name: "Staked Spark".to_string(),
                symbol: "stSPK".to_string(),
                decimals: 18,
            },
            at,
        )
        .unwrap()
    }

    #[test]
    fn test_configuration_reads() {
        let vault = staked_spark(1_000);
        assert_eq!(vault.collateral(), SPK);
        assert_eq!(vault.burner(), ROUTER);
        assert_eq!(vault.epoch_duration(), 14 * DAY);
        assert_eq!(vault.name(), "Staked Spark");
        assert_eq!(vault.symbol(), "stSPK");
        assert_eq!(vault.decimals(), 18);
        assert!(vault.has_role(DEFAULT_ADMIN_ROLE, OWNER));
        assert!(vault.has_role(RoleId::from_name(DEPOSIT_LIMIT_SET_ROLE), OWNER));
        assert!(!vault.has_role(DEFAULT_ADMIN_ROLE, ALICE));
    }

    #[test]
    fn test_zero_role_holders_are_skipped() {
        let mut params = VaultParams::owned_by(OWNER, SPK, ROUTER, DAY);
        params.deposit_limit_set_role_holder = Address::ZERO;
        let vault = InMemoryVault::new(
            params,
            TokenMetadata {
                name: "v".to_string(),
                symbol: "v".to_string(),
                decimals: 18,
            },
            0,
        )
        .unwrap();
        assert!(!vault.has_role(RoleId::from_name(DEPOSIT_LIMIT_SET_ROLE), Address::ZERO));
    }

    #[test]
    fn test_rejects_invalid_params() {
        let metadata = TokenMetadata {
            name: "v".to_string(),
            symbol: "v".to_string(),
            decimals: 18,
        };
        let params = VaultParams::owned_by(OWNER, Address::ZERO, ROUTER, DAY);
        assert_eq!(
            InMemoryVault::new(params, metadata.clone(), 0),
            Err(VaultError::InvalidAddress { field: "collateral" })
        );

        let params = VaultParams::owned_by(OWNER, SPK, ROUTER, 0);
        assert_eq!(
            InMemoryVault::new(params, metadata.clone(), 0),
            Err(VaultError::Epoch(EpochError::InvalidEpochDuration))
        );

        let mut params = VaultParams::owned_by(OWNER, SPK, ROUTER, DAY);
        params.deposit_limit = 5;
        assert!(matches!(
            InMemoryVault::new(params, metadata, 0),
            Err(VaultError::InvalidParams { .. })
        ));
    }

    #[test]
    fn test_modules_bind_once() {
        let mut vault = staked_spark(0);
        assert!(!vault.is_initialized());
        assert_eq!(vault.delegator(), Address::ZERO);

        vault.set_delegator(OWNER, DELEGATOR).unwrap();
        assert!(vault.is_delegator_initialized());
        assert!(!vault.is_initialized());
        assert_eq!(vault.delegator(), DELEGATOR);

        vault.set_slasher(OWNER, SLASHER).unwrap();
        assert!(vault.is_slasher_initialized());
        assert!(vault.is_initialized());
        assert_eq!(vault.slasher(), SLASHER);

        assert_eq!(
            vault.set_delegator(OWNER, ALICE),
            Err(VaultError::DelegatorAlreadyInitialized)
        );
        assert_eq!(
            vault.set_slasher(OWNER, ALICE),
            Err(VaultError::SlasherAlreadyInitialized)
        );
        assert_eq!(vault.delegator(), DELEGATOR);
        assert_eq!(vault.slasher(), SLASHER);
    }

    #[test]
    fn test_already_initialized_regardless_of_caller() {
        let mut vault = staked_spark(0);
        vault.set_delegator(OWNER, DELEGATOR).unwrap();

        let err = vault.set_delegator(ALICE, ALICE).unwrap_err();
        assert!(err.is_already_initialized());
        assert_eq!(err, VaultError::DelegatorAlreadyInitialized);
    }

    #[test]
    fn test_binding_requires_admin() {
        let mut vault = staked_spark(0);
        assert_eq!(
            vault.set_delegator(ALICE, DELEGATOR),
            Err(VaultError::Access(AccessError::MissingRole {
                role: DEFAULT_ADMIN_ROLE,
                account: ALICE,
            }))
        );
        assert!(!vault.is_delegator_initialized());
    }

    #[test]
    fn test_zero_delegator_rejected_zero_slasher_accepted() {
        let mut vault = staked_spark(0);
        assert_eq!(
            vault.set_delegator(OWNER, Address::ZERO),
            Err(VaultError::InvalidAddress { field: "delegator" })
        );
        assert!(!vault.is_delegator_initialized());

        vault.set_slasher(OWNER, Address::ZERO).unwrap();
        assert!(vault.is_slasher_initialized());
        assert_eq!(vault.slasher(), Address::ZERO);
    }

    #[test]
    fn test_epochs_start_at_initialization() {
        let start = 1_700_000_000;
        let vault = staked_spark(start);
        let duration = DEFAULT_EPOCH_DURATION;

        assert_eq!(vault.current_epoch(start).unwrap(), Epoch(0));
        assert_eq!(vault.current_epoch_start(start).unwrap(), start);
        assert_eq!(vault.next_epoch_start(start).unwrap(), start + duration);
        assert!(vault.previous_epoch_start(start).is_err());

        let later = start + duration + 11 * DAY;
        assert_eq!(vault.current_epoch(later).unwrap(), Epoch(1));
        assert_eq!(vault.previous_epoch_start(later).unwrap(), start);
        assert_eq!(
            vault.current_epoch(start - 1),
            Err(VaultError::Epoch(EpochError::InvalidTime {
                now: start - 1,
                origin: start,
            }))
        );
    }

    #[test]
    fn test_deposit_gating_requires_roles() {
        let mut vault = staked_spark(0);
        assert!(vault.set_deposit_whitelist(ALICE, true).is_err());

        vault.set_deposit_whitelist(OWNER, true).unwrap();
        assert!(vault.deposit_whitelist());
        assert_eq!(vault.set_deposit_whitelist(OWNER, true), Err(VaultError::AlreadySet));

        vault.set_depositor_whitelist_status(OWNER, ALICE, true).unwrap();
        assert!(vault.is_depositor_whitelisted(ALICE));
        assert_eq!(
            vault.set_depositor_whitelist_status(OWNER, ALICE, true),
            Err(VaultError::AlreadySet)
        );
        vault.set_depositor_whitelist_status(OWNER, ALICE, false).unwrap();
        assert!(!vault.is_depositor_whitelisted(ALICE));

        vault.set_is_deposit_limit(OWNER, true).unwrap();
        vault.set_deposit_limit(OWNER, 10_000_000_000_000_000_000_000_000).unwrap();
        assert!(vault.is_deposit_limit());
        assert_eq!(vault.deposit_limit(), 10_000_000_000_000_000_000_000_000);
    }

    #[test]
    fn test_role_administration_through_vault() {
        let mut vault = staked_spark(0);
        let role = RoleId::from_name(DEPOSIT_WHITELIST_SET_ROLE);

        vault.grant_role(OWNER, role, ALICE).unwrap();
        vault.set_deposit_whitelist(ALICE, true).unwrap();

        vault.renounce_role(ALICE, role, ALICE).unwrap();
        assert!(vault.set_deposit_whitelist(ALICE, false).is_err());
    }
}
