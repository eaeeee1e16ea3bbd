//! Role Table Implementation
//!
//! Provides a set-membership implementation of the AccessControl trait.

use std::collections::{HashMap, HashSet};

use borsh::{BorshDeserialize, BorshSerialize};
use vault_core_types::{AccessControl, AccessError, Address, RoleId, DEFAULT_ADMIN_ROLE};

/// In-memory role table mapping each role to its holders
#[derive(Debug, Clone, Default, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct InMemoryRoleTable {
    members: HashMap<RoleId, HashSet<Address>>,
    admins: HashMap<RoleId, RoleId>,
}

impl InMemoryRoleTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a table where `admin` holds the default admin role
    pub fn with_admin(admin: Address) -> Self {
        let mut table = Self::new();
        table.insert_role(DEFAULT_ADMIN_ROLE, admin);
        table
    }

    /// Grant a role without an authorization check, returning whether it changed
    ///
    /// Only meant for construction time, where the holders come from
    /// trusted initialization parameters.
    pub fn insert_role(&mut self, role: RoleId, account: Address) -> bool {
        let added = self.members.entry(role).or_default().insert(account);
        if added {
            log::debug!("Role {} granted to {}", role, account);
        }
        added
    }

    fn remove_role(&mut self, role: RoleId, account: Address) -> bool {
        let removed = self
            .members
            .get_mut(&role)
            .map(|holders| holders.remove(&account))
            .unwrap_or(false);
        if removed {
            log::debug!("Role {} revoked from {}", role, account);
        }
        removed
    }

    /// Grant `role` to `account`; `caller` must hold the role's admin role
    pub fn grant_role(&mut self, caller: Address, role: RoleId, account: Address) -> Result<bool, AccessError> {
        self.check_role(self.get_role_admin(role), caller)?;
        Ok(self.insert_role(role, account))
    }

    /// Revoke `role` from `account`; `caller` must hold the role's admin role
    pub fn revoke_role(&mut self, caller: Address, role: RoleId, account: Address) -> Result<bool, AccessError> {
        self.check_role(self.get_role_admin(role), caller)?;
        Ok(self.remove_role(role, account))
    }

    /// Give up a role held by the caller
    ///
    /// `confirmation` must equal the caller, guarding against renouncing
    /// on behalf of the wrong account.
    pub fn renounce_role(&mut self, caller: Address, role: RoleId, confirmation: Address) -> Result<bool, AccessError> {
        if caller != confirmation {
            return Err(AccessError::BadConfirmation);
        }
        Ok(self.remove_role(role, caller))
    }

    /// Change the admin role of `role`; `caller` must hold the current admin role
    pub fn set_role_admin(&mut self, caller: Address, role: RoleId, admin: RoleId) -> Result<(), AccessError> {
        self.check_role(self.get_role_admin(role), caller)?;
        log::debug!("Admin of role {} set to {}", role, admin);
        if admin == DEFAULT_ADMIN_ROLE {
            self.admins.remove(&role);
        } else {
            self.admins.insert(role, admin);
        }
        Ok(())
    }

    /// Holders of a role, in no particular order
    pub fn members(&self, role: RoleId) -> Vec<Address> {
        self.members
            .get(&role)
            .map(|holders| holders.iter().copied().collect())
            .unwrap_or_default()
    }
}

impl AccessControl for InMemoryRoleTable {
    fn has_role(&self, role: RoleId, account: Address) -> bool {
        self.members
            .get(&role)
            .map(|holders| holders.contains(&account))
            .unwrap_or(false)
    }

    fn get_role_admin(&self, role: RoleId) -> RoleId {
        self.admins.get(&role).copied().unwrap_or(DEFAULT_ADMIN_ROLE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ADMIN: Address = Address::new([1; 20]);
    const ALICE: Address = Address::new([2; 20]);
    const BOB: Address = Address::new([3; 20]);

    #[test]
    fn test_admin_grants_and_revokes() {
        let mut table = InMemoryRoleTable::with_admin(ADMIN);
        let role = RoleId::from_name("DEPOSIT_LIMIT_SET_ROLE");

        assert!(table.has_role(DEFAULT_ADMIN_ROLE, ADMIN));
        assert!(!table.has_role(role, ALICE));

        assert_eq!(table.grant_role(ADMIN, role, ALICE), Ok(true));
        assert!(table.has_role(role, ALICE));

        // Granting twice is a no-op
        assert_eq!(table.grant_role(ADMIN, role, ALICE), Ok(false));

        assert_eq!(table.revoke_role(ADMIN, role, ALICE), Ok(true));
        assert!(!table.has_role(role, ALICE));
        assert_eq!(table.revoke_role(ADMIN, role, ALICE), Ok(false));
    }

    #[test]
    fn test_non_admin_cannot_grant() {
        let mut table = InMemoryRoleTable::with_admin(ADMIN);
        let role = RoleId::from_name("HOOK_SET_ROLE");

        assert_eq!(
            table.grant_role(ALICE, role, BOB),
            Err(AccessError::MissingRole {
                role: DEFAULT_ADMIN_ROLE,
                account: ALICE,
            })
        );
        assert!(!table.has_role(role, BOB));
    }

    #[test]
    fn test_renounce_requires_confirmation() {
        let mut table = InMemoryRoleTable::with_admin(ADMIN);
        assert_eq!(
            table.renounce_role(ADMIN, DEFAULT_ADMIN_ROLE, ALICE),
            Err(AccessError::BadConfirmation)
        );
        assert_eq!(table.renounce_role(ADMIN, DEFAULT_ADMIN_ROLE, ADMIN), Ok(true));
        assert!(!table.has_role(DEFAULT_ADMIN_ROLE, ADMIN));
    }

    #[test]
    fn test_custom_role_admin() {
        let mut table = InMemoryRoleTable::with_admin(ADMIN);
        let manager = RoleId::from_name("MANAGER_ROLE");
        let role = RoleId::from_name("NETWORK_LIMIT_SET_ROLE");

        table.grant_role(ADMIN, manager, ALICE).unwrap();
        table.set_role_admin(ADMIN, role, manager).unwrap();
        assert_eq!(table.get_role_admin(role), manager);

        // The default admin no longer administers the role
        assert!(table.grant_role(ADMIN, role, BOB).is_err());
        assert_eq!(table.grant_role(ALICE, role, BOB), Ok(true));
        assert_eq!(table.members(role), vec![BOB]);
    }
}
