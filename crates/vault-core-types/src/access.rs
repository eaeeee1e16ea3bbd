//! Access control trait definitions
//!
//! Roles are opaque [`RoleId`]s checked by set membership. Every role has an
//! admin role whose holders may grant and revoke it.

use crate::error::AccessError;
use crate::id::{Address, RoleId, DEFAULT_ADMIN_ROLE};

/// Role based access control
pub trait AccessControl {
    /// Whether `account` holds `role`
    fn has_role(&self, role: RoleId, account: Address) -> bool;

    /// Role whose holders administer `role`
    fn get_role_admin(&self, role: RoleId) -> RoleId {
        let _ = role;
        DEFAULT_ADMIN_ROLE
    }

    /// Fail with `MissingRole` unless `account` holds `role`
    fn check_role(&self, role: RoleId, account: Address) -> Result<(), AccessError> {
        if self.has_role(role, account) {
            Ok(())
        } else {
            Err(AccessError::MissingRole { role, account })
        }
    }
}
