use crate::id::RoleId;

pub const MINUTE: u64 = 60;
pub const HOUR: u64 = 60 * MINUTE;
pub const DAY: u64 = 24 * HOUR;
pub const WEEK: u64 = 7 * DAY;

/// Deployed vault epoch duration
pub const DEFAULT_EPOCH_DURATION: u64 = 2 * WEEK;
/// Deployed burner router delay
pub const DEFAULT_BURNER_DELAY: u64 = 31 * DAY;
/// Deployed veto slasher veto window
pub const DEFAULT_VETO_DURATION: u64 = 3 * DAY;

// Vault roles
pub const DEPOSIT_WHITELIST_SET_ROLE: &str = "DEPOSIT_WHITELIST_SET_ROLE";
pub const DEPOSITOR_WHITELIST_ROLE: &str = "DEPOSITOR_WHITELIST_ROLE";
pub const IS_DEPOSIT_LIMIT_SET_ROLE: &str = "IS_DEPOSIT_LIMIT_SET_ROLE";
pub const DEPOSIT_LIMIT_SET_ROLE: &str = "DEPOSIT_LIMIT_SET_ROLE";

// Delegator roles
pub const NETWORK_LIMIT_SET_ROLE: &str = "NETWORK_LIMIT_SET_ROLE";
pub const OPERATOR_NETWORK_SHARES_SET_ROLE: &str = "OPERATOR_NETWORK_SHARES_SET_ROLE";
pub const HOOK_SET_ROLE: &str = "HOOK_SET_ROLE";

/// Every named role known to the vault and its delegator
pub const NAMED_ROLES: [&str; 7] = [
    DEPOSIT_WHITELIST_SET_ROLE,
    DEPOSITOR_WHITELIST_ROLE,
    IS_DEPOSIT_LIMIT_SET_ROLE,
    DEPOSIT_LIMIT_SET_ROLE,
    NETWORK_LIMIT_SET_ROLE,
    OPERATOR_NETWORK_SHARES_SET_ROLE,
    HOOK_SET_ROLE,
];

/// Look up a named role's identifier, accepting only known names
pub fn role_by_name(name: &str) -> Option<RoleId> {
    if name == "DEFAULT_ADMIN_ROLE" {
        return Some(crate::id::DEFAULT_ADMIN_ROLE);
    }
    NAMED_ROLES
        .iter()
        .find(|known| **known == name)
        .map(|known| RoleId::from_name(known))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::DEFAULT_ADMIN_ROLE;

    #[test]
    fn test_deployed_durations() {
        assert_eq!(DEFAULT_EPOCH_DURATION, 1_209_600);
        assert_eq!(DEFAULT_BURNER_DELAY, 2_678_400);
        assert_eq!(DEFAULT_VETO_DURATION, 259_200);
    }

    #[test]
    fn test_named_roles_are_unique() {
        for i in 0..NAMED_ROLES.len() {
            for j in (i + 1)..NAMED_ROLES.len() {
                assert_ne!(
                    RoleId::from_name(NAMED_ROLES[i]),
                    RoleId::from_name(NAMED_ROLES[j]),
                    "Role identifiers must be unique"
                );
            }
            assert_ne!(RoleId::from_name(NAMED_ROLES[i]), DEFAULT_ADMIN_ROLE);
        }
    }

    #[test]
    fn test_role_by_name() {
        assert_eq!(role_by_name("DEFAULT_ADMIN_ROLE"), Some(DEFAULT_ADMIN_ROLE));
        assert_eq!(
            role_by_name(HOOK_SET_ROLE),
            Some(RoleId::from_name("HOOK_SET_ROLE"))
        );
        assert_eq!(role_by_name("NOT_A_ROLE"), None);
    }
}
