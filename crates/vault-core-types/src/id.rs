use std::fmt;
use std::str::FromStr;

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha3::{Digest, Keccak256};

use crate::error::IdError;

/// Size of account addresses in bytes
pub const ADDRESS_SIZE: usize = 20;

/// Size of role identifiers and subnetwork identifiers in bytes
pub const ROLE_ID_SIZE: usize = 32;

/// Account address
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, BorshSerialize, BorshDeserialize)]
pub struct Address([u8; ADDRESS_SIZE]);

impl Address {
    pub const ZERO: Address = Address([0; ADDRESS_SIZE]);

    pub const fn new(bytes: [u8; ADDRESS_SIZE]) -> Self {
        Self(bytes)
    }

    pub fn bytes(&self) -> &[u8; ADDRESS_SIZE] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self)
    }
}

impl FromStr for Address {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(decode_fixed::<ADDRESS_SIZE>(s)?))
    }
}

/// Opaque role identifier
///
/// Roles are named by the keccak-256 hash of their name, so the same
/// role string always maps to the same identifier. The all-zero
/// identifier is reserved for [`DEFAULT_ADMIN_ROLE`].
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, BorshSerialize, BorshDeserialize)]
pub struct RoleId([u8; ROLE_ID_SIZE]);

/// Admin role of every role unless reassigned
pub const DEFAULT_ADMIN_ROLE: RoleId = RoleId([0; ROLE_ID_SIZE]);

impl RoleId {
    pub const fn new(bytes: [u8; ROLE_ID_SIZE]) -> Self {
        Self(bytes)
    }

    /// Derive the identifier of a named role
    pub fn from_name(name: &str) -> Self {
        let digest = Keccak256::digest(name.as_bytes());
        let mut bytes = [0u8; ROLE_ID_SIZE];
        bytes.copy_from_slice(&digest);
        Self(bytes)
    }

    pub fn bytes(&self) -> &[u8; ROLE_ID_SIZE] {
        &self.0
    }
}

impl fmt::Display for RoleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for RoleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RoleId({})", self)
    }
}

impl FromStr for RoleId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(decode_fixed::<ROLE_ID_SIZE>(s)?))
    }
}

/// Subnetwork identifier: network address followed by a 12-byte identifier
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, BorshSerialize, BorshDeserialize)]
pub struct Subnetwork([u8; ROLE_ID_SIZE]);

/// Largest identifier that fits behind the network address
pub const MAX_SUBNETWORK_IDENTIFIER: u128 = (1 << 96) - 1;

impl Subnetwork {
    /// Pack `network` and `identifier`, rejecting identifiers wider than 96 bits
    pub fn new(network: Address, identifier: u128) -> Result<Self, IdError> {
        if identifier > MAX_SUBNETWORK_IDENTIFIER {
            return Err(IdError::IdentifierOutOfRange(identifier));
        }
        let mut bytes = [0u8; ROLE_ID_SIZE];
        bytes[..ADDRESS_SIZE].copy_from_slice(network.bytes());
        let id = identifier.to_be_bytes();
        bytes[ADDRESS_SIZE..].copy_from_slice(&id[16 - (ROLE_ID_SIZE - ADDRESS_SIZE)..]);
        Ok(Self(bytes))
    }

    pub fn network(&self) -> Address {
        let mut addr = [0u8; ADDRESS_SIZE];
        addr.copy_from_slice(&self.0[..ADDRESS_SIZE]);
        Address::new(addr)
    }

    pub fn identifier(&self) -> u128 {
        let mut id = [0u8; 16];
        id[16 - (ROLE_ID_SIZE - ADDRESS_SIZE)..].copy_from_slice(&self.0[ADDRESS_SIZE..]);
        u128::from_be_bytes(id)
    }

    pub fn bytes(&self) -> &[u8; ROLE_ID_SIZE] {
        &self.0
    }
}

impl fmt::Display for Subnetwork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Subnetwork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Subnetwork({})", self)
    }
}

impl FromStr for Subnetwork {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(decode_fixed::<ROLE_ID_SIZE>(s)?))
    }
}

fn decode_fixed<const N: usize>(s: &str) -> Result<[u8; N], IdError> {
    let raw = s.strip_prefix("0x").unwrap_or(s);
    let bytes = hex::decode(raw).map_err(|e| IdError::InvalidHex(e.to_string()))?;
    if bytes.len() != N {
        return Err(IdError::InvalidLength {
            expected: N,
            actual: bytes.len(),
        });
    }
    let mut array = [0u8; N];
    array.copy_from_slice(&bytes);
    Ok(array)
}

macro_rules! hex_serde {
    ($ty:ty) => {
        impl Serialize for $ty {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(&self.to_string())
            }
        }

        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = <String as Deserialize>::deserialize(deserializer)?;
                s.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

hex_serde!(Address);
hex_serde!(RoleId);
hex_serde!(Subnetwork);
