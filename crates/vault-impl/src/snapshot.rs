//! State Snapshot Implementation
//!
//! Persists the vault and burner router state to a single file so a service
//! restart resumes with the same bindings and epoch origin.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use borsh::{BorshDeserialize, BorshSerialize};
use thiserror::Error;

use crate::burner_router::InMemoryBurnerRouter;
use crate::vault::InMemoryVault;

const SNAPSHOT_MAGIC: &[u8; 4] = b"VSNP";
const SNAPSHOT_VERSION: u8 = 1;
/// Magic, version byte and payload length
const SNAPSHOT_HEADER_LEN: u64 = 4 + 1 + 8;

/// Errors raised while reading or writing a snapshot
#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("Snapshot I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Snapshot encoding error: {0}")]
    Encoding(String),

    #[error("Unsupported snapshot version {0}")]
    UnsupportedVersion(u8),
}

/// Everything the service needs to resume
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct StateSnapshot {
    pub vault: InMemoryVault,
    pub burner_router: InMemoryBurnerRouter,
    /// Unix time the snapshot was taken
    pub taken_at: u64,
}

impl StateSnapshot {
    pub fn new(vault: InMemoryVault, burner_router: InMemoryBurnerRouter, taken_at: u64) -> Self {
        Self {
            vault,
            burner_router,
            taken_at,
        }
    }

    /// Write the snapshot atomically: encode into a sibling temp file, then rename
    pub fn save(&self, path: &Path) -> Result<(), SnapshotError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let encoded = borsh::to_vec(self).map_err(|e| SnapshotError::Encoding(e.to_string()))?;

        let tmp_path = temp_path(path);
        {
            let mut writer = BufWriter::new(File::create(&tmp_path)?);
            writer.write_all(SNAPSHOT_MAGIC)?;
            writer.write_all(&[SNAPSHOT_VERSION])?;
            writer.write_all(&(encoded.len() as u64).to_le_bytes())?;
            writer.write_all(&encoded)?;
            writer.flush()?;
        }
        fs::rename(&tmp_path, path)?;

        log::debug!("Saved {} byte snapshot to {}", encoded.len(), path.display());
        Ok(())
    }

    /// Load a snapshot, returning `None` when the file does not exist
    pub fn load(path: &Path) -> Result<Option<Self>, SnapshotError> {
        if !path.exists() {
            return Ok(None);
        }

        let file = File::open(path)?;
        let file_len = file.metadata()?.len();
        let mut reader = BufReader::new(file);

        let mut magic = [0u8; 4];
        reader.read_exact(&mut magic)?;
        if &magic != SNAPSHOT_MAGIC {
            return Err(SnapshotError::Encoding("bad snapshot header".to_string()));
        }

        let mut version = [0u8; 1];
        reader.read_exact(&mut version)?;
        if version[0] != SNAPSHOT_VERSION {
            return Err(SnapshotError::UnsupportedVersion(version[0]));
        }

        let mut len_buf = [0u8; 8];
        reader.read_exact(&mut len_buf)?;
        let len = u64::from_le_bytes(len_buf);
        let available = file_len.saturating_sub(SNAPSHOT_HEADER_LEN);
        if len != available {
            return Err(SnapshotError::Encoding(format!(
                "payload length {} does not match {} bytes on disk",
                len, available
            )));
        }

        let mut data = vec![0u8; len as usize];
        reader.read_exact(&mut data)?;

        let snapshot = borsh::from_slice(&data).map_err(|e| SnapshotError::Encoding(e.to_string()))?;
        log::debug!("Loaded snapshot from {}", path.display());
        Ok(Some(snapshot))
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::burner_router::BurnerRouterParams;
    use crate::vault::VaultParams;
    use tempfile::tempdir;
    use vault_core_types::{Address, TokenMetadata, Vault, DEFAULT_BURNER_DELAY, DEFAULT_EPOCH_DURATION};

    const OWNER: Address = Address::new([0x11; 20]);
    const SPK: Address = Address::new([0xc2; 20]);
    const ROUTER: Address = Address::new([0x4b; 20]);
    const DELEGATOR: Address = Address::new([0xde; 20]);

    fn snapshot() -> StateSnapshot {
        let mut vault = InMemoryVault::new(
            VaultParams::owned_by(OWNER, SPK, ROUTER, DEFAULT_EPOCH_DURATION),
            TokenMetadata {
                name: "Staked Spark".to_string(),
                symbol: "stSPK".to_string(),
                decimals: 18,
            },
            1_700_000_000,
        )
        .unwrap();
        vault.set_delegator(OWNER, DELEGATOR).unwrap();

        let router = InMemoryBurnerRouter::new(BurnerRouterParams {
            owner: OWNER,
            collateral: SPK,
            delay: DEFAULT_BURNER_DELAY,
            global_receiver: OWNER,
            network_receivers: vec![],
            operator_network_receivers: vec![],
        })
        .unwrap();

        StateSnapshot::new(vault, router, 1_700_000_100)
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("state").join("vault.snapshot");

        let original = snapshot();
        original.save(&path).unwrap();
        assert!(!temp_path(&path).exists());

        let loaded = StateSnapshot::load(&path).unwrap().unwrap();
        assert_eq!(loaded, original);
        assert_eq!(loaded.vault.delegator(), DELEGATOR);
        assert!(!loaded.vault.is_slasher_initialized());
    }

    #[test]
    fn test_missing_file_loads_none() {
        let dir = tempdir().unwrap();
        assert!(StateSnapshot::load(&dir.path().join("absent")).unwrap().is_none());
    }

    #[test]
    fn test_rejects_foreign_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("vault.snapshot");
        fs::write(&path, b"not a snapshot at all").unwrap();
        assert!(matches!(StateSnapshot::load(&path), Err(SnapshotError::Encoding(_))));
    }

    #[test]
    fn test_rejects_oversized_length_prefix() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("vault.snapshot");

        let mut forged = SNAPSHOT_MAGIC.to_vec();
        forged.push(SNAPSHOT_VERSION);
        forged.extend_from_slice(&(1u64 << 62).to_le_bytes());
        forged.extend_from_slice(&[0u8; 16]);
        fs::write(&path, forged).unwrap();

        assert!(matches!(StateSnapshot::load(&path), Err(SnapshotError::Encoding(_))));
    }

    #[test]
    fn test_rejects_truncated_payload() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("vault.snapshot");
        snapshot().save(&path).unwrap();

        let bytes = fs::read(&path).unwrap();
        fs::write(&path, &bytes[..bytes.len() - 1]).unwrap();

        assert!(matches!(StateSnapshot::load(&path), Err(SnapshotError::Encoding(_))));
    }
}
