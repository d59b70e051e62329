// LedgerStore - Persistent key-value storage using sled
//
// Provides typed access for storing:
// - The host state (ledger + replay window)
// - Labelled signing keypairs
// - Host configuration

use crate::host::{CommitSink, LedgerConfig, LedgerState, Receipt};
use crate::identity::Keypair;
use crate::token::LAYOUT_VERSION;
use async_trait::async_trait;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

/// Key prefixes for organizing data
mod keys {
    pub const LEDGER_STATE: &[u8] = b"ledger:state";
    pub const LEDGER_LAYOUT: &[u8] = b"ledger:layout";
    pub const KEYPAIR_PREFIX: &[u8] = b"identity:keypair:";
    pub const CONFIG: &[u8] = b"config:ledger";
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Failed to open database: {0}")]
    OpenFailed(String),

    #[error("Database operation failed: {0}")]
    DatabaseError(String),

    #[error("Serialization failed: {0}")]
    SerializationFailed(String),

    #[error("Deserialization failed: {0}")]
    DeserializationFailed(String),

    #[error("Stored ledger layout {found} does not match supported layout {supported}")]
    IncompatibleLayout { found: u32, supported: u32 },

    #[error("Flush failed: {0}")]
    FlushFailed(String),
}

impl From<sled::Error> for StoreError {
    fn from(err: sled::Error) -> Self {
        StoreError::DatabaseError(err.to_string())
    }
}

/// Statistics about the storage
#[derive(Clone, Debug)]
pub struct StorageStats {
    /// Number of keys in the database
    pub key_count: usize,
    /// Approximate disk size in bytes
    pub disk_size_bytes: u64,
}

/// Persistent store for a ledger host
///
/// Uses sled for crash-safe, embedded storage. The state snapshot and its
/// layout version are written in one batch.
pub struct LedgerStore {
    db: sled::Db,
}

impl LedgerStore {
    /// Open or create a store at the given path
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let db = sled::open(path).map_err(|e| StoreError::OpenFailed(e.to_string()))?;
        Ok(Self { db })
    }

    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.db.is_empty())
    }

    /// Flush all pending writes to disk
    pub fn flush(&self) -> Result<(), StoreError> {
        self.db
            .flush()
            .map_err(|e| StoreError::FlushFailed(e.to_string()))?;
        Ok(())
    }

    pub fn stats(&self) -> Result<StorageStats, StoreError> {
        Ok(StorageStats {
            key_count: self.db.len(),
            disk_size_bytes: self.db.size_on_disk().unwrap_or(0),
        })
    }

    // ========================================================================
    // RAW KEY-VALUE OPERATIONS
    // ========================================================================

    pub fn put_raw(&self, key: &[u8], value: &[u8]) -> Result<(), StoreError> {
        self.db.insert(key, value)?;
        Ok(())
    }

    pub fn get_raw(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.db.get(key)?.map(|v| v.to_vec()))
    }

    pub fn delete(&self, key: &[u8]) -> Result<(), StoreError> {
        self.db.remove(key)?;
        Ok(())
    }

    /// List all keys with a given prefix
    pub fn list_keys_with_prefix(&self, prefix: &[u8]) -> Result<Vec<Vec<u8>>, StoreError> {
        let mut keys = Vec::new();
        for result in self.db.scan_prefix(prefix) {
            let (key, _) = result?;
            keys.push(key.to_vec());
        }
        Ok(keys)
    }

    // ========================================================================
    // LEDGER STATE
    // ========================================================================

    /// Save the host state together with the current layout version
    pub fn save_state(&self, state: &LedgerState) -> Result<(), StoreError> {
        let bytes = state
            .to_bytes()
            .map_err(|e| StoreError::SerializationFailed(e.to_string()))?;

        let mut batch = sled::Batch::default();
        batch.insert(keys::LEDGER_LAYOUT, &LAYOUT_VERSION.to_le_bytes()[..]);
        batch.insert(keys::LEDGER_STATE, bytes);
        self.db.apply_batch(batch)?;
        Ok(())
    }

    /// Load the host state, refusing any layout other than this build's
    pub fn load_state(&self) -> Result<Option<LedgerState>, StoreError> {
        let bytes = match self.get_raw(keys::LEDGER_STATE)? {
            Some(bytes) => bytes,
            None => return Ok(None),
        };

        let raw = self.get_raw(keys::LEDGER_LAYOUT)?.ok_or_else(|| {
            StoreError::DeserializationFailed("Ledger state stored without a layout version".to_string())
        })?;
        let layout: [u8; 4] = raw.as_slice().try_into().map_err(|_| {
            StoreError::DeserializationFailed("Invalid layout version length".to_string())
        })?;
        let found = u32::from_le_bytes(layout);

        // postcard is not self-describing: another layout cannot be decoded
        // without a migration step written for it
        if found != LAYOUT_VERSION {
            return Err(StoreError::IncompatibleLayout {
                found,
                supported: LAYOUT_VERSION,
            });
        }

        let state = LedgerState::from_bytes(&bytes)
            .map_err(|e| StoreError::DeserializationFailed(e.to_string()))?;
        if state.ledger().layout_version() != found {
            return Err(StoreError::DeserializationFailed(format!(
                "Ledger claims layout {} but was stored as layout {}",
                state.ledger().layout_version(),
                found
            )));
        }
        debug!(layout = found, executed = state.executed_count(), "ledger state loaded");
        Ok(Some(state))
    }

    // ========================================================================
    // IDENTITY PERSISTENCE
    // ========================================================================

    /// Save a keypair under a label
    pub fn save_keypair(&self, label: &str, keypair: &Keypair) -> Result<(), StoreError> {
        let key = [keys::KEYPAIR_PREFIX, label.as_bytes()].concat();
        self.put_raw(&key, &keypair.to_bytes())
    }

    /// Load a keypair by label
    pub fn load_keypair(&self, label: &str) -> Result<Option<Keypair>, StoreError> {
        let key = [keys::KEYPAIR_PREFIX, label.as_bytes()].concat();
        match self.get_raw(&key)? {
            Some(bytes) => {
                let keypair = Keypair::from_bytes(&bytes)
                    .map_err(|e| StoreError::DeserializationFailed(e.to_string()))?;
                Ok(Some(keypair))
            }
            None => Ok(None),
        }
    }

    /// Labels of all stored keypairs, sorted
    pub fn keypair_labels(&self) -> Result<Vec<String>, StoreError> {
        self.list_keys_with_prefix(keys::KEYPAIR_PREFIX)?
            .into_iter()
            .map(|key| {
                String::from_utf8(key[keys::KEYPAIR_PREFIX.len()..].to_vec())
                    .map_err(|e| StoreError::DeserializationFailed(e.to_string()))
            })
            .collect()
    }

    // ========================================================================
    // CONFIGURATION
    // ========================================================================

    pub fn save_config(&self, config: &LedgerConfig) -> Result<(), StoreError> {
        let bytes = postcard::to_allocvec(config)
            .map_err(|e| StoreError::SerializationFailed(e.to_string()))?;
        self.put_raw(keys::CONFIG, &bytes)
    }

    pub fn load_config(&self) -> Result<Option<LedgerConfig>, StoreError> {
        match self.get_raw(keys::CONFIG)? {
            Some(bytes) => postcard::from_bytes(&bytes)
                .map(Some)
                .map_err(|e| StoreError::DeserializationFailed(e.to_string())),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl CommitSink for LedgerStore {
    async fn commit(&self, state: &LedgerState, receipt: &Receipt) -> Result<(), String> {
        self.save_state(state).map_err(|e| e.to_string())?;
        self.flush().map_err(|e| e.to_string())?;
        debug!(call_id = %receipt.call_id(), "state persisted");
        Ok(())
    }
}
