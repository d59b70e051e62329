// Ledger configuration - token metadata and host limits

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Configuration for a ledger host
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Token name set at initialization
    pub name: String,
    /// Token symbol set at initialization
    pub symbol: String,
    /// Directory of the sled database
    pub data_dir: PathBuf,
    /// Most unexpired call ids held for replay protection; calls are refused beyond it
    pub max_tracked_calls: usize,
    /// How far in the future a call timestamp may be
    pub future_tolerance_secs: u64,
    /// Oldest accepted call age (0 disables expiry; needs an unbounded window)
    pub max_call_age_secs: u64,
    /// Command queue depth of the ledger service
    pub channel_capacity: usize,
}

impl LedgerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    pub fn with_symbol(mut self, symbol: &str) -> Self {
        self.symbol = symbol.to_string();
        self
    }

    pub fn with_data_dir<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.data_dir = dir.into();
        self
    }

    pub fn with_max_tracked_calls(mut self, max: usize) -> Self {
        self.max_tracked_calls = max;
        self
    }

    pub fn with_future_tolerance_secs(mut self, secs: u64) -> Self {
        self.future_tolerance_secs = secs;
        self
    }

    pub fn with_max_call_age_secs(mut self, secs: u64) -> Self {
        self.max_call_age_secs = secs;
        self
    }

    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::Invalid("name must not be empty".to_string()));
        }
        if self.symbol.trim().is_empty() {
            return Err(ConfigError::Invalid("symbol must not be empty".to_string()));
        }
        if self.max_tracked_calls == 0 {
            return Err(ConfigError::Invalid("max_tracked_calls must be > 0".to_string()));
        }
        // Without expiry an executed id can never be forgotten safely
        if self.max_call_age_secs == 0 && self.max_tracked_calls != usize::MAX {
            return Err(ConfigError::Invalid(
                "max_call_age_secs must be > 0 unless max_tracked_calls is unbounded".to_string(),
            ));
        }
        if self.channel_capacity == 0 {
            return Err(ConfigError::Invalid("channel_capacity must be > 0".to_string()));
        }
        Ok(())
    }
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            name: "WUSD".to_string(),
            symbol: "wusd".to_string(),
            data_dir: PathBuf::from("ledger-data"),
            max_tracked_calls: 100_000,
            future_tolerance_secs: 300,
            max_call_age_secs: 3_600,
            channel_capacity: 256,
        }
    }
}
