//! Engine configuration.

use cardledger_core::{LedgerError, Result};

/// Default `RocksDB` data directory.
pub const DEFAULT_DATA_DIR: &str = "/data/cardledger";

/// Currency assigned to transfers that don't specify one.
pub const DEFAULT_CURRENCY: &str = "BYN";

/// Configuration loaded once at process startup.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Path to the `RocksDB` data directory.
    pub data_dir: String,

    /// Base64-encoded AES key for PAN encryption at rest. Required; its
    /// shape is validated when the cipher is constructed.
    pub encryption_key: String,

    /// Currency code used when a transfer omits one.
    pub default_currency: String,
}

impl EngineConfig {
    /// Load configuration from environment variables.
    ///
    /// - `CARDLEDGER_DATA_DIR` (default: `/data/cardledger`)
    /// - `CARDLEDGER_ENCRYPTION_KEY` (required)
    /// - `CARDLEDGER_DEFAULT_CURRENCY` (default: `BYN`)
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Configuration`] if the encryption key is not
    /// set. A missing or malformed key is a fatal startup error, never a
    /// per-request condition.
    pub fn from_env() -> Result<Self> {
        let encryption_key = std::env::var("CARDLEDGER_ENCRYPTION_KEY").map_err(|_| {
            LedgerError::Configuration("CARDLEDGER_ENCRYPTION_KEY is not set".to_string())
        })?;

        Ok(Self {
            data_dir: std::env::var("CARDLEDGER_DATA_DIR")
                .unwrap_or_else(|_| DEFAULT_DATA_DIR.to_string()),
            encryption_key,
            default_currency: std::env::var("CARDLEDGER_DEFAULT_CURRENCY")
                .unwrap_or_else(|_| DEFAULT_CURRENCY.to_string()),
        })
    }

    /// Build a configuration directly, using the default currency.
    #[must_use]
    pub fn new(data_dir: impl Into<String>, encryption_key: impl Into<String>) -> Self {
        Self {
            data_dir: data_dir.into(),
            encryption_key: encryption_key.into(),
            default_currency: DEFAULT_CURRENCY.to_string(),
        }
    }
}
