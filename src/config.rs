//! Configuration module for the engine
//!
//! Handles configuration loading from TOML files and environment
//! variables, and provides structured configuration types with
//! per-field defaults.

use serde::{Deserialize, Serialize};

/// Main engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Chain interaction tuning
    pub chain: ChainConfig,

    /// Deployed contract addresses
    pub contracts: ContractsConfig,

    /// Session persistence and link generation
    pub session: SessionConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainConfig {
    /// Receipt poll interval in milliseconds
    #[serde(default = "default_receipt_poll_ms")]
    pub receipt_poll_ms: u64,

    /// Upper bound on waiting for a receipt, in seconds
    #[serde(default = "default_receipt_timeout_secs")]
    pub receipt_timeout_secs: u64,

    /// Delay between decode attempts against the same receipt, in
    /// milliseconds
    #[serde(default = "default_decode_retry_delay_ms")]
    pub decode_retry_delay_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContractsConfig {
    /// Event registry contract address
    pub registry_address: String,

    /// Fungible token ledger contract address
    pub token_address: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Path of the sled session store
    #[serde(default = "default_store_path")]
    pub store_path: String,

    /// Origin used when building shareable event links
    #[serde(default = "default_origin")]
    pub origin: String,
}

// Default value functions
fn default_receipt_poll_ms() -> u64 {
    1_000
}
fn default_receipt_timeout_secs() -> u64 {
    120
}
fn default_decode_retry_delay_ms() -> u64 {
    2_000
}
fn default_store_path() -> String {
    "session.db".to_string()
}
fn default_origin() -> String {
    "http://localhost:3000".to_string()
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load configuration with environment variable bootstrap
    pub fn from_file_with_env(path: &str) -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_file(path)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            chain: ChainConfig {
                receipt_poll_ms: default_receipt_poll_ms(),
                receipt_timeout_secs: default_receipt_timeout_secs(),
                decode_retry_delay_ms: default_decode_retry_delay_ms(),
            },
            contracts: ContractsConfig {
                registry_address: "0x0000000000000000000000000000000000000000".to_string(),
                token_address: "0x0000000000000000000000000000000000000000".to_string(),
            },
            session: SessionConfig {
                store_path: default_store_path(),
                origin: default_origin(),
            },
        }
    }
}
