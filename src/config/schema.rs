//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files.
//! Every section has defaults so a minimal file only needs the contract
//! address.

use serde::{Deserialize, Serialize};

/// Root configuration for the token console.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// The one supported network.
    pub network: NetworkConfig,

    /// Token contract settings.
    pub token: TokenConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Supported network configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Human-readable network name used in notices.
    pub name: String,

    /// Chain ID every session must be attached to (11155111 for Sepolia).
    pub chain_id: u64,

    /// JSON-RPC endpoint URL.
    pub rpc_url: String,

    /// Failover JSON-RPC endpoint URLs.
    pub failover_urls: Vec<String>,

    /// RPC request timeout in seconds.
    pub rpc_timeout_secs: u64,

    /// Number of blocks (inclusion counts as one) before a transaction is final.
    pub confirmation_blocks: u32,

    /// Receipt polling interval in milliseconds.
    pub confirmation_poll_ms: u64,

    /// Maximum confirmation wait in seconds; 0 waits indefinitely.
    pub confirmation_timeout_secs: u64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            name: "Sepolia testnet".to_string(),
            chain_id: 11155111,
            rpc_url: "https://ethereum-sepolia-rpc.publicnode.com".to_string(),
            failover_urls: Vec::new(),
            rpc_timeout_secs: 10,
            confirmation_blocks: 1,
            confirmation_poll_ms: 2000,
            confirmation_timeout_secs: 0,
        }
    }
}

/// Token contract configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TokenConfig {
    /// Address of the token contract (0x-prefixed hex).
    pub contract_address: String,

    /// Ticker shown in notices.
    pub symbol: String,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            contract_address: String::new(),
            symbol: "SIMP".to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable the Prometheus endpoint while watching.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
