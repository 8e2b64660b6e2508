//! Configuration validation.
//!
//! Serde handles syntax; this checks values. Returns every error found,
//! not just the first.

use std::fmt;

use alloy::primitives::Address;

use crate::config::schema::AppConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a parsed configuration.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let network = &config.network;

    if network.chain_id == 0 {
        errors.push(ValidationError::new("network.chain_id", "must be non-zero"));
    }
    if network.rpc_url.trim().is_empty() {
        errors.push(ValidationError::new("network.rpc_url", "must not be empty"));
    } else if let Err(e) = network.rpc_url.parse::<url::Url>() {
        errors.push(ValidationError::new("network.rpc_url", e.to_string()));
    }
    for url in &network.failover_urls {
        if url.parse::<url::Url>().is_err() {
            errors.push(ValidationError::new(
                "network.failover_urls",
                format!("invalid URL '{}'", url),
            ));
        }
    }
    if network.rpc_timeout_secs == 0 {
        errors.push(ValidationError::new("network.rpc_timeout_secs", "must be > 0"));
    }
    if network.confirmation_blocks == 0 {
        errors.push(ValidationError::new("network.confirmation_blocks", "must be > 0"));
    }
    if network.confirmation_poll_ms == 0 {
        errors.push(ValidationError::new("network.confirmation_poll_ms", "must be > 0"));
    }

    let contract = config.token.contract_address.trim();
    if contract.is_empty() {
        errors.push(ValidationError::new("token.contract_address", "must be set"));
    } else if !contract.starts_with("0x") || contract.parse::<Address>().is_err() {
        errors.push(ValidationError::new(
            "token.contract_address",
            format!("'{}' is not a 0x-prefixed 20-byte address", contract),
        ));
    }
    if config.token.symbol.trim().is_empty() {
        errors.push(ValidationError::new("token.symbol", "must not be empty"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
