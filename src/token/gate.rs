//! Supported-network gate.

use crate::blockchain::ChainId;
use crate::config::NetworkConfig;
use crate::session::WalletSession;
use crate::token::error::TokenError;

/// Admits only sessions attached to the one configured network.
#[derive(Debug, Clone)]
pub struct ChainGate {
    supported: ChainId,
    network_name: String,
}

impl ChainGate {
    pub fn new(config: &NetworkConfig) -> Self {
        Self {
            supported: ChainId(config.chain_id),
            network_name: config.name.clone(),
        }
    }

    pub fn supported(&self) -> ChainId {
        self.supported
    }

    pub fn network_name(&self) -> &str {
        &self.network_name
    }

    pub fn is_supported_network(&self, session: &WalletSession) -> bool {
        session.chain_id == Some(self.supported)
    }

    /// `Ok` when contract calls may proceed for `session`.
    pub fn check(&self, session: &WalletSession) -> Result<(), TokenError> {
        if self.is_supported_network(session) {
            return Ok(());
        }
        tracing::debug!(
            expected = self.supported.0,
            actual = ?session.chain_id.map(u64::from),
            "Session rejected by chain gate"
        );
        Err(TokenError::NetworkMismatch {
            network: self.network_name.clone(),
            expected: self.supported,
            actual: session.chain_id,
        })
    }
}
