//! Signer-bound contract resolution.

use std::sync::Arc;

use alloy::primitives::Address;

use crate::blockchain::{ContractConnector, TokenContract};
use crate::session::WalletProvider;
use crate::token::error::TokenError;

/// Resolves a writable handle to the token contract for the active signer.
///
/// Nothing is cached: the account may change between two calls, so each
/// resolution asks the wallet for its current signer.
pub struct ContractBinding {
    wallet: Arc<dyn WalletProvider>,
    connector: Arc<dyn ContractConnector>,
    contract: Address,
}

impl ContractBinding {
    pub fn new(
        wallet: Arc<dyn WalletProvider>,
        connector: Arc<dyn ContractConnector>,
        contract: Address,
    ) -> Self {
        Self {
            wallet,
            connector,
            contract,
        }
    }

    pub fn contract(&self) -> Address {
        self.contract
    }

    pub async fn resolve_writable_contract(&self) -> Result<Arc<dyn TokenContract>, TokenError> {
        let signer = self
            .wallet
            .signer()
            .await
            .ok_or(TokenError::NoWalletConnected)?;

        tracing::debug!(
            signer = %signer.address(),
            contract = %self.contract,
            "Binding signer to token contract"
        );

        self.connector
            .connect(signer, self.contract)
            .await
            .map_err(TokenError::transaction)
    }
}
