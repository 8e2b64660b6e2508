//! Read-only blockchain RPC client with timeout and error handling.
//!
//! # Responsibilities
//! - Connect to the JSON-RPC endpoint of the supported network
//! - Query chain state (chain id, block number, receipts)
//! - Read token balances without a signer
//! - Fail over to secondary endpoints on error or timeout

use std::future::IntoFuture;
use std::sync::Arc;
use std::time::Duration;

use alloy::network::TransactionBuilder;
use alloy::primitives::{Address, TxHash, U256};
use alloy::providers::{Provider, ProviderBuilder};
use alloy::rpc::types::{TransactionReceipt, TransactionRequest};
use async_trait::async_trait;
use tokio::time::timeout;

use crate::blockchain::contract::{balance_of_calldata, decode_balance, TokenReader};
use crate::blockchain::types::{BlockchainError, BlockchainResult, ChainId, NetworkConfig};
use crate::observability::metrics;

/// Blockchain RPC client wrapper with failover support.
#[derive(Clone)]
pub struct BlockchainClient {
    /// List of providers (primary + failovers).
    providers: Vec<Arc<dyn Provider + Send + Sync>>,
    config: NetworkConfig,
    timeout_duration: Duration,
}

impl BlockchainClient {
    /// Create a new client for the configured network.
    ///
    /// Construction only fails on an unparseable primary URL; an unreachable
    /// endpoint is reported later by the individual calls.
    pub fn new(config: NetworkConfig) -> BlockchainResult<Self> {
        let timeout_duration = Duration::from_secs(config.rpc_timeout_secs);
        let mut providers = Vec::new();

        let primary_url: url::Url = config.rpc_url.parse().map_err(|e| {
            BlockchainError::Rpc(format!("Invalid RPC URL '{}': {}", config.rpc_url, e))
        })?;
        providers.push(
            Arc::new(ProviderBuilder::new().connect_http(primary_url))
                as Arc<dyn Provider + Send + Sync>,
        );

        for url_str in &config.failover_urls {
            if let Ok(url) = url_str.parse() {
                providers.push(
                    Arc::new(ProviderBuilder::new().connect_http(url))
                        as Arc<dyn Provider + Send + Sync>,
                );
            } else {
                tracing::warn!(url = %url_str, "Ignoring invalid failover RPC URL");
            }
        }

        tracing::debug!(
            rpc_url = %config.rpc_url,
            failovers = providers.len() - 1,
            chain_id = config.chain_id,
            "Blockchain client initialized"
        );

        Ok(Self {
            providers,
            config,
            timeout_duration,
        })
    }

    /// Get the chain ID reported by the RPC endpoint.
    pub async fn get_chain_id(&self) -> BlockchainResult<ChainId> {
        for (i, provider) in self.providers.iter().enumerate() {
            match timeout(self.timeout_duration, provider.get_chain_id()).await {
                Ok(Ok(result)) => return Ok(ChainId(result)),
                Ok(Err(e)) => {
                    tracing::warn!(provider_idx = i, error = %e, "RPC error, trying next provider");
                }
                Err(_) => {
                    tracing::warn!(provider_idx = i, "RPC timeout, trying next provider");
                }
            }
        }
        Err(BlockchainError::Rpc("All RPC providers failed".to_string()))
    }

    /// Verify the endpoint serves the configured chain.
    pub async fn verify_chain_id(&self) -> BlockchainResult<()> {
        let chain_id = self.get_chain_id().await?;
        if chain_id.0 != self.config.chain_id {
            return Err(BlockchainError::ChainMismatch {
                expected: self.config.chain_id,
                actual: chain_id.0,
            });
        }
        Ok(())
    }

    /// Get the latest block number.
    pub async fn get_block_number(&self) -> BlockchainResult<u64> {
        for (i, provider) in self.providers.iter().enumerate() {
            match timeout(self.timeout_duration, provider.get_block_number()).await {
                Ok(Ok(result)) => return Ok(result),
                Ok(Err(e)) => tracing::warn!(provider_idx = i, error = %e, "RPC error"),
                Err(_) => tracing::warn!(provider_idx = i, "RPC timeout"),
            }
        }
        Err(BlockchainError::Rpc("All providers failed to get block number".to_string()))
    }

    /// Get a transaction receipt by hash.
    pub async fn get_transaction_receipt(
        &self,
        tx_hash: TxHash,
    ) -> BlockchainResult<Option<TransactionReceipt>> {
        for (i, provider) in self.providers.iter().enumerate() {
            match timeout(self.timeout_duration, provider.get_transaction_receipt(tx_hash)).await {
                Ok(Ok(result)) => return Ok(result),
                Ok(Err(e)) => tracing::warn!(provider_idx = i, error = %e, "RPC error"),
                Err(_) => tracing::warn!(provider_idx = i, "RPC timeout"),
            }
        }
        Err(BlockchainError::Rpc("All providers failed to get receipt".to_string()))
    }

    /// `eth_call` of `balanceOf(owner)` on `token`.
    ///
    /// A revert or undecodable result is returned immediately; only transport
    /// failures move on to the next provider.
    pub async fn call_balance_of(&self, token: Address, owner: Address) -> BlockchainResult<U256> {
        let request = TransactionRequest::default()
            .with_to(token)
            .with_input(balance_of_calldata(owner));

        let mut last_error = None;
        for (i, provider) in self.providers.iter().enumerate() {
            let fut = provider.call(request.clone()).into_future();
            match timeout(self.timeout_duration, fut).await {
                Ok(Ok(output)) => {
                    return decode_balance(&output)
                        .map_err(|e| BlockchainError::Decode(e.to_string()));
                }
                Ok(Err(e)) if e.is_error_resp() => {
                    return Err(BlockchainError::Reverted(e.to_string()));
                }
                Ok(Err(e)) => {
                    tracing::warn!(provider_idx = i, error = %e, "RPC error");
                    last_error = Some(e.to_string());
                }
                Err(_) => {
                    tracing::warn!(provider_idx = i, "RPC timeout");
                    last_error = Some(format!(
                        "timeout after {} seconds",
                        self.config.rpc_timeout_secs
                    ));
                }
            }
        }
        Err(BlockchainError::Rpc(format!(
            "All providers failed to read balance: {}",
            last_error.unwrap_or_default()
        )))
    }

    /// Check if the blockchain is reachable and healthy.
    pub async fn is_healthy(&self) -> bool {
        let healthy = self.get_block_number().await.is_ok();
        metrics::record_rpc_health(healthy);
        healthy
    }

    pub fn config(&self) -> &NetworkConfig {
        &self.config
    }

    /// Get the number of confirmation blocks required.
    pub fn confirmation_blocks(&self) -> u32 {
        self.config.confirmation_blocks
    }
}

#[async_trait]
impl TokenReader for BlockchainClient {
    async fn balance_of(&self, token: Address, owner: Address) -> BlockchainResult<U256> {
        self.call_balance_of(token, owner).await
    }
}

impl std::fmt::Debug for BlockchainClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlockchainClient")
            .field("rpc_url", &self.config.rpc_url)
            .field("chain_id", &self.config.chain_id)
            .field("timeout_secs", &self.config.rpc_timeout_secs)
            .finish()
    }
}
