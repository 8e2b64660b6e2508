//! Signed token transactions: broadcast and confirmation monitoring.
//!
//! # Responsibilities
//! - Bind a wallet signer to the token contract
//! - Sign and broadcast token calls (nonce, gas and chain id come from
//!   the provider's default fillers)
//! - Poll for inclusion until the configured depth is reached

use std::sync::Arc;
use std::time::Duration;

use alloy::network::TransactionBuilder;
use alloy::primitives::{Address, TxHash};
use alloy::providers::{Provider, ProviderBuilder};
use alloy::rpc::types::TransactionRequest;
use async_trait::async_trait;
use tokio::time::{interval, timeout, MissedTickBehavior};

use crate::blockchain::client::BlockchainClient;
use crate::blockchain::contract::{ContractConnector, TokenCall, TokenContract};
use crate::blockchain::types::{BlockchainError, BlockchainResult, ConfirmationStatus};
use crate::blockchain::wallet::Wallet;

/// Connects wallets to the token contract over the configured RPC endpoint.
#[derive(Debug, Clone)]
pub struct RpcConnector {
    client: BlockchainClient,
}

impl RpcConnector {
    pub fn new(client: BlockchainClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ContractConnector for RpcConnector {
    async fn connect(
        &self,
        signer: Wallet,
        contract: Address,
    ) -> BlockchainResult<Arc<dyn TokenContract>> {
        let config = self.client.config();
        let url: url::Url = config.rpc_url.parse().map_err(|e| {
            BlockchainError::Rpc(format!("Invalid RPC URL '{}': {}", config.rpc_url, e))
        })?;

        let provider = ProviderBuilder::new()
            .wallet(signer.ethereum_wallet())
            .connect_http(url);

        Ok(Arc::new(SignerContract {
            provider: Arc::new(provider),
            client: self.client.clone(),
            contract,
            signer: signer.address(),
            poll_interval: Duration::from_millis(config.confirmation_poll_ms),
            timeout_secs: config.confirmation_timeout_secs,
        }))
    }
}

/// Token contract handle bound to one signer.
pub struct SignerContract {
    provider: Arc<dyn Provider + Send + Sync>,
    client: BlockchainClient,
    contract: Address,
    signer: Address,
    poll_interval: Duration,
    /// Zero waits indefinitely.
    timeout_secs: u64,
}

/// What confirmation polling needs from the chain.
#[async_trait]
trait ReceiptSource: Send + Sync {
    /// Success flag and block of the receipt, once there is one.
    async fn receipt(&self, tx_hash: TxHash) -> BlockchainResult<Option<(bool, Option<u64>)>>;

    async fn block_number(&self) -> BlockchainResult<u64>;
}

#[async_trait]
impl ReceiptSource for BlockchainClient {
    async fn receipt(&self, tx_hash: TxHash) -> BlockchainResult<Option<(bool, Option<u64>)>> {
        Ok(self
            .get_transaction_receipt(tx_hash)
            .await?
            .map(|r| (r.status(), r.block_number)))
    }

    async fn block_number(&self) -> BlockchainResult<u64> {
        self.get_block_number().await
    }
}

/// Poll until `tx_hash` is `required` blocks deep or reverted.
///
/// RPC failures are retried on the next tick; only the caller's timeout ends
/// the wait early.
async fn wait_for_confirmation<S>(
    source: &S,
    tx_hash: TxHash,
    required: u32,
    poll_interval: Duration,
) -> ConfirmationStatus
where
    S: ReceiptSource + ?Sized,
{
    let mut ticker = interval(poll_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;

        let (succeeded, receipt_block) = match source.receipt(tx_hash).await {
            Ok(Some(receipt)) => receipt,
            Ok(None) => {
                tracing::debug!(tx_hash = %tx_hash, "Transaction pending");
                continue;
            }
            Err(e) => {
                tracing::warn!(tx_hash = %tx_hash, error = %e, "Receipt poll failed, retrying");
                continue;
            }
        };

        if !succeeded {
            return ConfirmationStatus::Failed("Transaction reverted".to_string());
        }

        let current_block = match source.block_number().await {
            Ok(n) => n,
            Err(e) => {
                tracing::warn!(tx_hash = %tx_hash, error = %e, "Block number poll failed, retrying");
                continue;
            }
        };
        let tx_block = receipt_block.unwrap_or(current_block);

        match confirmation_status(tx_block, current_block, required) {
            ConfirmationStatus::Confirming { current, required } => {
                tracing::debug!(
                    tx_hash = %tx_hash,
                    confirmations = current,
                    required = required,
                    "Waiting for confirmations"
                );
            }
            status => return status,
        }
    }
}

#[async_trait]
impl TokenContract for SignerContract {
    fn signer_address(&self) -> Address {
        self.signer
    }

    async fn submit(&self, call: TokenCall) -> BlockchainResult<TxHash> {
        let tx = TransactionRequest::default()
            .with_from(self.signer)
            .with_to(self.contract)
            .with_input(call.calldata());

        let pending = self
            .provider
            .send_transaction(tx)
            .await
            .map_err(|e| BlockchainError::Rpc(e.to_string()))?;

        let tx_hash = *pending.tx_hash();
        tracing::info!(
            tx_hash = %tx_hash,
            operation = call.operation(),
            from = %self.signer,
            "Transaction accepted by network"
        );
        Ok(tx_hash)
    }

    async fn confirm(&self, tx_hash: TxHash) -> BlockchainResult<ConfirmationStatus> {
        let required = self.client.confirmation_blocks();
        let wait = wait_for_confirmation(&self.client, tx_hash, required, self.poll_interval);
        if self.timeout_secs == 0 {
            return Ok(wait.await);
        }

        let limit = Duration::from_secs(self.timeout_secs);
        match timeout(limit, wait).await {
            Ok(status) => Ok(status),
            Err(_) => Err(BlockchainError::ConfirmationTimeout {
                tx_hash: tx_hash.to_string(),
                waited_secs: self.timeout_secs,
            }),
        }
    }
}

/// Depth of a receipt mined in `tx_block`; inclusion itself counts as one.
pub fn confirmation_status(tx_block: u64, current_block: u64, required: u32) -> ConfirmationStatus {
    let depth = current_block.saturating_sub(tx_block).saturating_add(1);
    let depth = u32::try_from(depth).unwrap_or(u32::MAX);

    if depth >= required {
        ConfirmationStatus::Confirmed {
            block_number: tx_block,
        }
    } else {
        ConfirmationStatus::Confirming {
            current: depth,
            required,
        }
    }
}
