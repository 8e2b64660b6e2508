//! Wallet provider seam and the local private-key implementation.

use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use alloy::primitives::Address;
use async_trait::async_trait;
use tokio::sync::{broadcast, watch};
use tokio::time::{interval, MissedTickBehavior};

use crate::blockchain::{BlockchainClient, BlockchainResult, ChainId, Wallet};

/// What the wallet currently exposes: the active account and the network it
/// is attached to. Both are absent while disconnected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WalletSession {
    pub account: Option<Address>,
    pub chain_id: Option<ChainId>,
}

impl WalletSession {
    pub fn disconnected() -> Self {
        Self::default()
    }

    pub fn connected(account: Address, chain_id: ChainId) -> Self {
        Self {
            account: Some(account),
            chain_id: Some(chain_id),
        }
    }

    pub fn is_connected(&self) -> bool {
        self.account.is_some()
    }
}

/// Source of the wallet session and of signers.
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Snapshot of the current session.
    fn session(&self) -> WalletSession;

    /// Receiver notified on every account or network change.
    fn subscribe(&self) -> watch::Receiver<WalletSession>;

    /// Signer for the active account, if one is connected.
    async fn signer(&self) -> Option<Wallet>;
}

/// Wallet provider backed by a local private key.
///
/// Connection state changes are pushed to subscribers only when the session
/// actually differs from the previous one.
pub struct LocalWalletProvider {
    wallet: RwLock<Option<Wallet>>,
    session: watch::Sender<WalletSession>,
}

impl LocalWalletProvider {
    /// A provider with no wallet connected.
    pub fn new() -> Self {
        let (session, _) = watch::channel(WalletSession::disconnected());
        Self {
            wallet: RwLock::new(None),
            session,
        }
    }

    /// Load the key from `SIMP_PRIVATE_KEY` and attach it to whatever chain
    /// the RPC endpoint serves.
    ///
    /// An unset variable yields a disconnected provider. An unreachable
    /// endpoint yields a session with no network, which the gate rejects.
    pub async fn from_env(client: &BlockchainClient) -> BlockchainResult<Self> {
        let provider = Self::new();
        if let Some(wallet) = Wallet::from_env()? {
            let chain_id = match client.get_chain_id().await {
                Ok(id) => Some(id),
                Err(e) => {
                    tracing::warn!(error = %e, "Could not determine wallet network");
                    None
                }
            };
            provider.attach(Some(wallet), chain_id);
        }
        Ok(provider)
    }

    /// Connect `wallet` on `chain_id`, replacing any previous account.
    pub fn connect(&self, wallet: Wallet, chain_id: ChainId) {
        self.attach(Some(wallet), Some(chain_id));
    }

    /// Move the connected wallet to another network.
    pub fn switch_network(&self, chain_id: ChainId) {
        let current = self.session.borrow().account;
        self.publish(WalletSession {
            account: current,
            chain_id: Some(chain_id),
        });
    }

    pub fn disconnect(&self) {
        self.attach(None, None);
    }

    /// Follow the RPC endpoint's chain id until shutdown, publishing a
    /// network switch whenever it changes.
    pub async fn track_network(
        self: Arc<Self>,
        client: BlockchainClient,
        every: Duration,
        mut shutdown: broadcast::Receiver<()>,
    ) {
        let mut ticker = interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if !self.session().is_connected() {
                        continue;
                    }
                    match client.get_chain_id().await {
                        Ok(id) => self.switch_network(id),
                        Err(e) => tracing::debug!(error = %e, "Network probe failed"),
                    }
                }
                _ = shutdown.recv() => {
                    tracing::debug!("Network tracker received shutdown signal");
                    break;
                }
            }
        }
    }

    fn attach(&self, wallet: Option<Wallet>, chain_id: Option<ChainId>) {
        let account = wallet.as_ref().map(Wallet::address);
        *self.wallet.write().unwrap_or_else(PoisonError::into_inner) = wallet;
        self.publish(WalletSession { account, chain_id });
    }

    fn publish(&self, next: WalletSession) {
        let changed = self.session.send_if_modified(|current| {
            if *current == next {
                false
            } else {
                *current = next;
                true
            }
        });
        if changed {
            tracing::info!(
                account = ?next.account,
                chain_id = ?next.chain_id.map(u64::from),
                "Wallet session updated"
            );
        }
    }
}

impl Default for LocalWalletProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl WalletProvider for LocalWalletProvider {
    fn session(&self) -> WalletSession {
        *self.session.borrow()
    }

    fn subscribe(&self) -> watch::Receiver<WalletSession> {
        self.session.subscribe()
    }

    async fn signer(&self) -> Option<Wallet> {
        self.wallet
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
