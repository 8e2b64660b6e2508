//! Balance resynchronization on wallet session changes.
//!
//! Subscribes to the wallet provider and re-syncs once per observed change,
//! plus once at start. There is no timer.

use std::sync::Arc;

use tokio::sync::broadcast;

use crate::notice::{Notice, Notifier};
use crate::observability::metrics;
use crate::session::provider::{WalletProvider, WalletSession};
use crate::token::{BalanceReader, ChainGate, TokenBalance, TokenError};

pub struct SessionWatcher {
    wallet: Arc<dyn WalletProvider>,
    gate: ChainGate,
    balances: Arc<BalanceReader>,
    notifier: Arc<dyn Notifier>,
    symbol: String,
}

impl SessionWatcher {
    pub fn new(
        wallet: Arc<dyn WalletProvider>,
        gate: ChainGate,
        balances: Arc<BalanceReader>,
        notifier: Arc<dyn Notifier>,
        symbol: impl Into<String>,
    ) -> Self {
        Self {
            wallet,
            gate,
            balances,
            notifier,
            symbol: symbol.into(),
        }
    }

    /// Bring the published balance in line with `session`.
    pub async fn sync(&self, session: &WalletSession) -> Result<TokenBalance, TokenError> {
        let Some(account) = session.account else {
            metrics::record_session_sync("disconnected");
            self.balances.reset(None);
            self.notifier
                .notify(Notice::info("Connect your wallet to view balance"));
            return Err(TokenError::NoWalletConnected);
        };

        if let Err(e) = self.gate.check(session) {
            metrics::record_session_sync("wrong_network");
            self.balances.reset(Some(account));
            self.notifier.notify(Notice::warning(e.to_string()));
            return Err(e);
        }

        match self.balances.refresh_or_reset(account).await {
            Ok(balance) => {
                metrics::record_session_sync("synced");
                if balance.amount.is_zero() {
                    self.notifier.notify(Notice::warning(format!(
                        "No {} tokens found in your wallet ({}). Transfer tokens to this address.",
                        self.symbol, account
                    )));
                }
                Ok(balance)
            }
            Err(e) => {
                metrics::record_session_sync("fetch_failed");
                self.notifier.notify(Notice::error(e.to_string()));
                Err(e)
            }
        }
    }

    /// Sync the current session, then every change until shutdown or until
    /// the provider goes away.
    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        let mut sessions = self.wallet.subscribe();
        let initial = *sessions.borrow_and_update();
        tracing::info!(
            account = ?initial.account,
            chain_id = ?initial.chain_id.map(u64::from),
            "Session watcher starting"
        );
        let _ = self.sync(&initial).await;

        loop {
            tokio::select! {
                changed = sessions.changed() => {
                    if changed.is_err() {
                        tracing::info!("Wallet provider closed, session watcher exiting");
                        break;
                    }
                    let session = *sessions.borrow_and_update();
                    tracing::info!(
                        account = ?session.account,
                        chain_id = ?session.chain_id.map(u64::from),
                        "Wallet session changed"
                    );
                    let _ = self.sync(&session).await;
                }
                _ = shutdown.recv() => {
                    tracing::info!("Session watcher received shutdown signal, exiting loop");
                    break;
                }
            }
        }
    }
}
