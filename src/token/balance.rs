//! Balance reads and the published balance.
//!
//! # Ordering
//! Reads may overlap (a session change and a post-transaction refresh).
//! Each read takes a sequence number before it starts, and a result is
//! only published if no later-started read has been published already.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use alloy::primitives::Address;
use tokio::sync::watch;

use crate::blockchain::TokenReader;
use crate::observability::metrics;
use crate::token::amount::TokenAmount;
use crate::token::error::TokenError;

/// Balance of one account on the supported network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TokenBalance {
    /// `None` after a reset with no connected account.
    pub owner: Option<Address>,
    pub amount: TokenAmount,
}

impl TokenBalance {
    pub fn zero(owner: Option<Address>) -> Self {
        Self {
            owner,
            amount: TokenAmount::ZERO,
        }
    }

    /// Human-readable decimal form, e.g. `69.5`.
    pub fn display(&self) -> String {
        self.amount.to_string()
    }
}

/// The balance currently shown to the user, tagged with the sequence number
/// of the read that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PublishedBalance {
    pub seq: u64,
    pub balance: TokenBalance,
}

/// Reads balances through a non-signing client and owns the published value.
pub struct BalanceReader {
    reader: Arc<dyn TokenReader>,
    token: Address,
    next_seq: AtomicU64,
    published: watch::Sender<PublishedBalance>,
}

impl BalanceReader {
    pub fn new(reader: Arc<dyn TokenReader>, token: Address) -> Self {
        let (published, _) = watch::channel(PublishedBalance::default());
        Self {
            reader,
            token,
            next_seq: AtomicU64::new(1),
            published,
        }
    }

    /// Query the balance of `owner` without publishing it.
    pub async fn read_balance(&self, owner: Address) -> Result<TokenBalance, TokenError> {
        let result = self.reader.balance_of(self.token, owner).await;
        metrics::record_balance_read(result.is_ok());

        match result {
            Ok(raw) => {
                let balance = TokenBalance {
                    owner: Some(owner),
                    amount: TokenAmount::from_raw(raw),
                };
                tracing::debug!(owner = %owner, balance = %balance.amount, "Balance read");
                Ok(balance)
            }
            Err(e) => {
                tracing::warn!(owner = %owner, error = %e, "Balance read failed");
                Err(TokenError::balance(e))
            }
        }
    }

    /// Read and publish. On failure the published balance is left as is.
    pub async fn refresh(&self, owner: Address) -> Result<TokenBalance, TokenError> {
        let seq = self.take_seq();
        let balance = self.read_balance(owner).await?;
        self.publish(seq, balance);
        Ok(balance)
    }

    /// Read and publish; on failure publish zero instead.
    ///
    /// The zero carries the failed read's sequence number, so it never
    /// hides a fresher successful read.
    pub async fn refresh_or_reset(&self, owner: Address) -> Result<TokenBalance, TokenError> {
        let seq = self.take_seq();
        match self.read_balance(owner).await {
            Ok(balance) => {
                self.publish(seq, balance);
                Ok(balance)
            }
            Err(e) => {
                self.publish(seq, TokenBalance::zero(Some(owner)));
                Err(e)
            }
        }
    }

    /// Publish a zero balance.
    pub fn reset(&self, owner: Option<Address>) {
        let seq = self.take_seq();
        self.publish(seq, TokenBalance::zero(owner));
    }

    pub fn current(&self) -> TokenBalance {
        self.published.borrow().balance
    }

    pub fn subscribe(&self) -> watch::Receiver<PublishedBalance> {
        self.published.subscribe()
    }

    fn take_seq(&self) -> u64 {
        self.next_seq.fetch_add(1, Ordering::SeqCst)
    }

    /// Returns false when a later read was already published.
    fn publish(&self, seq: u64, balance: TokenBalance) -> bool {
        let applied = self.published.send_if_modified(|current| {
            if seq > current.seq {
                *current = PublishedBalance { seq, balance };
                true
            } else {
                false
            }
        });
        if !applied {
            tracing::debug!(seq, "Discarding out-of-order balance read");
        }
        applied
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockchain::{BlockchainError, BlockchainResult};
    use alloy::primitives::{address, U256};
    use async_trait::async_trait;
    use std::sync::Mutex;
    use tokio::sync::oneshot;

    const OWNER: Address = address!("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa1");
    const TOKEN: Address = address!("00000000000000000000000000000000000000c1");

    /// Answers each read from a queue of pre-arranged replies.
    struct ScriptedReader {
        replies: Mutex<Vec<oneshot::Receiver<BlockchainResult<U256>>>>,
    }

    impl ScriptedReader {
        fn new(count: usize) -> (Self, Vec<oneshot::Sender<BlockchainResult<U256>>>) {
            let (senders, receivers): (Vec<_>, Vec<_>) =
                (0..count).map(|_| oneshot::channel()).unzip();
            let reader = Self {
                replies: Mutex::new(receivers.into_iter().rev().collect()),
            };
            (reader, senders)
        }
    }

    #[async_trait]
    impl TokenReader for ScriptedReader {
        async fn balance_of(&self, _token: Address, _owner: Address) -> BlockchainResult<U256> {
            let reply = self.replies.lock().unwrap().pop().expect("unexpected read");
            reply
                .await
                .unwrap_or_else(|_| Err(BlockchainError::Rpc("dropped".into())))
        }
    }

    fn tokens(whole: u64) -> U256 {
        U256::from(whole) * U256::from(10u64).pow(U256::from(18u64))
    }

    #[tokio::test]
    async fn test_refresh_publishes() {
        let (reader, mut replies) = ScriptedReader::new(1);
        let balances = BalanceReader::new(Arc::new(reader), TOKEN);
        replies.remove(0).send(Ok(tokens(100))).unwrap();

        let balance = balances.refresh(OWNER).await.unwrap();
        assert_eq!(balance.display(), "100.0");
        assert_eq!(balances.current(), balance);
        assert_eq!(balances.current().owner, Some(OWNER));
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_previous() {
        let (reader, mut replies) = ScriptedReader::new(2);
        let balances = BalanceReader::new(Arc::new(reader), TOKEN);
        replies.remove(0).send(Ok(tokens(100))).unwrap();
        replies.remove(0).send(Err(BlockchainError::Reverted("boom".into()))).unwrap();

        balances.refresh(OWNER).await.unwrap();
        let err = balances.refresh(OWNER).await.unwrap_err();
        assert!(matches!(err, TokenError::BalanceFetchFailed(_)));
        assert_eq!(balances.current().display(), "100.0");
    }

    #[tokio::test]
    async fn test_refresh_or_reset_zeroes_on_failure() {
        let (reader, mut replies) = ScriptedReader::new(2);
        let balances = BalanceReader::new(Arc::new(reader), TOKEN);
        replies.remove(0).send(Ok(tokens(100))).unwrap();
        replies.remove(0).send(Err(BlockchainError::Rpc("down".into()))).unwrap();

        balances.refresh(OWNER).await.unwrap();
        assert!(balances.refresh_or_reset(OWNER).await.is_err());
        assert!(balances.current().amount.is_zero());
    }

    #[tokio::test]
    async fn test_stale_read_is_discarded() {
        let (reader, mut replies) = ScriptedReader::new(2);
        let balances = Arc::new(BalanceReader::new(Arc::new(reader), TOKEN));
        let slow_reply = replies.remove(0);
        let fast_reply = replies.remove(0);

        // The slow read starts first and therefore holds the older sequence number.
        let slow = tokio::spawn({
            let balances = balances.clone();
            async move { balances.refresh(OWNER).await }
        });
        tokio::task::yield_now().await;
        let fast = tokio::spawn({
            let balances = balances.clone();
            async move { balances.refresh(OWNER).await }
        });
        tokio::task::yield_now().await;

        fast_reply.send(Ok(tokens(44))).unwrap();
        fast.await.unwrap().unwrap();
        assert_eq!(balances.current().display(), "44.0");

        slow_reply.send(Ok(tokens(100))).unwrap();
        slow.await.unwrap().unwrap();
        assert_eq!(balances.current().display(), "44.0");
    }

    #[tokio::test]
    async fn test_reset_notifies_subscribers() {
        let (reader, _replies) = ScriptedReader::new(0);
        let balances = BalanceReader::new(Arc::new(reader), TOKEN);
        let mut rx = balances.subscribe();

        balances.reset(None);
        assert!(rx.has_changed().unwrap());
        let published = *rx.borrow_and_update();
        assert_eq!(published.balance, TokenBalance::zero(None));
        assert_eq!(published.seq, 1);
    }
}
