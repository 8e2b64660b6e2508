//! Shared doubles for integration tests.
//!
//! `MockLedger` plays the RPC node and the token contract at once: it keeps
//! balances, applies confirmed calls, and counts every network touch.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use alloy::primitives::{address, Address, TxHash, U256};
use async_trait::async_trait;
use tokio::sync::{mpsc, watch, Semaphore};

use simp_console::blockchain::{
    BlockchainError, BlockchainResult, ChainId, ConfirmationStatus, ContractConnector, TokenCall,
    TokenContract, TokenReader, Wallet,
};
use simp_console::config::AppConfig;
use simp_console::notice::{ChannelNotifier, Notice};
use simp_console::session::LocalWalletProvider;
use simp_console::token::amount::parse_units;
use simp_console::token::{PublishedBalance, TokenConsole};

/// Anvil's first account.
pub const TEST_PRIVATE_KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
/// Anvil's second account.
pub const SECOND_PRIVATE_KEY: &str =
    "59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d";
pub const RECIPIENT: Address = address!("bbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb2");
pub const RECIPIENT_STR: &str = "0xbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb2";
pub const TOKEN: &str = "0x00000000000000000000000000000000000000c1";
pub const SEPOLIA: ChainId = ChainId(11155111);
pub const MAINNET: ChainId = ChainId(1);

pub fn tokens(amount: &str) -> U256 {
    parse_units(amount, 18).unwrap()
}

struct LedgerState {
    balances: Mutex<HashMap<Address, U256>>,
    pending: Mutex<HashMap<TxHash, (Address, TokenCall)>>,
    next_tx: AtomicU64,
    block: AtomicU64,
    reads: AtomicUsize,
    connects: AtomicUsize,
    submissions: AtomicUsize,
    fail_reads: AtomicBool,
    reject_submissions: AtomicBool,
    revert_next: AtomicBool,
    hold_confirmations: AtomicBool,
    confirm_permits: Semaphore,
}

/// In-memory node + token contract.
#[derive(Clone)]
pub struct MockLedger {
    state: Arc<LedgerState>,
}

impl MockLedger {
    pub fn new() -> Self {
        Self {
            state: Arc::new(LedgerState {
                balances: Mutex::new(HashMap::new()),
                pending: Mutex::new(HashMap::new()),
                next_tx: AtomicU64::new(0),
                block: AtomicU64::new(100),
                reads: AtomicUsize::new(0),
                connects: AtomicUsize::new(0),
                submissions: AtomicUsize::new(0),
                fail_reads: AtomicBool::new(false),
                reject_submissions: AtomicBool::new(false),
                revert_next: AtomicBool::new(false),
                hold_confirmations: AtomicBool::new(false),
                confirm_permits: Semaphore::new(0),
            }),
        }
    }

    pub fn set_balance(&self, owner: Address, amount: &str) {
        self.state.balances.lock().unwrap().insert(owner, tokens(amount));
    }

    pub fn balance(&self, owner: Address) -> U256 {
        self.state
            .balances
            .lock()
            .unwrap()
            .get(&owner)
            .copied()
            .unwrap_or_default()
    }

    pub fn reads(&self) -> usize {
        self.state.reads.load(Ordering::SeqCst)
    }

    pub fn connects(&self) -> usize {
        self.state.connects.load(Ordering::SeqCst)
    }

    pub fn submissions(&self) -> usize {
        self.state.submissions.load(Ordering::SeqCst)
    }

    /// Every request that would have left the process.
    pub fn network_calls(&self) -> usize {
        self.reads() + self.connects() + self.submissions()
    }

    pub fn fail_reads(&self, fail: bool) {
        self.state.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn reject_submissions(&self) {
        self.state.reject_submissions.store(true, Ordering::SeqCst);
    }

    pub fn revert_next(&self) {
        self.state.revert_next.store(true, Ordering::SeqCst);
    }

    /// Park confirmations until `release_confirmation` is called.
    pub fn hold_confirmations(&self) {
        self.state.hold_confirmations.store(true, Ordering::SeqCst);
    }

    pub fn release_confirmation(&self) {
        self.state.confirm_permits.add_permits(1);
    }

    /// Wait until `count` transactions have been submitted.
    pub async fn wait_for_submissions(&self, count: usize) {
        tokio::time::timeout(Duration::from_secs(2), async {
            while self.submissions() < count {
                tokio::task::yield_now().await;
            }
        })
        .await
        .expect("timed out waiting for submission");
    }

    fn apply(&self, signer: Address, call: TokenCall) -> Result<(), String> {
        let mut balances = self.state.balances.lock().unwrap();
        let from = balances.get(&signer).copied().unwrap_or_default();
        match call {
            TokenCall::Transfer { to, amount } => {
                let remaining = from
                    .checked_sub(amount)
                    .ok_or("ERC20: transfer amount exceeds balance")?;
                balances.insert(signer, remaining);
                *balances.entry(to).or_default() += amount;
            }
            TokenCall::Burn { amount } => {
                let remaining = from
                    .checked_sub(amount)
                    .ok_or("ERC20: burn amount exceeds balance")?;
                balances.insert(signer, remaining);
            }
        }
        Ok(())
    }
}

#[async_trait]
impl TokenReader for MockLedger {
    async fn balance_of(&self, _token: Address, owner: Address) -> BlockchainResult<U256> {
        self.state.reads.fetch_add(1, Ordering::SeqCst);
        if self.state.fail_reads.load(Ordering::SeqCst) {
            return Err(BlockchainError::Rpc("connection refused".to_string()));
        }
        Ok(self.balance(owner))
    }
}

#[async_trait]
impl ContractConnector for MockLedger {
    async fn connect(
        &self,
        signer: Wallet,
        _contract: Address,
    ) -> BlockchainResult<Arc<dyn TokenContract>> {
        self.state.connects.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::new(MockContract {
            ledger: self.clone(),
            signer: signer.address(),
        }))
    }
}

struct MockContract {
    ledger: MockLedger,
    signer: Address,
}

#[async_trait]
impl TokenContract for MockContract {
    fn signer_address(&self) -> Address {
        self.signer
    }

    async fn submit(&self, call: TokenCall) -> BlockchainResult<TxHash> {
        let state = &self.ledger.state;
        state.submissions.fetch_add(1, Ordering::SeqCst);
        if state.reject_submissions.load(Ordering::SeqCst) {
            return Err(BlockchainError::Wallet("user rejected the request".to_string()));
        }
        let n = state.next_tx.fetch_add(1, Ordering::SeqCst) + 1;
        let tx_hash = TxHash::with_last_byte(n as u8);
        state.pending.lock().unwrap().insert(tx_hash, (self.signer, call));
        Ok(tx_hash)
    }

    async fn confirm(&self, tx_hash: TxHash) -> BlockchainResult<ConfirmationStatus> {
        let state = &self.ledger.state;
        if state.hold_confirmations.load(Ordering::SeqCst) {
            if let Ok(permit) = state.confirm_permits.acquire().await {
                permit.forget();
            }
        }

        let (signer, call) = state
            .pending
            .lock()
            .unwrap()
            .remove(&tx_hash)
            .ok_or_else(|| BlockchainError::Rpc("unknown transaction".to_string()))?;
        let block_number = state.block.fetch_add(1, Ordering::SeqCst);

        if state.revert_next.swap(false, Ordering::SeqCst) {
            return Ok(ConfirmationStatus::Failed("Transaction reverted".to_string()));
        }
        match self.ledger.apply(signer, call) {
            Ok(()) => Ok(ConfirmationStatus::Confirmed { block_number }),
            Err(reason) => Ok(ConfirmationStatus::Failed(reason)),
        }
    }
}

/// A console wired to a `MockLedger`.
pub struct Harness {
    pub ledger: MockLedger,
    pub wallet: Arc<LocalWalletProvider>,
    pub console: Arc<TokenConsole>,
    pub notices: mpsc::UnboundedReceiver<Notice>,
    pub account: Address,
}

impl Harness {
    pub fn new() -> Self {
        let mut config = AppConfig::default();
        config.token.contract_address = TOKEN.to_string();

        let ledger = MockLedger::new();
        let wallet = Arc::new(LocalWalletProvider::new());
        let (notifier, notices) = ChannelNotifier::new();
        let console = TokenConsole::new(
            &config,
            wallet.clone(),
            Arc::new(ledger.clone()),
            Arc::new(ledger.clone()),
            Arc::new(notifier),
        )
        .unwrap();
        let account = test_wallet().address();

        Self {
            ledger,
            wallet,
            console: Arc::new(console),
            notices,
            account,
        }
    }

    /// Harness with the test account connected on `chain_id` holding `balance`.
    pub fn connected(chain_id: ChainId, balance: &str) -> Self {
        let harness = Self::new();
        harness.ledger.set_balance(harness.account, balance);
        harness.wallet.connect(test_wallet(), chain_id);
        harness
    }

    pub fn published(&self) -> String {
        self.console.balances().current().display()
    }

    pub fn drain_notices(&mut self) -> Vec<Notice> {
        let mut notices = Vec::new();
        while let Ok(n) = self.notices.try_recv() {
            notices.push(n);
        }
        notices
    }

    pub async fn next_notice(&mut self) -> Notice {
        tokio::time::timeout(Duration::from_secs(2), self.notices.recv())
            .await
            .expect("timed out waiting for notice")
            .expect("notifier closed")
    }
}

pub fn test_wallet() -> Wallet {
    Wallet::from_private_key(TEST_PRIVATE_KEY).unwrap()
}

pub fn second_wallet() -> Wallet {
    Wallet::from_private_key(SECOND_PRIVATE_KEY).unwrap()
}

/// Wait until the published balance renders as `expected`.
pub async fn wait_for_balance(rx: &mut watch::Receiver<PublishedBalance>, expected: &str) {
    let wait = rx.wait_for(|p| p.balance.display() == expected);
    tokio::time::timeout(Duration::from_secs(2), wait)
        .await
        .expect("timed out waiting for balance")
        .expect("balance channel closed");
}
