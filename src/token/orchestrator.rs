//! Transfer and burn orchestration.
//!
//! # Flow
//! ```text
//! busy check → account present → input validation → ChainGate
//!     → ContractBinding → submit (accepted) → confirm (included)
//!     → BalanceReader refresh → outcome + notice
//! ```
//!
//! # Guarantees
//! - At most one mutating operation in flight per orchestrator
//! - Precondition failures make no network call
//! - The balance refresh starts only after confirmation
//! - A failed operation never touches the published balance
//! - Only the still-active account's balance is published after confirmation
//! - Every failure is returned as a [`TransactionOutcome`], never a panic

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use crate::blockchain::{ConfirmationStatus, TokenCall};
use crate::notice::Notifier;
use crate::observability::metrics;
use crate::session::WalletProvider;
use crate::token::balance::BalanceReader;
use crate::token::binding::ContractBinding;
use crate::token::error::TokenError;
use crate::token::gate::ChainGate;
use crate::token::outcome::{Operation, TransactionOutcome, TxSuccess};
use crate::token::request::{BurnRequest, TransferRequest};

/// Drives transfer and burn from validation to confirmed balance.
pub struct TransactionOrchestrator {
    wallet: Arc<dyn WalletProvider>,
    gate: ChainGate,
    binding: ContractBinding,
    balances: Arc<BalanceReader>,
    notifier: Arc<dyn Notifier>,
    symbol: String,
    busy: AtomicBool,
}

impl TransactionOrchestrator {
    pub fn new(
        wallet: Arc<dyn WalletProvider>,
        gate: ChainGate,
        binding: ContractBinding,
        balances: Arc<BalanceReader>,
        notifier: Arc<dyn Notifier>,
        symbol: impl Into<String>,
    ) -> Self {
        Self {
            wallet,
            gate,
            binding,
            balances,
            notifier,
            symbol: symbol.into(),
            busy: AtomicBool::new(false),
        }
    }

    /// True while a transfer or burn is pending. Triggering UI should be
    /// disabled while set.
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }

    pub async fn transfer(&self, request: TransferRequest) -> TransactionOutcome {
        self.execute(Operation::Transfer, || request.to_call()).await
    }

    pub async fn burn(&self, request: BurnRequest) -> TransactionOutcome {
        self.execute(Operation::Burn, || request.to_call()).await
    }

    async fn execute<F>(&self, operation: Operation, build: F) -> TransactionOutcome
    where
        F: FnOnce() -> Result<TokenCall, TokenError>,
    {
        let outcome = match BusyGuard::acquire(&self.busy) {
            Some(_guard) => TransactionOutcome::from(self.run(operation, build).await),
            None => TransactionOutcome::Failure(TokenError::Busy),
        };

        match &outcome {
            TransactionOutcome::Success(s) => {
                metrics::record_transaction(operation.as_str(), "success");
                tracing::info!(
                    operation = operation.as_str(),
                    tx_hash = %s.tx_hash,
                    block = s.block_number,
                    balance = %s.balance.amount,
                    "Operation confirmed"
                );
            }
            TransactionOutcome::Failure(e) => {
                metrics::record_transaction(operation.as_str(), e.kind());
                if e.is_precondition() {
                    tracing::info!(operation = operation.as_str(), reason = %e, "Operation rejected");
                } else {
                    tracing::error!(operation = operation.as_str(), error = %e, "Operation failed");
                }
            }
        }

        self.notifier.notify(outcome.notice(operation, &self.symbol));
        outcome
    }

    async fn run<F>(&self, operation: Operation, build: F) -> Result<TxSuccess, TokenError>
    where
        F: FnOnce() -> Result<TokenCall, TokenError>,
    {
        let session = self.wallet.session();
        let account = session.account.ok_or(TokenError::NoWalletConnected)?;
        let call = build()?;
        self.gate.check(&session)?;

        let contract = self.binding.resolve_writable_contract().await?;
        if contract.signer_address() != account {
            tracing::warn!(
                session_account = %account,
                signer = %contract.signer_address(),
                "Signer differs from session account"
            );
        }

        let started = Instant::now();
        let tx_hash = contract.submit(call).await.map_err(TokenError::transaction)?;
        tracing::info!(
            operation = operation.as_str(),
            tx_hash = %tx_hash,
            "Submitted, awaiting confirmation"
        );

        let block_number = match contract.confirm(tx_hash).await.map_err(TokenError::transaction)? {
            ConfirmationStatus::Confirmed { block_number } => block_number,
            ConfirmationStatus::Failed(reason) => return Err(TokenError::TransactionFailed(reason)),
            ConfirmationStatus::Confirming { current, required } => {
                return Err(TokenError::TransactionFailed(format!(
                    "Confirmation incomplete ({} of {} blocks)",
                    current, required
                )));
            }
        };
        metrics::record_confirmation_latency(operation.as_str(), started.elapsed());

        // Publish only while the submitting account is still the active one.
        let balance = if self.wallet.session().account == Some(account) {
            self.balances.refresh(account).await?
        } else {
            tracing::info!(
                operation = operation.as_str(),
                account = %account,
                "Account changed while pending, leaving published balance alone"
            );
            self.balances.read_balance(account).await?
        };

        Ok(TxSuccess {
            call,
            tx_hash,
            block_number,
            balance,
        })
    }
}

/// Holds the busy flag for the duration of one operation.
struct BusyGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> BusyGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()
            .map(|_| Self { flag })
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}
