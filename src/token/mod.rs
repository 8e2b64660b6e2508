//! Token orchestration core.
//!
//! # Data Flow
//! ```text
//! session change ─▶ ChainGate ─▶ BalanceReader ─▶ published balance
//!
//! user action ─▶ request.rs (validate) ─▶ ChainGate ─▶ ContractBinding
//!     ─▶ TransactionOrchestrator (submit, confirm)
//!     ─▶ BalanceReader refresh ─▶ TransactionOutcome + Notice
//! ```

pub mod amount;
pub mod balance;
pub mod binding;
pub mod console;
pub mod error;
pub mod gate;
pub mod orchestrator;
pub mod outcome;
pub mod request;

pub use amount::{TokenAmount, TOKEN_DECIMALS};
pub use balance::{BalanceReader, PublishedBalance, TokenBalance};
pub use binding::ContractBinding;
pub use console::TokenConsole;
pub use error::TokenError;
pub use gate::ChainGate;
pub use orchestrator::TransactionOrchestrator;
pub use outcome::{Operation, TransactionOutcome, TxSuccess};
pub use request::{BurnRequest, TransferRequest};
