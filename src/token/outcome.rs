//! Terminal result of a submitted operation and its user-facing notice.

use alloy::primitives::TxHash;

use crate::blockchain::TokenCall;
use crate::notice::Notice;
use crate::token::amount::TokenAmount;
use crate::token::balance::TokenBalance;
use crate::token::error::TokenError;
use crate::token::request::abbreviate;

/// The two mutating operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Transfer,
    Burn,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Transfer => "transfer",
            Operation::Burn => "burn",
        }
    }

    fn title(&self) -> &'static str {
        match self {
            Operation::Transfer => "Transfer",
            Operation::Burn => "Burn",
        }
    }
}

/// A confirmed operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxSuccess {
    pub call: TokenCall,
    pub tx_hash: TxHash,
    pub block_number: u64,
    /// Balance read after confirmation.
    pub balance: TokenBalance,
}

/// Exactly one of these is produced per submitted operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionOutcome {
    Success(TxSuccess),
    Failure(TokenError),
}

impl TransactionOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, TransactionOutcome::Success(_))
    }

    pub fn balance(&self) -> Option<&TokenBalance> {
        match self {
            TransactionOutcome::Success(s) => Some(&s.balance),
            TransactionOutcome::Failure(_) => None,
        }
    }

    pub fn error(&self) -> Option<&TokenError> {
        match self {
            TransactionOutcome::Success(_) => None,
            TransactionOutcome::Failure(e) => Some(e),
        }
    }

    pub fn into_result(self) -> Result<TxSuccess, TokenError> {
        match self {
            TransactionOutcome::Success(s) => Ok(s),
            TransactionOutcome::Failure(e) => Err(e),
        }
    }

    /// The notice to show for this outcome.
    pub fn notice(&self, operation: Operation, symbol: &str) -> Notice {
        match self {
            TransactionOutcome::Success(success) => match success.call {
                TokenCall::Transfer { to, amount } => Notice::success(format!(
                    "Transferred {} {} to {}",
                    TokenAmount::from_raw(amount),
                    symbol,
                    abbreviate(&to)
                )),
                TokenCall::Burn { amount } => Notice::success(format!(
                    "Burned {} {}",
                    TokenAmount::from_raw(amount),
                    symbol
                )),
            },
            TransactionOutcome::Failure(e) if e.is_precondition() => Notice::error(e.to_string()),
            TransactionOutcome::Failure(e) => {
                Notice::error(format!("{} failed: {}", operation.title(), e))
            }
        }
    }
}

impl From<Result<TxSuccess, TokenError>> for TransactionOutcome {
    fn from(result: Result<TxSuccess, TokenError>) -> Self {
        match result {
            Ok(s) => TransactionOutcome::Success(s),
            Err(e) => TransactionOutcome::Failure(e),
        }
    }
}
