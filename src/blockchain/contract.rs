//! Token contract interface and the seams the core talks through.
//!
//! The core never holds a concrete provider. Reads go through [`TokenReader`]
//! (no signer), writes through a [`TokenContract`] handed out by a
//! [`ContractConnector`] once a signer is available.

use std::sync::Arc;

use alloy::primitives::{Address, Bytes, TxHash, U256};
use alloy::sol;
use alloy::sol_types::SolCall;
use async_trait::async_trait;

use crate::blockchain::types::{BlockchainResult, ConfirmationStatus};
use crate::blockchain::wallet::Wallet;

sol! {
    /// Subset of the SIMP token ABI used by the console.
    interface SimpleToken {
        function balanceOf(address account) external view returns (uint256);
        function transfer(address to, uint256 amount) external returns (bool);
        function burn(uint256 amount) external;
    }
}

/// A state-mutating call against the token contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenCall {
    Transfer { to: Address, amount: U256 },
    Burn { amount: U256 },
}

impl TokenCall {
    /// ABI-encoded calldata for this call.
    pub fn calldata(&self) -> Bytes {
        match *self {
            TokenCall::Transfer { to, amount } => {
                SimpleToken::transferCall { to, amount }.abi_encode().into()
            }
            TokenCall::Burn { amount } => SimpleToken::burnCall { amount }.abi_encode().into(),
        }
    }

    /// Short operation label for logs and metrics.
    pub fn operation(&self) -> &'static str {
        match self {
            TokenCall::Transfer { .. } => "transfer",
            TokenCall::Burn { .. } => "burn",
        }
    }
}

/// Calldata for `balanceOf(owner)`.
pub fn balance_of_calldata(owner: Address) -> Bytes {
    SimpleToken::balanceOfCall { account: owner }.abi_encode().into()
}

/// Decode the raw `balanceOf` return data.
pub fn decode_balance(data: &[u8]) -> Result<U256, alloy::sol_types::Error> {
    SimpleToken::balanceOfCall::abi_decode_returns(data)
}

/// Read-only access to token state. Needs no signer.
#[async_trait]
pub trait TokenReader: Send + Sync {
    async fn balance_of(&self, token: Address, owner: Address) -> BlockchainResult<U256>;
}

/// Signer-bound handle to the token contract.
#[async_trait]
pub trait TokenContract: Send + Sync {
    /// Address of the account that signs submissions.
    fn signer_address(&self) -> Address;

    /// Sign and broadcast `call`, returning once the network accepted it.
    async fn submit(&self, call: TokenCall) -> BlockchainResult<TxHash>;

    /// Wait until `tx_hash` is included with the required depth.
    async fn confirm(&self, tx_hash: TxHash) -> BlockchainResult<ConfirmationStatus>;
}

/// Turns a wallet signer into a contract handle at a fixed address.
#[async_trait]
pub trait ContractConnector: Send + Sync {
    async fn connect(
        &self,
        signer: Wallet,
        contract: Address,
    ) -> BlockchainResult<Arc<dyn TokenContract>>;
}
