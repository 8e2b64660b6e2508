//! Blockchain integration subsystem.
//!
//! # Data Flow
//! ```text
//! Environment Variable (private key)
//!     → wallet.rs (key loading)
//!     → transaction.rs (sign, broadcast, confirm)
//! Network config (RPC URL)
//!     → client.rs (read-only RPC with timeouts + failover)
//!     → contract.rs (ABI, reader/contract traits)
//! ```
//!
//! # Security Constraints
//! - Private keys ONLY from environment variables
//! - Never log private keys or sensitive data
//! - All RPC calls have configurable timeouts

pub mod client;
pub mod contract;
pub mod transaction;
pub mod types;
pub mod wallet;

pub use client::BlockchainClient;
pub use contract::{ContractConnector, TokenCall, TokenContract, TokenReader};
pub use transaction::RpcConnector;
pub use types::{BlockchainError, BlockchainResult, ChainId, ConfirmationStatus};
pub use wallet::Wallet;
