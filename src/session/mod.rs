//! Wallet session subsystem.
//!
//! # Data Flow
//! ```text
//! provider.rs (connect / switch network / disconnect)
//!     → watch channel of WalletSession
//!     → watcher.rs (gate, then reset or refresh the published balance)
//! ```

pub mod provider;
pub mod watcher;

pub use provider::{LocalWalletProvider, WalletProvider, WalletSession};
pub use watcher::SessionWatcher;
