//! SIMP token console library.
//!
//! Account- and network-aware orchestration for a single ERC-20 style token
//! on one supported chain: gated balance sync on wallet session changes, and
//! transfer/burn submission through confirmation.

pub mod blockchain;
pub mod config;
pub mod lifecycle;
pub mod notice;
pub mod observability;
pub mod session;
pub mod token;

pub use config::AppConfig;
pub use lifecycle::Shutdown;
pub use token::TokenConsole;
