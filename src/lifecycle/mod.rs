//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Signals (signals.rs):
//!     SIGINT → Shutdown::trigger
//!
//! Shutdown (shutdown.rs):
//!     broadcast → session watcher, network tracker exit their loops
//! ```

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
