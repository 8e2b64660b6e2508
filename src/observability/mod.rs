//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! session watcher, balance reader, orchestrator, RPC client
//!     → logging.rs (tracing events with structured fields)
//!     → metrics.rs (counters, histogram, gauge)
//!
//! Consumers:
//!     → stderr (fmt layer)
//!     → Prometheus scrape endpoint (watch mode only)
//! ```

pub mod logging;
pub mod metrics;
