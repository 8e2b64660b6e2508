//! Metrics collection and exposition.
//!
//! # Metrics
//! - `simp_transactions_total` (counter): by operation and outcome
//! - `simp_confirmation_seconds` (histogram): submit-to-confirmation latency
//! - `simp_balance_reads_total` (counter): by result
//! - `simp_session_syncs_total` (counter): by session state
//! - `simp_rpc_healthy` (gauge): 1=reachable, 0=unreachable

use std::net::SocketAddr;
use std::time::Duration;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter on `addr`. Failure is logged, not fatal.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_transaction(operation: &'static str, outcome: &'static str) {
    ::metrics::counter!(
        "simp_transactions_total",
        "operation" => operation,
        "outcome" => outcome
    )
    .increment(1);
}

pub fn record_confirmation_latency(operation: &'static str, elapsed: Duration) {
    ::metrics::histogram!("simp_confirmation_seconds", "operation" => operation)
        .record(elapsed.as_secs_f64());
}

pub fn record_balance_read(success: bool) {
    let result = if success { "ok" } else { "error" };
    ::metrics::counter!("simp_balance_reads_total", "result" => result).increment(1);
}

pub fn record_session_sync(state: &'static str) {
    ::metrics::counter!("simp_session_syncs_total", "state" => state).increment(1);
}

pub fn record_rpc_health(healthy: bool) {
    ::metrics::gauge!("simp_rpc_healthy").set(if healthy { 1.0 } else { 0.0 });
}
