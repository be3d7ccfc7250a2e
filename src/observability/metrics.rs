//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_rpc_calls_total` (counter): upstream calls by network, method, outcome
//! - `gateway_rpc_duration_seconds` (histogram): upstream call latency
//! - `gateway_network_up` (gauge): 1=reachable, 0=unreachable, from status checks
//!
//! Without an installed recorder every call here is a no-op.

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};
use std::net::SocketAddr;
use std::time::Duration;

/// Install the Prometheus exporter with its own HTTP listener.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

pub fn record_rpc_call(network: &'static str, method: &'static str, ok: bool, elapsed: Duration) {
    let outcome = if ok { "ok" } else { "error" };
    counter!(
        "gateway_rpc_calls_total",
        "network" => network,
        "method" => method,
        "outcome" => outcome
    )
    .increment(1);
    histogram!(
        "gateway_rpc_duration_seconds",
        "network" => network,
        "method" => method
    )
    .record(elapsed.as_secs_f64());
}

pub fn record_network_up(network: &'static str, up: bool) {
    gauge!("gateway_network_up", "network" => network).set(if up { 1.0 } else { 0.0 });
}
