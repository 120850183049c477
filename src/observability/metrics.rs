//! Metrics collection and exposition.
//!
//! # Metrics
//! - `failover_breaker_state` (gauge): 0=closed, 1=open, 2=half-open, by breaker
//! - `failover_breaker_transitions_total` (counter): by breaker, from, to
//! - `failover_probe_total` (counter): health probes by provider, result
//! - `failover_provider_health` (gauge): 1=healthy, 0=unhealthy, last probe
//! - `failover_selections_total` (counter): selections by provider, tier
//! - `failover_selection_errors_total` (counter): failed selections by reason
//! - `failover_provider_latency_seconds` (histogram): reported latencies
//! - `failover_outcomes_total` (counter): live outcome reports by provider, result
//!
//! # Design Decisions
//! - Recorded through the `metrics` facade; a no-op until a recorder is installed
//! - Prometheus exposition is opt-in via configuration

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Duration;

use crate::resilience::CircuitState;

/// Install the Prometheus recorder and its scrape endpoint.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_breaker_transition(breaker: &str, from: CircuitState, to: CircuitState) {
    counter!(
        "failover_breaker_transitions_total",
        "breaker" => breaker.to_string(),
        "from" => from.as_str(),
        "to" => to.as_str()
    )
    .increment(1);
    gauge!("failover_breaker_state", "breaker" => breaker.to_string()).set(to as u8 as f64);
}

pub fn record_probe(provider: &str, healthy: bool) {
    let result = if healthy { "healthy" } else { "unhealthy" };
    counter!("failover_probe_total", "provider" => provider.to_string(), "result" => result).increment(1);
    gauge!("failover_provider_health", "provider" => provider.to_string())
        .set(if healthy { 1.0 } else { 0.0 });
}

pub fn record_selection(provider: &str, tier: &'static str) {
    counter!("failover_selections_total", "provider" => provider.to_string(), "tier" => tier).increment(1);
}

pub fn record_selection_error(reason: &'static str) {
    counter!("failover_selection_errors_total", "reason" => reason).increment(1);
}

pub fn record_latency(provider: &str, latency: Duration) {
    histogram!("failover_provider_latency_seconds", "provider" => provider.to_string())
        .record(latency.as_secs_f64());
}

pub fn record_outcome(provider: &str, success: bool) {
    let result = if success { "success" } else { "failure" };
    counter!("failover_outcomes_total", "provider" => provider.to_string(), "result" => result).increment(1);
}
