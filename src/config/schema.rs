//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the failover
//! service. All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root configuration for the failover service.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct FailoverConfig {
    /// Per-provider circuit breaker settings.
    pub circuit_breaker: CircuitBreakerConfig,

    /// Background health probe settings.
    pub health_check: HealthCheckConfig,

    /// Latency tracking settings.
    pub latency: LatencyConfig,

    /// Weighted provider selection settings.
    pub selection: SelectionConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Admin API settings.
    pub admin: AdminConfig,

    /// Static provider catalog.
    pub providers: Vec<ProviderConfig>,

    /// Static model catalog.
    pub models: Vec<ModelConfig>,
}

/// Circuit breaker thresholds and timings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CircuitBreakerConfig {
    /// Consecutive failures in Closed before the circuit opens.
    pub failure_threshold: u32,

    /// Consecutive successes in Half-Open before the circuit closes.
    pub success_threshold: u32,

    /// Time an open circuit waits before allowing trial calls, in milliseconds.
    pub recovery_timeout_ms: u64,

    /// Monitoring window in milliseconds. Informational only.
    pub monitoring_period_ms: u64,
}

impl CircuitBreakerConfig {
    pub fn recovery_timeout(&self) -> Duration {
        Duration::from_millis(self.recovery_timeout_ms)
    }

    pub fn monitoring_period(&self) -> Duration {
        Duration::from_millis(self.monitoring_period_ms)
    }
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            success_threshold: 3,
            recovery_timeout_ms: 30_000,
            monitoring_period_ms: 10_000,
        }
    }
}

/// Health check configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HealthCheckConfig {
    /// Enable the background probe loop.
    pub enabled: bool,

    /// Probe interval in seconds.
    pub interval_secs: u64,

    /// Per-probe request timeout in seconds.
    pub timeout_secs: u64,

    /// HTTP client-level timeout in seconds.
    pub client_timeout_secs: u64,

    /// Path appended to each provider endpoint.
    pub path: String,
}

impl Default for HealthCheckConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_secs: 30,
            timeout_secs: 5,
            client_timeout_secs: 10,
            path: "/health".to_string(),
        }
    }
}

/// Latency tracker configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LatencyConfig {
    /// EMA smoothing factor applied to each new sample.
    pub smoothing_factor: f64,
}

impl Default for LatencyConfig {
    fn default() -> Self {
        Self {
            smoothing_factor: 0.1,
        }
    }
}

/// Weighted selection configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SelectionConfig {
    /// Fraction of latency-ranked candidates forming the cost-effective tier.
    pub cost_effective_ratio: f64,

    /// Probability that a draw targets the cost-effective tier.
    pub cost_effective_share: f64,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            cost_effective_ratio: 0.7,
            cost_effective_share: 0.7,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Admin API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AdminConfig {
    /// Enable admin API.
    pub enabled: bool,

    /// API key for authentication (Bearer token).
    pub api_key: String,

    /// Admin API bind address.
    pub bind_address: String,

    /// Request timeout for admin handlers in seconds.
    pub request_timeout_secs: u64,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            // WARNING: This is a placeholder! Change this in production.
            api_key: "CHANGE_ME_IN_PRODUCTION".to_string(),
            bind_address: "127.0.0.1:8081".to_string(),
            request_timeout_secs: 10,
        }
    }
}

/// A provider entry in the static catalog.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProviderConfig {
    /// Unique provider identifier.
    pub id: i64,

    /// Provider name (also drives the cost weight lookup).
    pub name: String,

    /// Base endpoint URL; `/health` is appended for probes.
    pub endpoint: String,

    /// Whether the provider is active.
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

/// A model entry in the static catalog.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ModelConfig {
    /// Unique model row identifier.
    pub id: i64,

    /// Model key requested by callers (e.g. "gpt-4o").
    pub model_key: String,

    /// Owning provider.
    pub provider_id: i64,

    /// Display name.
    #[serde(default)]
    pub name: String,
}
