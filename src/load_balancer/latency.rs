//! Per-provider latency statistics.
//!
//! Averages are exponential moving averages seeded by the first sample;
//! min/max track raw samples. Entries are created on first sample and
//! kept for the life of the tracker.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};
use std::time::{Duration, SystemTime};

use crate::catalog::ProviderId;
use crate::config::LatencyConfig;

/// Initial minimum before any sample has been seen.
const MIN_LATENCY_SENTINEL: Duration = Duration::from_secs(3600);

/// Latency statistics for one provider.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderLatency {
    pub provider_id: ProviderId,
    pub sample_count: u64,
    pub average_latency: Duration,
    pub min_latency: Duration,
    pub max_latency: Duration,
    pub last_updated: SystemTime,
}

impl ProviderLatency {
    fn new(provider_id: ProviderId) -> Self {
        Self {
            provider_id,
            sample_count: 0,
            average_latency: Duration::ZERO,
            min_latency: MIN_LATENCY_SENTINEL,
            max_latency: Duration::ZERO,
            last_updated: SystemTime::now(),
        }
    }

    fn record(&mut self, latency: Duration, alpha: f64) {
        self.average_latency = if self.sample_count == 0 {
            latency
        } else {
            Duration::from_secs_f64(
                self.average_latency.as_secs_f64() * (1.0 - alpha) + latency.as_secs_f64() * alpha,
            )
        };
        self.sample_count += 1;
        self.min_latency = self.min_latency.min(latency);
        self.max_latency = self.max_latency.max(latency);
        self.last_updated = SystemTime::now();
    }
}

/// Tracks smoothed latency per provider.
#[derive(Debug)]
pub struct LatencyTracker {
    alpha: f64,
    providers: RwLock<HashMap<ProviderId, ProviderLatency>>,
}

impl LatencyTracker {
    pub fn new(config: &LatencyConfig) -> Self {
        Self {
            alpha: config.smoothing_factor,
            providers: RwLock::new(HashMap::new()),
        }
    }

    /// Record one observed latency for `provider_id`.
    pub fn record_latency(&self, provider_id: ProviderId, latency: Duration) {
        let mut providers = self.providers.write().unwrap_or_else(PoisonError::into_inner);
        providers
            .entry(provider_id)
            .or_insert_with(|| ProviderLatency::new(provider_id))
            .record(latency, self.alpha);
    }

    /// Copy of the stats for one provider, if it has any samples.
    pub fn latency_stats(&self, provider_id: ProviderId) -> Option<ProviderLatency> {
        let providers = self.providers.read().unwrap_or_else(PoisonError::into_inner);
        providers.get(&provider_id).cloned()
    }

    /// Copies of every provider's stats.
    pub fn all_latency_stats(&self) -> HashMap<ProviderId, ProviderLatency> {
        let providers = self.providers.read().unwrap_or_else(PoisonError::into_inner);
        providers.clone()
    }

    /// Average latency or zero when no sample exists.
    pub fn average_or_zero(&self, provider_id: ProviderId) -> Duration {
        self.latency_stats(provider_id)
            .map(|s| s.average_latency)
            .unwrap_or_default()
    }

    /// Lowest-average provider among `provider_ids` that have samples.
    ///
    /// Providers without samples are skipped, not ranked.
    pub fn fastest_provider(&self, provider_ids: &[ProviderId]) -> Option<ProviderId> {
        let providers = self.providers.read().unwrap_or_else(PoisonError::into_inner);
        provider_ids
            .iter()
            .filter_map(|id| providers.get(id))
            .min_by_key(|stats| stats.average_latency)
            .map(|stats| stats.provider_id)
    }
}

impl Default for LatencyTracker {
    fn default() -> Self {
        Self::new(&LatencyConfig::default())
    }
}
