//! Routers that resolve a model id straight through the catalog store.
//!
//! Unlike [`FailoverManager`](crate::failover::FailoverManager) these do
//! not keep a catalog snapshot: every call asks the store for the model
//! and consults the shared breaker registry and latency tracker.

use std::sync::Arc;

use crate::catalog::{ProviderId, ProviderStore};
use crate::failover::{FailoverError, FailoverResult};
use crate::health::HealthChecker;
use crate::load_balancer::latency::LatencyTracker;

/// Latency below this counts as this for scoring, in seconds.
const MIN_SCORED_LATENCY_SECS: f64 = 0.1;
const LATENCY_SCORE_WEIGHT: f64 = 0.6;
const HEALTH_SCORE_WEIGHT: f64 = 0.4;

fn is_available(health: &HealthChecker, id: ProviderId) -> bool {
    // Unregistered providers are treated as unhealthy.
    health.circuit_breaker(id).is_some_and(|b| b.is_available())
}

/// Routes to the fastest healthy provider serving a model.
pub struct LatencyBasedRouter {
    store: Arc<dyn ProviderStore>,
    latency: Arc<LatencyTracker>,
    health: Arc<HealthChecker>,
}

impl LatencyBasedRouter {
    pub fn new(
        store: Arc<dyn ProviderStore>,
        latency: Arc<LatencyTracker>,
        health: Arc<HealthChecker>,
    ) -> Self {
        Self {
            store,
            latency,
            health,
        }
    }

    pub fn route_request(&self, model_id: i64) -> FailoverResult<ProviderId> {
        let candidates = self.providers_for_model(model_id)?;
        let label = model_id.to_string();

        if candidates.is_empty() {
            return Err(FailoverError::NoProvidersAvailable(label));
        }

        let healthy: Vec<ProviderId> = candidates
            .into_iter()
            .filter(|id| is_available(&self.health, *id))
            .collect();

        let Some(first) = healthy.first().copied() else {
            return Err(FailoverError::NoHealthyProviders(label));
        };

        Ok(self.latency.fastest_provider(&healthy).unwrap_or(first))
    }

    /// A model belongs to exactly one provider in the catalog.
    fn providers_for_model(&self, model_id: i64) -> FailoverResult<Vec<ProviderId>> {
        let model = self.store.get_model(model_id)?;
        Ok(vec![model.provider_id])
    }
}

/// Routes to a model's provider if it is healthy and scores providers by
/// latency and health.
pub struct WeightedRouter {
    latency: Arc<LatencyTracker>,
    health: Arc<HealthChecker>,
    cost_weight: f64,
    premium_weight: f64,
}

impl WeightedRouter {
    pub fn new(latency: Arc<LatencyTracker>, health: Arc<HealthChecker>) -> Self {
        Self {
            latency,
            health,
            cost_weight: 0.7,
            premium_weight: 0.3,
        }
    }

    pub fn cost_weight(&self) -> f64 {
        self.cost_weight
    }

    pub fn premium_weight(&self) -> f64 {
        self.premium_weight
    }

    pub fn route_request(&self, model_id: i64, store: &dyn ProviderStore) -> FailoverResult<ProviderId> {
        let model = store.get_model(model_id)?;

        if !is_available(&self.health, model.provider_id) {
            return Err(FailoverError::NoHealthyProviders(model_id.to_string()));
        }
        Ok(model.provider_id)
    }

    /// `0.6 * latency_score + 0.4 * health_score`.
    ///
    /// The latency score is `1 / max(avg_secs, 0.1)`, or 1.0 with no
    /// samples; health is 1.0 when the breaker admits calls.
    pub fn provider_score(&self, provider_id: ProviderId) -> f64 {
        let latency_score = match self.latency.latency_stats(provider_id) {
            Some(stats) if !stats.average_latency.is_zero() => {
                1.0 / stats.average_latency.as_secs_f64().max(MIN_SCORED_LATENCY_SECS)
            }
            _ => 1.0,
        };
        let health_score = if is_available(&self.health, provider_id) {
            1.0
        } else {
            0.0
        };

        latency_score * LATENCY_SCORE_WEIGHT + health_score * HEALTH_SCORE_WEIGHT
    }
}
