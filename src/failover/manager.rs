//! Failover manager: catalog snapshot + health + latency → one provider.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard};
use std::time::Duration;

use crate::catalog::{Model, ModelFilter, Provider, ProviderFilter, ProviderId, ProviderStore};
use crate::config::FailoverConfig;
use crate::failover::error::{FailoverError, FailoverResult};
use crate::failover::status::{cost_weight_for, ProviderStatus};
use crate::health::HealthChecker;
use crate::load_balancer::latency::LatencyTracker;
use crate::load_balancer::random::{RandomSource, SecureRandom};
use crate::load_balancer::weighted::WeightedSelector;
use crate::observability::metrics;

/// Catalog data loaded once at construction.
#[derive(Debug, Default)]
struct CatalogSnapshot {
    providers: HashMap<ProviderId, Provider>,
    /// Model key → entries, in store order.
    models: HashMap<String, Vec<Model>>,
    cost_weights: HashMap<ProviderId, f64>,
}

/// Coordinates circuit breakers, health checking and latency-aware selection.
pub struct FailoverManager {
    health: Arc<HealthChecker>,
    latency: Arc<LatencyTracker>,
    catalog: RwLock<CatalogSnapshot>,
    selector: WeightedSelector<Box<dyn RandomSource>>,
}

impl FailoverManager {
    /// Load the catalog, register every provider and start health checks.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn new(store: Arc<dyn ProviderStore>, config: &FailoverConfig) -> FailoverResult<Self> {
        Self::with_random_source(store, config, Box::new(SecureRandom))
    }

    pub fn with_random_source(
        store: Arc<dyn ProviderStore>,
        config: &FailoverConfig,
        rng: Box<dyn RandomSource>,
    ) -> FailoverResult<Self> {
        let providers = store.list_providers(&ProviderFilter::default())?;
        let models = store.list_models(&ModelFilter::default())?;

        let health = Arc::new(HealthChecker::new(
            store,
            config.health_check.clone(),
            config.circuit_breaker.clone(),
        ));

        let mut snapshot = CatalogSnapshot::default();
        for provider in providers {
            health.add_provider(provider.id);
            snapshot
                .cost_weights
                .insert(provider.id, cost_weight_for(&provider.name));
            snapshot.providers.insert(provider.id, provider);
        }
        for model in models {
            snapshot
                .models
                .entry(model.model_key.clone())
                .or_default()
                .push(model);
        }

        tracing::info!(
            providers = snapshot.providers.len(),
            model_groups = snapshot.models.len(),
            "Loaded catalog for failover management"
        );

        health.start();

        Ok(Self {
            health,
            latency: Arc::new(LatencyTracker::new(&config.latency)),
            catalog: RwLock::new(snapshot),
            selector: WeightedSelector::with_random_source(&config.selection, rng),
        })
    }

    /// Start (or restart) background health checks.
    pub fn start(&self) {
        self.health.start();
        tracing::info!("Failover manager started");
    }

    /// Stop background health checks and wait for in-flight probes.
    pub async fn stop(&self) {
        self.health.stop().await;
        tracing::info!("Failover manager stopped");
    }

    /// Pick a healthy provider for `model_key`.
    ///
    /// Performs no I/O.
    pub fn select_provider(&self, model_key: &str) -> FailoverResult<Provider> {
        let result = self.try_select(model_key);
        if let Err(e) = &result {
            tracing::debug!(model = model_key, error = %e, "Provider selection failed");
            metrics::record_selection_error(e.reason());
        }
        result
    }

    fn try_select(&self, model_key: &str) -> FailoverResult<Provider> {
        let catalog = self.catalog();

        let models = match catalog.models.get(model_key) {
            Some(models) if !models.is_empty() => models,
            _ => return Err(FailoverError::NoProvidersAvailable(model_key.to_string())),
        };

        let healthy: HashSet<ProviderId> = self.health.healthy_providers().into_iter().collect();
        let mut candidates: Vec<&Provider> = models
            .iter()
            .filter(|m| healthy.contains(&m.provider_id))
            .filter_map(|m| catalog.providers.get(&m.provider_id))
            .collect();

        // Unsampled providers rank as zero latency, ahead of everyone.
        candidates.sort_by_cached_key(|p| self.latency.average_or_zero(p.id));

        let Some((provider, tier)) = self.selector.select(&candidates) else {
            return Err(FailoverError::NoHealthyProviders(model_key.to_string()));
        };

        tracing::debug!(
            model = model_key,
            provider = %provider.id,
            tier = tier.as_str(),
            candidates = candidates.len(),
            "Provider selected"
        );
        metrics::record_selection(&provider.id.to_string(), tier.as_str());

        Ok((*provider).clone())
    }

    /// Record the latency of a completed request.
    pub fn record_latency(&self, provider_id: ProviderId, latency: Duration) {
        self.latency.record_latency(provider_id, latency);
        metrics::record_latency(&provider_id.to_string(), latency);
    }

    /// Feed a failed live request into the provider's breaker.
    pub fn report_failure(&self, provider_id: ProviderId) {
        self.report(provider_id, false);
    }

    /// Feed a successful live request into the provider's breaker.
    pub fn report_success(&self, provider_id: ProviderId) {
        self.report(provider_id, true);
    }

    fn report(&self, provider_id: ProviderId, success: bool) {
        match self.health.circuit_breaker(provider_id) {
            Some(breaker) => {
                breaker.record_result(success);
                metrics::record_outcome(&provider_id.to_string(), success);
            }
            None => tracing::debug!(provider = %provider_id, success, "Outcome for unregistered provider ignored"),
        }
    }

    /// Status of every catalog provider, keyed by provider id.
    pub fn provider_status(&self) -> BTreeMap<String, ProviderStatus> {
        let catalog = self.catalog();

        catalog
            .providers
            .iter()
            .map(|(id, provider)| {
                let breaker = self.health.circuit_breaker(*id);
                let circuit_state = breaker
                    .as_ref()
                    .map_or("unknown", |b| b.state().as_str())
                    .to_string();
                let healthy = breaker.as_ref().is_some_and(|b| b.is_available());

                let status = ProviderStatus {
                    name: provider.name.clone(),
                    healthy,
                    average_latency: format!("{:?}", self.latency.average_or_zero(*id)),
                    circuit_state,
                };
                (id.to_string(), status)
            })
            .collect()
    }

    /// Cost weight computed for a provider at load time.
    pub fn cost_weight(&self, provider_id: ProviderId) -> Option<f64> {
        self.catalog().cost_weights.get(&provider_id).copied()
    }

    /// Catalog providers, ascending by id.
    pub fn providers(&self) -> Vec<Provider> {
        let mut providers: Vec<Provider> = self.catalog().providers.values().cloned().collect();
        providers.sort_by_key(|p| p.id);
        providers
    }

    /// Known model keys, sorted.
    pub fn model_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.catalog().models.keys().cloned().collect();
        keys.sort();
        keys
    }

    pub fn health_checker(&self) -> Arc<HealthChecker> {
        self.health.clone()
    }

    pub fn latency_tracker(&self) -> Arc<LatencyTracker> {
        self.latency.clone()
    }

    fn catalog(&self) -> RwLockReadGuard<'_, CatalogSnapshot> {
        self.catalog.read().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{CatalogError, StaticCatalog};
    use crate::load_balancer::weighted::tests::FixedRandom;
    use crate::resilience::CircuitState;

    fn provider(id: i64, name: &str) -> Provider {
        Provider {
            id: ProviderId(id),
            name: name.to_string(),
            endpoint: format!("http://127.0.0.1:9/{}", name),
            active: true,
        }
    }

    fn model(id: i64, key: &str, provider_id: i64) -> Model {
        Model {
            id,
            model_key: key.to_string(),
            provider_id: ProviderId(provider_id),
            name: String::new(),
        }
    }

    fn config() -> FailoverConfig {
        let mut config = FailoverConfig::default();
        config.health_check.enabled = false;
        config
    }

    fn store() -> Arc<dyn ProviderStore> {
        Arc::new(StaticCatalog::new(
            vec![provider(1, "openai"), provider(2, "meta"), provider(3, "groq")],
            vec![
                model(10, "llama-3", 1),
                model(11, "llama-3", 2),
                model(12, "llama-3", 3),
                model(13, "gpt-4o", 1),
            ],
        ))
    }

    fn manager(float: f64, index: usize) -> FailoverManager {
        FailoverManager::with_random_source(store(), &config(), Box::new(FixedRandom { float, index })).unwrap()
    }

    #[tokio::test]
    async fn test_loads_catalog_and_weights() {
        let fm = manager(0.0, 0);
        assert_eq!(fm.providers().len(), 3);
        assert_eq!(fm.model_keys(), vec!["gpt-4o".to_string(), "llama-3".to_string()]);
        assert_eq!(fm.cost_weight(ProviderId(1)), Some(0.8));
        assert_eq!(fm.cost_weight(ProviderId(2)), Some(0.3));
        assert_eq!(fm.cost_weight(ProviderId(9)), None);
        assert_eq!(
            fm.health_checker().provider_ids(),
            vec![ProviderId(1), ProviderId(2), ProviderId(3)]
        );
    }

    #[tokio::test]
    async fn test_unknown_model() {
        let fm = manager(0.0, 0);
        assert_eq!(
            fm.select_provider("nope"),
            Err(FailoverError::NoProvidersAvailable("nope".into()))
        );
    }

    #[tokio::test]
    async fn test_single_candidate_is_deterministic() {
        let fm = manager(0.99, 5);
        for _ in 0..10 {
            assert_eq!(fm.select_provider("gpt-4o").unwrap().id, ProviderId(1));
        }
    }

    #[tokio::test]
    async fn test_no_healthy_candidates() {
        let fm = manager(0.0, 0);
        for _ in 0..5 {
            fm.report_failure(ProviderId(1));
        }
        let err = fm.select_provider("gpt-4o").unwrap_err();
        assert_eq!(err, FailoverError::NoHealthyProviders("gpt-4o".into()));
        assert!(err.is_transient());
    }

    #[tokio::test]
    async fn test_low_draw_picks_lowest_latency() {
        let fm = manager(0.0, 0);
        fm.record_latency(ProviderId(1), Duration::from_millis(100));
        fm.record_latency(ProviderId(2), Duration::from_millis(50));
        fm.record_latency(ProviderId(3), Duration::from_millis(200));

        assert_eq!(fm.select_provider("llama-3").unwrap().id, ProviderId(2));
    }

    #[tokio::test]
    async fn test_high_draw_picks_premium_slice() {
        let fm = manager(0.99, 0);
        fm.record_latency(ProviderId(1), Duration::from_millis(100));
        fm.record_latency(ProviderId(2), Duration::from_millis(50));
        fm.record_latency(ProviderId(3), Duration::from_millis(200));

        // N = 3, k = 2: premium slice is the slowest provider.
        assert_eq!(fm.select_provider("llama-3").unwrap().id, ProviderId(3));
    }

    #[tokio::test]
    async fn test_unsampled_provider_ranks_fastest() {
        let fm = manager(0.0, 0);
        fm.record_latency(ProviderId(1), Duration::from_millis(10));
        fm.record_latency(ProviderId(2), Duration::from_millis(20));

        assert_eq!(fm.select_provider("llama-3").unwrap().id, ProviderId(3));
    }

    #[tokio::test]
    async fn test_open_provider_skipped() {
        let fm = manager(0.0, 0);
        fm.record_latency(ProviderId(2), Duration::from_millis(1));
        for _ in 0..5 {
            fm.report_failure(ProviderId(2));
        }
        let picked = fm.select_provider("llama-3").unwrap();
        assert_ne!(picked.id, ProviderId(2));
    }

    #[tokio::test]
    async fn test_reports_feed_breaker() {
        let fm = manager(0.0, 0);
        let cb = fm.health_checker().circuit_breaker(ProviderId(1)).unwrap();

        fm.report_failure(ProviderId(1));
        fm.report_failure(ProviderId(1));
        assert_eq!(cb.snapshot().failure_count, 2);
        fm.report_success(ProviderId(1));
        assert_eq!(cb.snapshot().failure_count, 0);

        // Unknown ids are ignored.
        fm.report_failure(ProviderId(404));
        fm.report_success(ProviderId(404));
    }

    #[tokio::test]
    async fn test_provider_status() {
        let fm = manager(0.0, 0);
        fm.record_latency(ProviderId(1), Duration::from_millis(150));
        for _ in 0..5 {
            fm.report_failure(ProviderId(2));
        }
        fm.health_checker().remove_provider(ProviderId(3));

        let status = fm.provider_status();
        assert_eq!(status.len(), 3);

        let openai = &status["1"];
        assert_eq!(openai.name, "openai");
        assert!(openai.healthy);
        assert_eq!(openai.average_latency, "150ms");
        assert_eq!(openai.circuit_state, "closed");

        let meta = &status["2"];
        assert!(!meta.healthy);
        assert_eq!(meta.circuit_state, "open");
        assert_eq!(meta.average_latency, "0ns");

        let groq = &status["3"];
        assert!(!groq.healthy);
        assert_eq!(groq.circuit_state, "unknown");
    }

    #[tokio::test]
    async fn test_catalog_failure_is_fatal() {
        struct BrokenStore;
        impl ProviderStore for BrokenStore {
            fn get_provider(&self, id: ProviderId) -> Result<Provider, CatalogError> {
                Err(CatalogError::ProviderNotFound(id))
            }
            fn get_model(&self, id: i64) -> Result<Model, CatalogError> {
                Err(CatalogError::ModelNotFound(id))
            }
            fn list_providers(&self, _: &ProviderFilter) -> Result<Vec<Provider>, CatalogError> {
                Err(CatalogError::Unavailable("database offline".into()))
            }
            fn list_models(&self, _: &ModelFilter) -> Result<Vec<Model>, CatalogError> {
                Ok(vec![])
            }
        }

        let result = FailoverManager::new(Arc::new(BrokenStore), &config());
        assert!(matches!(
            result,
            Err(FailoverError::Catalog(CatalogError::Unavailable(_)))
        ));
    }

    #[tokio::test]
    async fn test_empty_catalog() {
        let fm = FailoverManager::new(Arc::new(StaticCatalog::default()), &config()).unwrap();
        assert!(fm.provider_status().is_empty());
        assert!(matches!(
            fm.select_provider("anything"),
            Err(FailoverError::NoProvidersAvailable(_))
        ));
        fm.stop().await;
        fm.stop().await;
    }

    #[tokio::test]
    async fn test_half_open_provider_is_selectable() {
        let mut cfg = config();
        cfg.circuit_breaker.recovery_timeout_ms = 10;
        let fm = FailoverManager::with_random_source(store(), &cfg, Box::new(FixedRandom { float: 0.0, index: 0 }))
            .unwrap();
        for _ in 0..5 {
            fm.report_failure(ProviderId(1));
        }
        assert!(fm.select_provider("gpt-4o").is_err());

        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(fm.select_provider("gpt-4o").unwrap().id, ProviderId(1));
        let cb = fm.health_checker().circuit_breaker(ProviderId(1)).unwrap();
        assert_eq!(cb.state(), CircuitState::HalfOpen);
    }

    #[tokio::test]
    async fn test_concurrent_selection_and_reporting() {
        let fm = Arc::new(FailoverManager::new(store(), &config()).unwrap());
        let tasks: Vec<_> = (0..16)
            .map(|i| {
                let fm = fm.clone();
                tokio::spawn(async move {
                    for j in 0..50u64 {
                        let id = ProviderId((i % 3) + 1);
                        fm.record_latency(id, Duration::from_millis(10 + j));
                        if j % 2 == 0 {
                            fm.report_success(id);
                        }
                        let _ = fm.select_provider("llama-3");
                        let _ = fm.provider_status();
                    }
                })
            })
            .collect();
        for t in tasks {
            t.await.unwrap();
        }

        let total: u64 = fm
            .latency_tracker()
            .all_latency_stats()
            .values()
            .map(|s| s.sample_count)
            .sum();
        assert_eq!(total, 16 * 50);
        assert!(fm.select_provider("llama-3").is_ok());
    }
}
