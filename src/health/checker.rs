//! Active health checking.
//!
//! # Responsibilities
//! - Own one circuit breaker per registered provider
//! - Periodically probe every provider's health endpoint
//! - Feed probe outcomes into that provider's breaker

use dashmap::DashMap;
use futures_util::future::join_all;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant};

use crate::catalog::{ProviderId, ProviderStore};
use crate::config::{CircuitBreakerConfig, HealthCheckConfig};
use crate::health::probe::HealthProbe;
use crate::lifecycle::Shutdown;
use crate::observability::metrics;
use crate::resilience::{CallError, CircuitBreaker};

type BreakerRegistry = DashMap<ProviderId, Arc<CircuitBreaker>>;

/// Everything one probe round needs, cheap to clone into the loop task.
#[derive(Clone)]
struct ProbeRound {
    store: Arc<dyn ProviderStore>,
    breakers: Arc<BreakerRegistry>,
    probe: HealthProbe,
}

impl ProbeRound {
    async fn check_all(&self) {
        // Snapshot ids so no map shard is held while probes run.
        let ids: Vec<ProviderId> = self.breakers.iter().map(|e| *e.key()).collect();
        tracing::debug!(providers = ids.len(), "Running health checks");

        join_all(ids.into_iter().map(|id| self.check_provider(id))).await;
    }

    async fn check_provider(&self, id: ProviderId) {
        let Some(breaker) = self.breakers.get(&id).map(|e| e.value().clone()) else {
            // Removed since the snapshot was taken.
            return;
        };

        let healthy = match self.store.get_provider(id) {
            Ok(provider) => self.probe.check(&provider.endpoint).await,
            Err(e) => {
                tracing::warn!(provider = %id, error = %e, "Failed to resolve provider for health check");
                false
            }
        };

        let result = breaker.call(|| {
            if healthy {
                Ok(())
            } else {
                Err(format!("provider {} is unhealthy", id))
            }
        });

        match result {
            Ok(()) => tracing::debug!(provider = %id, "Health check passed"),
            Err(CallError::CircuitOpen) => {
                tracing::debug!(provider = %id, healthy, "Health check skipped breaker update: circuit open")
            }
            Err(CallError::Failed(reason)) => {
                tracing::warn!(provider = %id, reason = %reason, "Health check failed")
            }
        }

        metrics::record_probe(&id.to_string(), healthy);
    }
}

struct RunningLoop {
    shutdown: Shutdown,
    handle: JoinHandle<()>,
}

/// Monitors provider health and owns the per-provider circuit breakers.
pub struct HealthChecker {
    round: ProbeRound,
    config: HealthCheckConfig,
    breaker_config: CircuitBreakerConfig,
    running: Mutex<Option<RunningLoop>>,
}

impl HealthChecker {
    pub fn new(
        store: Arc<dyn ProviderStore>,
        config: HealthCheckConfig,
        breaker_config: CircuitBreakerConfig,
    ) -> Self {
        Self {
            round: ProbeRound {
                store,
                breakers: Arc::new(DashMap::new()),
                probe: HealthProbe::new(&config),
            },
            config,
            breaker_config,
            running: Mutex::new(None),
        }
    }

    /// Register a provider with a fresh closed breaker.
    ///
    /// Re-registering replaces the existing breaker.
    pub fn add_provider(&self, id: ProviderId) {
        let breaker = CircuitBreaker::new(format!("provider-{}", id), self.breaker_config.clone());
        self.round.breakers.insert(id, Arc::new(breaker));
        tracing::debug!(provider = %id, "Provider added to health monitoring");
    }

    pub fn remove_provider(&self, id: ProviderId) {
        if self.round.breakers.remove(&id).is_some() {
            tracing::debug!(provider = %id, "Provider removed from health monitoring");
        }
    }

    pub fn circuit_breaker(&self, id: ProviderId) -> Option<Arc<CircuitBreaker>> {
        self.round.breakers.get(&id).map(|e| e.value().clone())
    }

    /// Registered ids, ascending.
    pub fn provider_ids(&self) -> Vec<ProviderId> {
        let mut ids: Vec<ProviderId> = self.round.breakers.iter().map(|e| *e.key()).collect();
        ids.sort();
        ids
    }

    /// Ids whose breaker currently admits calls, ascending.
    ///
    /// Expired open breakers move to half-open as a side effect.
    pub fn healthy_providers(&self) -> Vec<ProviderId> {
        let mut ids: Vec<ProviderId> = self
            .round
            .breakers
            .iter()
            .filter(|e| e.value().is_available())
            .map(|e| *e.key())
            .collect();
        ids.sort();
        ids
    }

    /// Run one probe round now and wait for it to finish.
    pub async fn check_now(&self) {
        self.round.check_all().await;
    }

    pub fn is_running(&self) -> bool {
        self.running
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Start the periodic probe loop. Requires a Tokio runtime.
    ///
    /// No-op if already running or disabled by configuration. A zero
    /// interval is logged as an error and the loop is not started.
    pub fn start(&self) {
        if !self.config.enabled {
            tracing::info!("Active health checks disabled");
            return;
        }
        if self.config.interval_secs == 0 {
            tracing::error!("Health check interval must be positive, not starting probe loop");
            return;
        }

        let mut running = self.running.lock().unwrap_or_else(PoisonError::into_inner);
        if running.is_some() {
            return;
        }

        let shutdown = Shutdown::new();
        let interval = Duration::from_secs(self.config.interval_secs);
        let handle = tokio::spawn(run_loop(self.round.clone(), interval, shutdown.subscribe()));
        *running = Some(RunningLoop { shutdown, handle });

        tracing::info!(
            interval_secs = self.config.interval_secs,
            path = %self.config.path,
            "Health checker started"
        );
    }

    /// Stop the loop and wait for any in-flight probe round to finish.
    pub async fn stop(&self) {
        let running = self
            .running
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        let Some(RunningLoop { shutdown, handle }) = running else {
            return;
        };

        shutdown.trigger();
        if let Err(e) = handle.await {
            tracing::error!(error = %e, "Health check loop terminated abnormally");
        }
        tracing::info!("Health checker stopped");
    }
}

impl Drop for HealthChecker {
    fn drop(&mut self) {
        let running = self
            .running
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(running) = running {
            running.shutdown.trigger();
        }
    }
}

async fn run_loop(round: ProbeRound, interval: Duration, mut shutdown: broadcast::Receiver<()>) {
    // First round one full interval after start.
    let mut ticker = time::interval_at(Instant::now() + interval, interval);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                round.check_all().await;
            }
            _ = shutdown.recv() => {
                tracing::debug!("Health check loop received shutdown signal, exiting");
                break;
            }
        }
    }
}
