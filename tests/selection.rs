//! Latency-ranked weighted selection over the real secure random source.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use provider_failover::catalog::{ProviderId, StaticCatalog};
use provider_failover::failover::FailoverManager;

mod common;

fn manager() -> FailoverManager {
    let config = common::config_with_providers(
        "llama-3",
        &[
            (1, "openai", "http://127.0.0.1:9".into()),
            (2, "meta", "http://127.0.0.1:9".into()),
            (3, "groq", "http://127.0.0.1:9".into()),
        ],
    );
    FailoverManager::new(Arc::new(StaticCatalog::from_config(&config)), &config).unwrap()
}

fn distribution(manager: &FailoverManager, rounds: usize) -> HashMap<ProviderId, usize> {
    let mut counts = HashMap::new();
    for _ in 0..rounds {
        let provider = manager.select_provider("llama-3").unwrap();
        *counts.entry(provider.id).or_insert(0) += 1;
    }
    counts
}

#[tokio::test]
async fn test_slowest_provider_gets_premium_share() {
    let manager = manager();
    manager.record_latency(ProviderId(1), Duration::from_millis(100));
    manager.record_latency(ProviderId(2), Duration::from_millis(50));
    manager.record_latency(ProviderId(3), Duration::from_millis(200));

    // Ranking 2, 1 | 3: the cost-effective pair shares ~70%, 3 gets ~30%.
    let counts = distribution(&manager, 3000);
    let slow = counts.get(&ProviderId(3)).copied().unwrap_or(0);
    let fast = counts.get(&ProviderId(2)).copied().unwrap_or(0);
    let mid = counts.get(&ProviderId(1)).copied().unwrap_or(0);

    assert!(slow > 700 && slow < 1100, "counts {:?}", counts);
    assert!(fast > 850 && mid > 850, "counts {:?}", counts);
    assert_eq!(slow + fast + mid, 3000);
}

#[tokio::test]
async fn test_open_provider_never_selected() {
    let manager = manager();
    manager.record_latency(ProviderId(2), Duration::from_millis(5));
    for _ in 0..5 {
        manager.report_failure(ProviderId(2));
    }

    let counts = distribution(&manager, 500);
    assert!(!counts.contains_key(&ProviderId(2)), "counts {:?}", counts);
    assert_eq!(counts.values().sum::<usize>(), 500);
}

#[tokio::test]
async fn test_two_candidates_split_seventy_thirty() {
    let manager = manager();
    for _ in 0..5 {
        manager.report_failure(ProviderId(3));
    }
    manager.record_latency(ProviderId(1), Duration::from_millis(300));
    manager.record_latency(ProviderId(2), Duration::from_millis(30));

    // N = 2: k = 1, so the faster provider takes the cost-effective tier.
    let counts = distribution(&manager, 2000);
    let fast = counts.get(&ProviderId(2)).copied().unwrap_or(0);
    assert!(fast > 1250 && fast < 1550, "counts {:?}", counts);
}

#[tokio::test]
async fn test_live_outcomes_reset_failure_streak() {
    let manager = manager();
    for _ in 0..4 {
        manager.report_failure(ProviderId(1));
    }
    manager.report_success(ProviderId(1));
    for _ in 0..4 {
        manager.report_failure(ProviderId(1));
    }

    let status = manager.provider_status();
    assert!(status["1"].healthy);
    assert_eq!(status["1"].circuit_state, "closed");

    manager.report_failure(ProviderId(1));
    assert!(!manager.provider_status()["1"].healthy);
}
