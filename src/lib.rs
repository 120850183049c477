//! Provider failover core for LLM routing.
//!
//! Tracks provider health with per-provider circuit breakers fed by
//! periodic probes and live outcome reports, keeps smoothed latency per
//! provider, and picks a provider for a model key with a weighted
//! cost-effective / premium draw over the healthy candidates.

pub mod admin;
pub mod catalog;
pub mod config;
pub mod failover;
pub mod health;
pub mod lifecycle;
pub mod load_balancer;
pub mod observability;
pub mod resilience;

pub use catalog::{Provider, ProviderId, ProviderStore, StaticCatalog};
pub use config::FailoverConfig;
pub use failover::{FailoverError, FailoverManager};
pub use lifecycle::Shutdown;
