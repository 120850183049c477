//! Provider and model catalog.
//!
//! # Data Flow
//! ```text
//! FailoverConfig.providers / .models
//!     → store.rs (StaticCatalog, implements ProviderStore)
//!     → FailoverManager (startup snapshot)
//!     → HealthChecker (endpoint lookup per probe)
//!     → routers (model → owning provider)
//! ```
//!
//! # Design Decisions
//! - The store is a seam: anything implementing `ProviderStore` can back it
//! - Records are read-mostly; the failover core never writes them

pub mod store;
pub mod types;

pub use store::{CatalogError, ProviderStore, StaticCatalog};
pub use types::{Model, ModelFilter, Provider, ProviderFilter, ProviderId};
