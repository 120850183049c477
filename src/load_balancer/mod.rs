//! Provider selection subsystem.
//!
//! # Data Flow
//! ```text
//! Request for model M
//!     → candidates filtered by breaker availability
//!     → latency.rs (rank by smoothed average latency)
//!     → weighted.rs (cost-effective / premium draw, random.rs)
//!     → chosen provider
//!
//! routers.rs: model id → owning provider, fastest-healthy or scored
//! ```
//!
//! # Design Decisions
//! - Selection is pure in-memory work; no I/O on the request path
//! - Randomness comes through a trait so tests can fix the draws

pub mod latency;
pub mod random;
pub mod routers;
pub mod weighted;

pub use latency::{LatencyTracker, ProviderLatency};
pub use random::{RandomSource, SecureRandom};
pub use routers::{LatencyBasedRouter, WeightedRouter};
pub use weighted::{Tier, WeightedSelector};
