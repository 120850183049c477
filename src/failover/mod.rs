//! Failover and provider selection.
//!
//! # Data Flow
//! ```text
//! select_provider(model_key)
//!     → catalog snapshot (model → candidate providers)
//!     → health checker (drop providers whose circuit is open)
//!     → latency tracker (rank candidates fastest first)
//!     → weighted selector (cost-effective / premium draw)
//!
//! After the real call:
//!     report_success / report_failure → circuit breaker
//!     record_latency                  → latency tracker
//! ```

pub mod error;
pub mod manager;
pub mod status;

pub use error::{FailoverError, FailoverResult};
pub use manager::FailoverManager;
pub use status::ProviderStatus;
