//! Health checking subsystem.
//!
//! # Data Flow
//! ```text
//! Probe loop (checker.rs):
//!     Periodic timer
//!     → Snapshot registered providers
//!     → Probe each endpoint concurrently (probe.rs)
//!     → Feed outcome into the provider's circuit breaker
//!
//! Live traffic (failover manager):
//!     Request outcome reported
//!     → Same circuit breaker
//! ```
//!
//! # Design Decisions
//! - The checker owns the breakers; everyone else borrows them
//! - A failed lookup or probe affects only that provider's round
//! - Stop waits for the in-flight round instead of cancelling it

pub mod checker;
pub mod probe;

pub use checker::HealthChecker;
pub use probe::HealthProbe;
