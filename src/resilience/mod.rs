//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Outcome for provider P (probe result or live request report):
//!     → circuit_breaker.rs (count, trip, recover)
//!     → is_available() consulted by selection
//! ```
//!
//! # Design Decisions
//! - One breaker per provider, owned by the health checker
//! - Outcome events carry only success/failure, not their origin

pub mod circuit_breaker;

pub use circuit_breaker::{BreakerSnapshot, CallError, CircuitBreaker, CircuitState};
