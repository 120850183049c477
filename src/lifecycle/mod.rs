//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Load config → Build catalog → Start failover manager → Start admin API
//!
//! Shutdown (shutdown.rs):
//!     Signal received → Stop admin API → Stop probe loop → Exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Probe loop stop waits for the in-flight round

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
