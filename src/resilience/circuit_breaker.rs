//! Circuit breaker for provider protection.
//!
//! # States
//! - Closed: normal operation, calls pass through
//! - Open: provider assumed down, calls fail fast
//! - Half-Open: trial calls test whether the provider recovered
//!
//! # State Transitions
//! ```text
//! Closed → Open: consecutive failures >= failure_threshold
//! Open → Half-Open: recovery timeout elapsed (checked lazily)
//! Half-Open → Closed: consecutive successes >= success_threshold
//! Half-Open → Open: any failure
//! ```
//!
//! # Design Decisions
//! - Per-provider circuit breaker (not global)
//! - Fail fast in Open state; the wrapped operation is never invoked
//! - Deadlines are stored and compared on demand, no timer tasks
//! - Probe outcomes and live traffic outcomes feed the same breaker

use std::fmt;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Instant;

use crate::config::CircuitBreakerConfig;
use crate::observability::metrics;

/// Circuit state.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    Closed = 0,
    Open = 1,
    HalfOpen = 2,
}

impl CircuitState {
    /// Label used in status reports.
    pub fn as_str(&self) -> &'static str {
        match self {
            CircuitState::Closed => "closed",
            CircuitState::Open => "open",
            CircuitState::HalfOpen => "half-open",
        }
    }
}

impl fmt::Display for CircuitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned by [`CircuitBreaker::call`].
#[derive(Debug)]
pub enum CallError<E> {
    /// The breaker is open; the operation was not invoked.
    CircuitOpen,
    /// The operation ran and failed.
    Failed(E),
}

impl<E: fmt::Display> fmt::Display for CallError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallError::CircuitOpen => f.write_str("circuit breaker is open"),
            CallError::Failed(e) => write!(f, "{}", e),
        }
    }
}

impl<E: fmt::Debug + fmt::Display> std::error::Error for CallError<E> {}

/// Point-in-time copy of a breaker's mutable fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BreakerSnapshot {
    pub state: CircuitState,
    pub failure_count: u32,
    pub success_count: u32,
    pub last_failure_time: Option<Instant>,
    pub next_retry_time: Option<Instant>,
}

#[derive(Debug)]
struct BreakerState {
    state: CircuitState,
    failure_count: u32,
    success_count: u32,
    last_failure_time: Option<Instant>,
    next_retry_time: Option<Instant>,
}

impl BreakerState {
    fn closed() -> Self {
        Self {
            state: CircuitState::Closed,
            failure_count: 0,
            success_count: 0,
            last_failure_time: None,
            next_retry_time: None,
        }
    }
}

/// Three-state circuit breaker guarding calls to one provider.
#[derive(Debug)]
pub struct CircuitBreaker {
    name: String,
    config: CircuitBreakerConfig,
    inner: RwLock<BreakerState>,
}

impl CircuitBreaker {
    /// Create a closed breaker.
    pub fn new(name: impl Into<String>, config: CircuitBreakerConfig) -> Self {
        Self {
            name: name.into(),
            config,
            inner: RwLock::new(BreakerState::closed()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &CircuitBreakerConfig {
        &self.config
    }

    /// Execute `f` under breaker protection.
    ///
    /// The state is read and the lock released before `f` runs, so a
    /// concurrent transition may land between the check and the recorded
    /// outcome. The outcome is applied to whatever state holds by then.
    pub fn call<T, E, F>(&self, f: F) -> Result<T, CallError<E>>
    where
        F: FnOnce() -> Result<T, E>,
    {
        if self.read().state == CircuitState::Open {
            return Err(CallError::CircuitOpen);
        }

        let result = f();
        self.record_result(result.is_ok());
        result.map_err(CallError::Failed)
    }

    /// Apply an outcome without invoking any operation.
    pub fn record_result(&self, success: bool) {
        let mut inner = self.write();
        let from = inner.state;
        let now = Instant::now();

        if success {
            inner.failure_count = 0;
            if inner.state == CircuitState::HalfOpen {
                inner.success_count += 1;
                if inner.success_count >= self.config.success_threshold {
                    inner.state = CircuitState::Closed;
                    inner.success_count = 0;
                    inner.next_retry_time = None;
                }
            }
        } else {
            inner.failure_count = inner.failure_count.saturating_add(1);
            inner.last_failure_time = Some(now);
            match inner.state {
                CircuitState::Closed if inner.failure_count >= self.config.failure_threshold => {
                    inner.state = CircuitState::Open;
                    inner.next_retry_time = Some(now + self.config.recovery_timeout());
                }
                CircuitState::HalfOpen => {
                    inner.state = CircuitState::Open;
                    inner.success_count = 0;
                    inner.next_retry_time = Some(now + self.config.recovery_timeout());
                }
                // Open: a late report counts but does not move the deadline.
                _ => {}
            }
        }

        let to = inner.state;
        drop(inner);
        self.on_transition(from, to);
    }

    /// Move an expired Open breaker to Half-Open.
    pub fn check_state(&self) {
        let now = Instant::now();
        let expired = |s: &BreakerState| {
            s.state == CircuitState::Open && s.next_retry_time.is_some_and(|t| now > t)
        };

        if !expired(&self.read()) {
            return;
        }

        let mut inner = self.write();
        // Re-check under the exclusive lock; another caller may have won.
        if expired(&inner) {
            inner.state = CircuitState::HalfOpen;
            inner.success_count = 0;
            drop(inner);
            self.on_transition(CircuitState::Open, CircuitState::HalfOpen);
        }
    }

    /// Whether calls may currently pass (Closed or Half-Open).
    pub fn is_available(&self) -> bool {
        self.check_state();
        self.read().state != CircuitState::Open
    }

    /// Current state, without evaluating the recovery deadline.
    pub fn state(&self) -> CircuitState {
        self.read().state
    }

    pub fn snapshot(&self) -> BreakerSnapshot {
        let inner = self.read();
        BreakerSnapshot {
            state: inner.state,
            failure_count: inner.failure_count,
            success_count: inner.success_count,
            last_failure_time: inner.last_failure_time,
            next_retry_time: inner.next_retry_time,
        }
    }

    /// Force the breaker closed and clear all counters and timestamps.
    pub fn reset(&self) {
        let mut inner = self.write();
        let from = inner.state;
        *inner = BreakerState::closed();
        drop(inner);
        self.on_transition(from, CircuitState::Closed);
    }

    fn on_transition(&self, from: CircuitState, to: CircuitState) {
        if from == to {
            return;
        }
        match to {
            CircuitState::Open => tracing::warn!(
                breaker = %self.name,
                from = %from,
                recovery_timeout_ms = self.config.recovery_timeout_ms,
                "Circuit opened"
            ),
            _ => tracing::info!(breaker = %self.name, from = %from, to = %to, "Circuit state changed"),
        }
        metrics::record_breaker_transition(&self.name, from, to);
    }

    fn read(&self) -> RwLockReadGuard<'_, BreakerState> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, BreakerState> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}
