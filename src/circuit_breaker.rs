//! # Circuit Breaker Module
//!
//! Caller-side circuit breaker for the vision service. After a run of
//! consecutive failed analyses it refuses further calls for a cool-down
//! period, so a dead endpoint or an exhausted quota is not hammered.

use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use crate::scan_config::RecoveryConfig;

/// Circuit breaker for vision model calls
///
/// # State Machine
///
/// - **Closed**: Normal operation, calls pass through
/// - **Open**: `circuit_breaker_threshold` consecutive failures, calls fail fast
/// - **Reset**: once `circuit_breaker_reset_secs` have passed since the last
///   failure, the counters clear and the next call is let through
#[derive(Debug)]
pub struct CircuitBreaker {
    state: Mutex<BreakerState>,
    config: RecoveryConfig,
}

#[derive(Debug, Default)]
struct BreakerState {
    consecutive_failures: u32,
    last_failure: Option<Instant>,
}

impl CircuitBreaker {
    /// Create a new circuit breaker with the given configuration
    ///
    /// # Examples
    ///
    /// ```rust
    /// use vitamin_scan::circuit_breaker::CircuitBreaker;
    /// use vitamin_scan::scan_config::RecoveryConfig;
    ///
    /// let breaker = CircuitBreaker::new(RecoveryConfig::default());
    /// assert!(!breaker.is_open());
    /// ```
    pub fn new(config: RecoveryConfig) -> Self {
        Self {
            state: Mutex::new(BreakerState::default()),
            config,
        }
    }

    // A panic while holding the lock cannot leave the counters inconsistent
    fn lock(&self) -> MutexGuard<'_, BreakerState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Whether calls should currently be refused
    pub fn is_open(&self) -> bool {
        let mut state = self.lock();

        if state.consecutive_failures < self.config.circuit_breaker_threshold {
            return false;
        }

        match state.last_failure {
            Some(last) if last.elapsed() < Duration::from_secs(self.config.circuit_breaker_reset_secs) => true,
            _ => {
                *state = BreakerState::default();
                false
            }
        }
    }

    pub fn record_failure(&self) {
        let mut state = self.lock();
        state.consecutive_failures += 1;
        state.last_failure = Some(Instant::now());
    }

    pub fn record_success(&self) {
        *self.lock() = BreakerState::default();
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.lock().consecutive_failures
    }
}
