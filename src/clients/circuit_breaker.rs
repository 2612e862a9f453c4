use std::sync::Mutex;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::models::circuit_breaker::{CircuitBreakerConfig, CircuitState};

struct BreakerInner {
    state: CircuitState,
    failures: u32,
    successes: u32,
    opened_at: Option<Instant>,
}

/// In-process circuit breaker guarding the mail transport. An open circuit
/// is what the drain loop sees as its suspend signal: stop claiming, leave
/// the queue for a later pass.
pub struct CircuitBreaker {
    service_name: String,
    config: CircuitBreakerConfig,
    inner: Mutex<BreakerInner>,
}

impl CircuitBreaker {
    pub fn new(service_name: String, config: CircuitBreakerConfig) -> Self {
        info!(service = %service_name, "Circuit breaker initialized");

        Self {
            service_name,
            config,
            inner: Mutex::new(BreakerInner {
                state: CircuitState::Closed,
                failures: 0,
                successes: 0,
                opened_at: None,
            }),
        }
    }

    /// Whether a request may go to the guarded service right now. An open
    /// circuit whose reset timeout has elapsed transitions to half-open and
    /// lets one probe through.
    pub fn allow_request(&self) -> bool {
        let mut inner = self.inner.lock().expect("breaker mutex poisoned");

        match inner.state {
            CircuitState::Closed | CircuitState::HalfOpen => true,
            CircuitState::Open => {
                let elapsed = inner
                    .opened_at
                    .map(|at| at.elapsed())
                    .unwrap_or(Duration::ZERO);

                if elapsed >= Duration::from_secs(self.config.timeout_seconds) {
                    info!(service = %self.service_name, "Circuit breaker attempting reset");
                    inner.state = CircuitState::HalfOpen;
                    inner.successes = 0;
                    true
                } else {
                    warn!(service = %self.service_name, "Circuit breaker is open, rejecting request");
                    false
                }
            }
        }
    }

    pub fn record_success(&self) {
        let mut inner = self.inner.lock().expect("breaker mutex poisoned");

        match inner.state {
            CircuitState::HalfOpen => {
                inner.successes += 1;
                debug!(
                    service = %self.service_name,
                    successes = inner.successes,
                    threshold = self.config.success_threshold,
                    "Circuit breaker success recorded"
                );

                if inner.successes >= self.config.success_threshold {
                    inner.state = CircuitState::Closed;
                    inner.failures = 0;
                    inner.successes = 0;
                    inner.opened_at = None;
                    info!(service = %self.service_name, "Circuit breaker closed after successful recovery");
                }
            }
            CircuitState::Closed => {
                inner.failures = 0;
            }
            CircuitState::Open => {}
        }
    }

    pub fn record_failure(&self) {
        let mut inner = self.inner.lock().expect("breaker mutex poisoned");

        if inner.state == CircuitState::HalfOpen {
            inner.state = CircuitState::Open;
            inner.opened_at = Some(Instant::now());
            warn!(service = %self.service_name, "Circuit breaker reopened after failed recovery attempt");
            return;
        }

        inner.failures += 1;
        debug!(
            service = %self.service_name,
            failures = inner.failures,
            threshold = self.config.failure_threshold,
            "Circuit breaker failure recorded"
        );

        if inner.failures >= self.config.failure_threshold {
            inner.state = CircuitState::Open;
            inner.opened_at = Some(Instant::now());
            warn!(
                service = %self.service_name,
                failures = inner.failures,
                "Circuit breaker opened due to consecutive failures"
            );
        }
    }

    pub fn state(&self) -> CircuitState {
        self.inner.lock().expect("breaker mutex poisoned").state
    }
}
