//! Circuit Breaker Module
//!
//! Failure-isolating state machine guarding one provider.
//!
//! ```text
//!            failures >= threshold
//!   CLOSED ─────────────────────────▶ OPEN
//!     ▲                                │ recovery_timeout elapsed,
//!     │ trial succeeds                 │ next call admitted as trial
//!     │                                ▼
//!     └──────────────────────────── HALF_OPEN ──▶ OPEN (trial fails,
//!                                                     cooldown restarts)
//! ```
//!
//! Only one trial call is in flight while half-open; concurrent callers are
//! rejected with `CIRCUIT_BREAKER_OPEN` exactly like in the open state.

use crate::config::ResilienceConfig;
use crate::constants::{
    CIRCUIT_BREAKER_EXPECTED_RECOVERY_MS, CIRCUIT_BREAKER_FAILURE_THRESHOLD,
    CIRCUIT_BREAKER_MONITORING_PERIOD_MS, CIRCUIT_BREAKER_RECOVERY_TIMEOUT_MS,
};
use aegis_domain::error::{AuthError, AuthResult};
use aegis_domain::value_objects::{CircuitBreakerMetrics, CircuitState};
use chrono::{DateTime, Utc};
use std::future::Future;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Circuit breaker configuration
#[derive(Debug, Clone, PartialEq)]
pub struct CircuitBreakerConfig {
    /// Consecutive failures that open the circuit
    pub failure_threshold: u32,
    /// Cooldown before a trial call is admitted
    pub recovery_timeout: Duration,
    /// A failure older than this no longer counts towards the threshold
    pub monitoring_period: Duration,
    /// How long a trial call may hold the half-open slot before another
    /// trial is admitted
    pub expected_recovery_time: Duration,
}

impl CircuitBreakerConfig {
    /// Create a configuration with explicit threshold and cooldown
    pub fn new(failure_threshold: u32, recovery_timeout: Duration) -> Self {
        Self {
            failure_threshold,
            recovery_timeout,
            ..Self::default()
        }
    }
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: CIRCUIT_BREAKER_FAILURE_THRESHOLD,
            recovery_timeout: Duration::from_millis(CIRCUIT_BREAKER_RECOVERY_TIMEOUT_MS),
            monitoring_period: Duration::from_millis(CIRCUIT_BREAKER_MONITORING_PERIOD_MS),
            expected_recovery_time: Duration::from_millis(CIRCUIT_BREAKER_EXPECTED_RECOVERY_MS),
        }
    }
}

impl From<&ResilienceConfig> for CircuitBreakerConfig {
    fn from(config: &ResilienceConfig) -> Self {
        Self {
            failure_threshold: config.failure_threshold,
            recovery_timeout: Duration::from_millis(config.recovery_timeout_ms),
            monitoring_period: Duration::from_millis(config.monitoring_period_ms),
            expected_recovery_time: Duration::from_millis(config.expected_recovery_time_ms),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum BreakerState {
    Closed,
    Open {
        opened_at: Instant,
        opened_at_wall: DateTime<Utc>,
    },
    HalfOpen {
        trial_started: Option<Instant>,
    },
}

#[derive(Debug)]
struct BreakerInner {
    state: BreakerState,
    failures: u32,
    last_failure: Option<Instant>,
    last_failure_time: Option<DateTime<Utc>>,
    rejected_calls: u64,
}

impl BreakerInner {
    fn closed() -> Self {
        Self {
            state: BreakerState::Closed,
            failures: 0,
            last_failure: None,
            last_failure_time: None,
            rejected_calls: 0,
        }
    }
}

/// Per-provider circuit breaker
///
/// # Example
///
/// ```ignore
/// use aegis_infrastructure::resilience::{CircuitBreaker, CircuitBreakerConfig};
///
/// let breaker = CircuitBreaker::new("ldap-primary", CircuitBreakerConfig::default());
/// let session = breaker.execute(|| provider.authenticate(&credentials)).await?;
/// ```
#[derive(Debug)]
pub struct CircuitBreaker {
    name: String,
    config: CircuitBreakerConfig,
    inner: Mutex<BreakerInner>,
}

impl CircuitBreaker {
    /// Create a closed breaker
    pub fn new<S: Into<String>>(name: S, config: CircuitBreakerConfig) -> Self {
        Self {
            name: name.into(),
            config,
            inner: Mutex::new(BreakerInner::closed()),
        }
    }

    /// Name of the guarded provider
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Configuration in effect
    pub fn config(&self) -> &CircuitBreakerConfig {
        &self.config
    }

    fn lock(&self) -> MutexGuard<'_, BreakerInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run `operation` under the breaker
    ///
    /// While open (or while a half-open trial is in flight) the operation is
    /// not invoked and `CIRCUIT_BREAKER_OPEN` is returned. Errors whose code
    /// is not a provider fault are passed through and count as a response
    /// from the provider.
    pub async fn execute<T, F, Fut>(&self, operation: F) -> AuthResult<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = AuthResult<T>>,
    {
        self.admit()?;

        match operation().await {
            Ok(value) => {
                self.on_success();
                Ok(value)
            }
            Err(error) => {
                if error.code.is_provider_fault() {
                    self.on_failure();
                } else {
                    self.on_success();
                }
                Err(error)
            }
        }
    }

    /// Decide whether a call may proceed, moving OPEN to HALF_OPEN when the
    /// cooldown has elapsed
    fn admit(&self) -> AuthResult<()> {
        let mut inner = self.lock();
        let now = Instant::now();

        let admitted = match inner.state {
            BreakerState::Closed => true,
            BreakerState::Open { opened_at, .. } => {
                if now.duration_since(opened_at) >= self.config.recovery_timeout {
                    info!(provider = %self.name, "Circuit breaker transitioning to HALF_OPEN");
                    inner.state = BreakerState::HalfOpen {
                        trial_started: Some(now),
                    };
                    true
                } else {
                    false
                }
            }
            BreakerState::HalfOpen {
                trial_started: None,
            } => {
                inner.state = BreakerState::HalfOpen {
                    trial_started: Some(now),
                };
                true
            }
            BreakerState::HalfOpen {
                trial_started: Some(started),
            } => {
                if now.duration_since(started) >= self.config.expected_recovery_time {
                    debug!(provider = %self.name, "Stale trial call, admitting a new one");
                    inner.state = BreakerState::HalfOpen {
                        trial_started: Some(now),
                    };
                    true
                } else {
                    false
                }
            }
        };

        if admitted {
            Ok(())
        } else {
            inner.rejected_calls += 1;
            debug!(provider = %self.name, "Circuit breaker rejected call");
            Err(AuthError::circuit_open(&self.name))
        }
    }

    /// Record a successful call
    ///
    /// Resets the failure counter while closed and closes the circuit after a
    /// half-open trial. A late success while open leaves the circuit open.
    pub fn on_success(&self) {
        let mut inner = self.lock();
        match inner.state {
            BreakerState::Closed => inner.failures = 0,
            BreakerState::HalfOpen { .. } => {
                info!(provider = %self.name, "Circuit breaker transitioning to CLOSED");
                inner.state = BreakerState::Closed;
                inner.failures = 0;
            }
            BreakerState::Open { .. } => {}
        }
    }

    /// Record a failed call
    ///
    /// Opens the circuit when the threshold is reached while closed, and
    /// reopens it (restarting the cooldown) after a failed half-open trial.
    pub fn on_failure(&self) {
        let mut inner = self.lock();
        let now = Instant::now();

        match inner.state {
            BreakerState::Closed => {
                if inner
                    .last_failure
                    .is_some_and(|last| now.duration_since(last) > self.config.monitoring_period)
                {
                    inner.failures = 0;
                }
                inner.failures = inner.failures.saturating_add(1);
                if inner.failures >= self.config.failure_threshold {
                    warn!(
                        provider = %self.name,
                        failures = inner.failures,
                        "Circuit breaker transitioning to OPEN"
                    );
                    inner.state = Self::open_now(now);
                }
            }
            BreakerState::HalfOpen { .. } => {
                warn!(
                    provider = %self.name,
                    "Trial call failed in HALF_OPEN, transitioning back to OPEN"
                );
                inner.state = Self::open_now(now);
            }
            BreakerState::Open { .. } => {}
        }

        inner.last_failure = Some(now);
        inner.last_failure_time = Some(Utc::now());
    }

    fn open_now(now: Instant) -> BreakerState {
        BreakerState::Open {
            opened_at: now,
            opened_at_wall: Utc::now(),
        }
    }

    /// Force the circuit closed and forget all failures
    pub fn reset(&self) {
        let mut inner = self.lock();
        *inner = BreakerInner::closed();
        info!(provider = %self.name, "Circuit breaker reset");
    }

    /// Current state
    pub fn state(&self) -> CircuitState {
        match self.lock().state {
            BreakerState::Closed => CircuitState::Closed,
            BreakerState::Open { .. } => CircuitState::Open,
            BreakerState::HalfOpen { .. } => CircuitState::HalfOpen,
        }
    }

    /// Whether calls are currently short-circuited
    pub fn is_open(&self) -> bool {
        self.state() == CircuitState::Open
    }

    /// Calls rejected since creation or the last reset
    pub fn rejected_calls(&self) -> u64 {
        self.lock().rejected_calls
    }

    /// Snapshot of the breaker
    pub fn metrics(&self) -> CircuitBreakerMetrics {
        let inner = self.lock();
        let (state, next_attempt) = match inner.state {
            BreakerState::Closed => (CircuitState::Closed, None),
            BreakerState::Open { opened_at_wall, .. } => {
                let cooldown = chrono::Duration::from_std(self.config.recovery_timeout)
                    .unwrap_or_else(|_| chrono::Duration::zero());
                (CircuitState::Open, Some(opened_at_wall + cooldown))
            }
            BreakerState::HalfOpen { .. } => (CircuitState::HalfOpen, None),
        };

        CircuitBreakerMetrics {
            state,
            failures: inner.failures,
            last_failure_time: inner.last_failure_time,
            next_attempt,
        }
    }
}
