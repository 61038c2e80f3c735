//! Provider health monitor
//!
//! One monitor per registered provider. It owns the provider's circuit
//! breaker, cumulative probe metrics and a bounded probe history, and can run
//! a cancellable periodic probe task.
//!
//! Probes against the same provider are serialized; probes against different
//! providers run independently.

use crate::config::{HealthConfig, ResilienceConfig};
use crate::health::events::{HealthEvent, HealthEventSink};
use crate::logging::log_health_check;
use crate::resilience::{CircuitBreaker, CircuitBreakerConfig};
use crate::utils::TimedOperation;
use aegis_domain::constants::HEALTH_HISTORY_CAPACITY;
use aegis_domain::error::{AuthError, AuthErrorCode, AuthResult};
use aegis_domain::ports::AuthProvider;
use aegis_domain::value_objects::{
    HealthCheckResult, HealthState, HealthStatus, ProviderHealthMetrics,
};
use futures::FutureExt;
use std::collections::VecDeque;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex, PoisonError, RwLock, Weak};
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Probe configuration of one provider
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderHealthConfig {
    /// Interval between periodic probes
    pub check_interval: Duration,
    /// Budget for a single probe attempt
    pub timeout: Duration,
    /// Extra attempts after a failed probe attempt
    pub retries: u32,
    /// Failure policy of the provider's breaker
    pub circuit_breaker: CircuitBreakerConfig,
    /// Ordered fallback provider names
    pub fallback_providers: Vec<String>,
    /// Lower bound for reported probe durations
    pub min_response_time: Option<Duration>,
}

impl ProviderHealthConfig {
    /// Build from the `health` and `resilience` configuration sections
    pub fn from_config(health: &HealthConfig, resilience: &ResilienceConfig) -> Self {
        Self {
            check_interval: Duration::from_millis(health.check_interval_ms),
            timeout: Duration::from_millis(health.timeout_ms),
            retries: health.retries,
            circuit_breaker: CircuitBreakerConfig::from(resilience),
            fallback_providers: Vec::new(),
            min_response_time: health.min_response_time_ms.map(Duration::from_millis),
        }
    }

    /// Set the probe interval
    #[must_use]
    pub fn with_check_interval(mut self, interval: Duration) -> Self {
        self.check_interval = interval;
        self
    }

    /// Set the probe timeout
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the retry count
    #[must_use]
    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    /// Set the breaker policy
    #[must_use]
    pub fn with_circuit_breaker(mut self, config: CircuitBreakerConfig) -> Self {
        self.circuit_breaker = config;
        self
    }

    /// Set the fallback chain
    #[must_use]
    pub fn with_fallbacks(mut self, fallbacks: Vec<String>) -> Self {
        self.fallback_providers = fallbacks;
        self
    }
}

impl Default for ProviderHealthConfig {
    fn default() -> Self {
        Self::from_config(&HealthConfig::default(), &ResilienceConfig::default())
    }
}

#[derive(Debug)]
struct MonitorState {
    status: HealthState,
    metrics: ProviderHealthMetrics,
    history: VecDeque<HealthCheckResult>,
}

impl MonitorState {
    fn fresh() -> Self {
        Self {
            status: HealthState::Healthy,
            metrics: ProviderHealthMetrics::default(),
            history: VecDeque::with_capacity(HEALTH_HISTORY_CAPACITY),
        }
    }
}

/// Health monitor of one provider
pub struct ProviderHealthMonitor {
    provider: Arc<dyn AuthProvider>,
    name: String,
    config: ProviderHealthConfig,
    breaker: CircuitBreaker,
    probe_lock: tokio::sync::Mutex<()>,
    state: RwLock<MonitorState>,
    task: Mutex<Option<CancellationToken>>,
    sink: RwLock<Option<HealthEventSink>>,
}

impl ProviderHealthMonitor {
    /// Create a monitor for `provider`; monitoring is not started
    pub fn new(provider: Arc<dyn AuthProvider>, config: ProviderHealthConfig) -> Self {
        let name = provider.name().to_string();
        let breaker = CircuitBreaker::new(name.clone(), config.circuit_breaker.clone());
        Self {
            provider,
            name,
            config,
            breaker,
            probe_lock: tokio::sync::Mutex::new(()),
            state: RwLock::new(MonitorState::fresh()),
            task: Mutex::new(None),
            sink: RwLock::new(None),
        }
    }

    /// Monitored provider name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Monitored provider
    pub fn provider(&self) -> &Arc<dyn AuthProvider> {
        &self.provider
    }

    /// Probe configuration
    pub fn config(&self) -> &ProviderHealthConfig {
        &self.config
    }

    /// The provider's circuit breaker
    pub fn circuit_breaker(&self) -> &CircuitBreaker {
        &self.breaker
    }

    /// Deliver events of this monitor to `sink`
    pub fn set_event_sink(&self, sink: HealthEventSink) {
        *self.sink.write().unwrap_or_else(PoisonError::into_inner) = Some(sink);
    }

    /// Probe the provider once
    ///
    /// Never fails: every probe error, timeout or panic is reported as an
    /// unhealthy result.
    pub async fn perform_health_check(&self) -> HealthCheckResult {
        let _serialized = self.probe_lock.lock().await;

        let floor = self
            .config
            .min_response_time
            .unwrap_or(Duration::from_millis(1))
            .max(Duration::from_millis(1));
        let timer = TimedOperation::start().with_floor(floor);

        let outcome = self.breaker.execute(|| self.probe_with_retries()).await;
        let response_time = timer.elapsed();

        let result = match outcome {
            Ok(()) => HealthCheckResult::healthy(&self.name, response_time),
            Err(error) => HealthCheckResult::unhealthy(&self.name, response_time, error.message),
        };
        log_health_check(&self.name, result.is_healthy(), result.error.as_deref());

        self.record(result.clone());
        result
    }

    async fn probe_with_retries(&self) -> AuthResult<()> {
        let attempts = self.config.retries.saturating_add(1);
        let mut last_error = None;

        for attempt in 1..=attempts {
            match self.probe_once().await {
                Ok(()) => return Ok(()),
                Err(error) => {
                    debug!(
                        provider = %self.name,
                        attempt,
                        attempts,
                        code = %error.code,
                        "Health probe attempt failed"
                    );
                    last_error = Some(error);
                }
            }
        }

        Err(last_error.unwrap_or_else(AuthError::internal))
    }

    async fn probe_once(&self) -> AuthResult<()> {
        let probe = async {
            let valid = self.provider.validate_session().await?;
            if !valid {
                return Err(AuthError::new(
                    AuthErrorCode::ProviderError,
                    "Session validity probe reported an invalid session",
                ));
            }
            if self.provider.capabilities().is_empty() {
                return Err(AuthError::new(
                    AuthErrorCode::ProviderError,
                    "Provider advertises no capabilities",
                ));
            }
            Ok::<(), AuthError>(())
        };

        match tokio::time::timeout(self.config.timeout, AssertUnwindSafe(probe).catch_unwind())
            .await
        {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(_panic)) => Err(AuthError::new(
                AuthErrorCode::ProviderError,
                "Health probe panicked",
            )),
            Err(_elapsed) => Err(AuthError::timeout(format!(
                "Health probe timed out after {}ms",
                self.config.timeout.as_millis()
            ))),
        }
    }

    fn record(&self, result: HealthCheckResult) {
        let previous = {
            let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
            let previous = state.status;
            state.metrics.record(&result);
            state.status = result.status;
            if state.history.len() == HEALTH_HISTORY_CAPACITY {
                state.history.pop_front();
            }
            state.history.push_back(result.clone());
            previous
        };

        let current = result.status;
        let timestamp = result.timestamp;
        self.emit(&HealthEvent::CheckCompleted(result));
        if previous != current {
            info!(provider = %self.name, ?previous, ?current, "Provider health changed");
            self.emit(&HealthEvent::StatusChanged {
                provider: self.name.clone(),
                previous,
                current,
                timestamp,
            });
        }
    }

    fn emit(&self, event: &HealthEvent) {
        let sink = self
            .sink
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        if let Some(sink) = sink {
            sink(event);
        }
    }

    /// Snapshot of status, metrics, history and breaker
    pub fn health_status(&self) -> HealthStatus {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        HealthStatus {
            provider_name: self.name.clone(),
            status: state.status,
            metrics: state.metrics.clone(),
            history: state.history.iter().cloned().collect(),
            circuit: self.breaker.metrics(),
        }
    }

    /// Whether the last probe (if any) was healthy
    pub fn is_healthy(&self) -> bool {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .status
            == HealthState::Healthy
    }

    /// Unhealthy probes since the last healthy one
    pub fn consecutive_failures(&self) -> u32 {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .metrics
            .consecutive_failures
    }

    /// Zero all counters, clear history and restore uptime to 100
    pub fn reset_metrics(&self) {
        *self.state.write().unwrap_or_else(PoisonError::into_inner) = MonitorState::fresh();
        debug!(provider = %self.name, "Health metrics reset");
    }

    /// Start periodic probing every `check_interval`
    ///
    /// The first probe runs one interval after the call. Calling this while
    /// already monitoring is a no-op. Fails with `VALIDATION_ERROR` when the
    /// interval is zero.
    pub fn start_monitoring(self: &Arc<Self>) -> AuthResult<()> {
        if self.config.check_interval.is_zero() {
            return Err(AuthError::validation(format!(
                "Health check interval of {} must be greater than zero",
                self.name
            )));
        }
        let mut task = self.task.lock().unwrap_or_else(PoisonError::into_inner);
        if task.as_ref().is_some_and(|token| !token.is_cancelled()) {
            return Ok(());
        }

        let token = CancellationToken::new();
        let cancelled = token.clone();
        let monitor: Weak<Self> = Arc::downgrade(self);
        let period = self.config.check_interval;

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    biased;
                    () = cancelled.cancelled() => break,
                    _ = ticker.tick() => {}
                }

                let Some(monitor) = monitor.upgrade() else {
                    break;
                };
                tokio::select! {
                    biased;
                    () = cancelled.cancelled() => break,
                    _ = monitor.perform_health_check() => {}
                }
            }
        });

        *task = Some(token);
        info!(
            provider = %self.name,
            interval_ms = u64::try_from(period.as_millis()).unwrap_or(u64::MAX),
            "Health monitoring started"
        );
        Ok(())
    }

    /// Stop periodic probing; no-op if not monitoring
    ///
    /// An in-flight probe is abandoned and cannot reschedule the task.
    pub fn stop_monitoring(&self) {
        let token = self
            .task
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(token) = token {
            token.cancel();
            info!(provider = %self.name, "Health monitoring stopped");
        }
    }

    /// Whether periodic probing is active
    pub fn is_monitoring(&self) -> bool {
        self.task
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|token| !token.is_cancelled())
    }
}

impl Drop for ProviderHealthMonitor {
    fn drop(&mut self) {
        if let Some(token) = self
            .task
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            token.cancel();
        }
    }
}

impl std::fmt::Debug for ProviderHealthMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderHealthMonitor")
            .field("name", &self.name)
            .field("config", &self.config)
            .field("monitoring", &self.is_monitoring())
            .finish_non_exhaustive()
    }
}
