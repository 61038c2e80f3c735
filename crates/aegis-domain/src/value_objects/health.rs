//! Circuit breaker and provider health value objects
//!
//! Snapshots only. The state machines that produce them live in
//! `aegis-infrastructure`.

use crate::constants::DEFAULT_UPTIME_PERCENT;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Circuit breaker state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CircuitState {
    /// Calls pass through
    Closed,
    /// Calls are rejected without invoking the operation
    Open,
    /// One trial call is permitted after the cooldown
    HalfOpen,
}

impl std::fmt::Display for CircuitState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Closed => "CLOSED",
            Self::Open => "OPEN",
            Self::HalfOpen => "HALF_OPEN",
        })
    }
}

/// Circuit breaker snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CircuitBreakerMetrics {
    /// Current state
    pub state: CircuitState,
    /// Consecutive failures counted while closed
    pub failures: u32,
    /// Time of the most recent failure
    pub last_failure_time: Option<DateTime<Utc>>,
    /// Earliest time a trial call is allowed while open
    pub next_attempt: Option<DateTime<Utc>>,
}

impl Default for CircuitBreakerMetrics {
    fn default() -> Self {
        Self {
            state: CircuitState::Closed,
            failures: 0,
            last_failure_time: None,
            next_attempt: None,
        }
    }
}

/// Binary health classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthState {
    /// Probe succeeded
    Healthy,
    /// Probe failed or timed out
    Unhealthy,
}

/// Outcome of one provider health probe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthCheckResult {
    /// Probed provider
    pub provider_name: String,
    /// Classification
    pub status: HealthState,
    /// Probe duration, never zero
    pub response_time: Duration,
    /// Failure description for unhealthy results
    pub error: Option<String>,
    /// Completion time
    pub timestamp: DateTime<Utc>,
}

impl HealthCheckResult {
    /// Healthy result
    pub fn healthy<S: Into<String>>(provider_name: S, response_time: Duration) -> Self {
        Self {
            provider_name: provider_name.into(),
            status: HealthState::Healthy,
            response_time,
            error: None,
            timestamp: Utc::now(),
        }
    }

    /// Unhealthy result
    pub fn unhealthy<S: Into<String>, E: Into<String>>(
        provider_name: S,
        response_time: Duration,
        error: E,
    ) -> Self {
        Self {
            provider_name: provider_name.into(),
            status: HealthState::Unhealthy,
            response_time,
            error: Some(error.into()),
            timestamp: Utc::now(),
        }
    }

    /// Whether the probe succeeded
    pub fn is_healthy(&self) -> bool {
        self.status == HealthState::Healthy
    }
}

/// Cumulative probe counters for one provider
///
/// Counters are never capped, independent of the bounded history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderHealthMetrics {
    /// Probes issued
    pub total_checks: u64,
    /// Probes classified healthy
    pub successful_checks: u64,
    /// Probes classified unhealthy
    pub failed_checks: u64,
    /// Unhealthy probes since the last healthy one
    pub consecutive_failures: u32,
    /// `successful_checks / total_checks * 100`, or 100 before any probe
    pub uptime: f64,
    /// Mean probe duration in milliseconds
    pub average_response_time_ms: f64,
    /// Time of the last probe
    pub last_check: Option<DateTime<Utc>>,
}

impl Default for ProviderHealthMetrics {
    fn default() -> Self {
        Self {
            total_checks: 0,
            successful_checks: 0,
            failed_checks: 0,
            consecutive_failures: 0,
            uptime: DEFAULT_UPTIME_PERCENT,
            average_response_time_ms: 0.0,
            last_check: None,
        }
    }
}

impl ProviderHealthMetrics {
    /// Fold one probe result into the counters
    pub fn record(&mut self, result: &HealthCheckResult) {
        let n = self.total_checks as f64;
        let elapsed_ms = result.response_time.as_secs_f64() * 1000.0;
        self.average_response_time_ms = (self.average_response_time_ms * n + elapsed_ms) / (n + 1.0);

        self.total_checks += 1;
        if result.is_healthy() {
            self.successful_checks += 1;
            self.consecutive_failures = 0;
        } else {
            self.failed_checks += 1;
            self.consecutive_failures = self.consecutive_failures.saturating_add(1);
        }
        self.uptime = self.successful_checks as f64 / self.total_checks as f64 * 100.0;
        self.last_check = Some(result.timestamp);
    }
}

/// Health snapshot of one provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    /// Provider name
    pub provider_name: String,
    /// Classification of the most recent probe (healthy before any probe)
    pub status: HealthState,
    /// Cumulative counters
    pub metrics: ProviderHealthMetrics,
    /// Most recent probe results, oldest first, at most 100
    pub history: Vec<HealthCheckResult>,
    /// Failure-policy snapshot
    pub circuit: CircuitBreakerMetrics,
}

impl HealthStatus {
    /// Whether the provider is currently considered healthy
    pub fn is_healthy(&self) -> bool {
        self.status == HealthState::Healthy
    }

    /// Most recent probe result
    pub fn last_result(&self) -> Option<&HealthCheckResult> {
        self.history.last()
    }
}
