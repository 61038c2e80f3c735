//! In-memory authentication metrics
//!
//! Keeps queryable counters for [`AuthMetrics::snapshot`] and mirrors every
//! update to the `metrics` facade so an installed exporter sees them too.

use crate::constants::{METRIC_ATTEMPTS, METRIC_LATENCY, METRIC_OUTCOMES};
use aegis_domain::error::AuthErrorCode;
use aegis_domain::ports::{AuthMetrics, AuthMetricsSnapshot, ProviderCounters};
use metrics::{counter, histogram};
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

#[derive(Debug, Default)]
struct Counters {
    total_attempts: u64,
    successes: u64,
    failures: u64,
    total_latency_ms: f64,
    per_provider: HashMap<String, ProviderCounters>,
    failure_codes: HashMap<String, u64>,
}

/// [`AuthMetrics`] kept in process memory
#[derive(Debug, Default)]
pub struct InMemoryAuthMetrics {
    counters: Mutex<Counters>,
}

impl InMemoryAuthMetrics {
    /// Zeroed metrics
    pub fn new() -> Self {
        Self::default()
    }

    /// Zero every counter
    pub fn reset(&self) {
        *self.counters.lock().unwrap_or_else(PoisonError::into_inner) = Counters::default();
    }
}

impl AuthMetrics for InMemoryAuthMetrics {
    fn record_attempt(&self, provider: &str) {
        {
            let mut counters = self.counters.lock().unwrap_or_else(PoisonError::into_inner);
            counters.total_attempts += 1;
            counters
                .per_provider
                .entry(provider.to_string())
                .or_default()
                .attempts += 1;
        }
        counter!(METRIC_ATTEMPTS, "provider" => provider.to_string()).increment(1);
    }

    fn record_success(&self, provider: &str, elapsed: Duration) {
        let elapsed_ms = elapsed.as_secs_f64() * 1000.0;
        {
            let mut counters = self.counters.lock().unwrap_or_else(PoisonError::into_inner);
            counters.successes += 1;
            counters.total_latency_ms += elapsed_ms;
            counters
                .per_provider
                .entry(provider.to_string())
                .or_default()
                .successes += 1;
        }
        counter!(METRIC_OUTCOMES, "provider" => provider.to_string(), "outcome" => "success")
            .increment(1);
        histogram!(METRIC_LATENCY, "provider" => provider.to_string()).record(elapsed.as_secs_f64());
    }

    fn record_failure(&self, provider: &str, code: &AuthErrorCode, elapsed: Duration) {
        let elapsed_ms = elapsed.as_secs_f64() * 1000.0;
        {
            let mut counters = self.counters.lock().unwrap_or_else(PoisonError::into_inner);
            counters.failures += 1;
            counters.total_latency_ms += elapsed_ms;
            counters
                .per_provider
                .entry(provider.to_string())
                .or_default()
                .failures += 1;
            *counters
                .failure_codes
                .entry(code.as_str().to_string())
                .or_default() += 1;
        }
        counter!(
            METRIC_OUTCOMES,
            "provider" => provider.to_string(),
            "outcome" => "failure",
            "code" => code.as_str()
        )
        .increment(1);
        histogram!(METRIC_LATENCY, "provider" => provider.to_string()).record(elapsed.as_secs_f64());
    }

    fn snapshot(&self) -> AuthMetricsSnapshot {
        let counters = self.counters.lock().unwrap_or_else(PoisonError::into_inner);
        let completed = counters.successes + counters.failures;
        let (success_rate, average_latency_ms) = if completed == 0 {
            (0.0, 0.0)
        } else {
            (
                counters.successes as f64 / completed as f64 * 100.0,
                counters.total_latency_ms / completed as f64,
            )
        };
        AuthMetricsSnapshot {
            total_attempts: counters.total_attempts,
            successes: counters.successes,
            failures: counters.failures,
            success_rate,
            average_latency_ms,
            per_provider: counters.per_provider.clone(),
            failure_codes: counters.failure_codes.clone(),
        }
    }
}
