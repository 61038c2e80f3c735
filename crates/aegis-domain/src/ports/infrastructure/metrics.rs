//! Metrics Port

use crate::error::AuthErrorCode;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// Per-provider counters
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProviderCounters {
    /// Attempts routed to the provider
    pub attempts: u64,
    /// Successful attempts
    pub successes: u64,
    /// Failed attempts
    pub failures: u64,
}

/// Point-in-time metrics snapshot
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuthMetricsSnapshot {
    /// Authentication attempts
    pub total_attempts: u64,
    /// Successful attempts
    pub successes: u64,
    /// Failed attempts
    pub failures: u64,
    /// `successes / (successes + failures) * 100`, 0 with no outcomes
    pub success_rate: f64,
    /// Mean latency of completed attempts in milliseconds
    pub average_latency_ms: f64,
    /// Counters by provider name
    pub per_provider: HashMap<String, ProviderCounters>,
    /// Failures by error code
    pub failure_codes: HashMap<String, u64>,
}

/// Authentication counters
pub trait AuthMetrics: Send + Sync {
    /// An attempt started against `provider`
    fn record_attempt(&self, provider: &str);

    /// An attempt against `provider` succeeded
    fn record_success(&self, provider: &str, elapsed: Duration);

    /// An attempt against `provider` failed with `code`
    fn record_failure(&self, provider: &str, code: &AuthErrorCode, elapsed: Duration);

    /// Current counters
    fn snapshot(&self) -> AuthMetricsSnapshot;
}
