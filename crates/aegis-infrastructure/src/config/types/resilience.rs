//! Resilience configuration types

use crate::constants::*;
use serde::{Deserialize, Serialize};

/// Circuit breaker configuration applied to every provider
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResilienceConfig {
    /// Consecutive failures that open a circuit
    pub failure_threshold: u32,

    /// Cooldown before a trial call, in milliseconds
    pub recovery_timeout_ms: u64,

    /// Failure memory window, in milliseconds
    pub monitoring_period_ms: u64,

    /// Time a trial call may hold the half-open slot, in milliseconds
    pub expected_recovery_time_ms: u64,
}

impl Default for ResilienceConfig {
    fn default() -> Self {
        Self {
            failure_threshold: CIRCUIT_BREAKER_FAILURE_THRESHOLD,
            recovery_timeout_ms: CIRCUIT_BREAKER_RECOVERY_TIMEOUT_MS,
            monitoring_period_ms: CIRCUIT_BREAKER_MONITORING_PERIOD_MS,
            expected_recovery_time_ms: CIRCUIT_BREAKER_EXPECTED_RECOVERY_MS,
        }
    }
}
