//! Health check configuration types

use crate::constants::*;
use serde::{Deserialize, Serialize};

/// Health probing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthConfig {
    /// Per-provider probe interval, in milliseconds
    pub check_interval_ms: u64,

    /// Probe timeout, in milliseconds
    pub timeout_ms: u64,

    /// Probe retries after the first attempt
    pub retries: u32,

    /// Lower bound for reported probe durations, in milliseconds
    pub min_response_time_ms: Option<u64>,

    /// Manager-level sweep interval, in milliseconds
    pub manager_interval_ms: u64,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            check_interval_ms: HEALTH_CHECK_INTERVAL_MS,
            timeout_ms: HEALTH_CHECK_TIMEOUT_MS,
            retries: HEALTH_CHECK_RETRIES,
            min_response_time_ms: Some(HEALTH_CHECK_MIN_RESPONSE_TIME_MS),
            manager_interval_ms: MANAGER_HEALTH_INTERVAL_MS,
        }
    }
}
