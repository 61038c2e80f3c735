//! Security configuration types

use crate::constants::*;
use serde::{Deserialize, Serialize};

/// Rate limiting and suspicious activity configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Enable rate limiting
    pub rate_limit_enabled: bool,
    /// Rate limit window, in seconds
    pub rate_limit_window_secs: u64,
    /// Attempts allowed per window
    pub rate_limit_max_attempts: u32,
    /// Failures after which a key is considered suspicious
    pub suspicious_failure_threshold: u32,
    /// Risk score (0-100) at which an attempt is blocked
    pub block_risk_score: u8,
    /// Headers that must be present on requests
    pub required_headers: Vec<String>,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            rate_limit_enabled: true,
            rate_limit_window_secs: RATE_LIMIT_WINDOW_SECS,
            rate_limit_max_attempts: RATE_LIMIT_MAX_ATTEMPTS,
            suspicious_failure_threshold: SUSPICIOUS_FAILURE_THRESHOLD,
            block_risk_score: SUSPICIOUS_BLOCK_SCORE,
            required_headers: vec!["user-agent".to_string()],
        }
    }
}
