//! Session configuration types

use crate::constants::{SESSION_REFRESH_WINDOW_SECS, SESSION_TTL_SECS};
use serde::{Deserialize, Serialize};

/// Session lifetime configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Lifetime of issued sessions, in seconds
    pub ttl_secs: i64,
    /// Refresh the current session when it expires within this many seconds
    pub refresh_window_secs: i64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ttl_secs: SESSION_TTL_SECS,
            refresh_window_secs: SESSION_REFRESH_WINDOW_SECS,
        }
    }
}
