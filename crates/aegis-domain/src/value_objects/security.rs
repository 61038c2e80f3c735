//! Security context and verdicts

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// Request-scoped information about the caller
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SecurityContext {
    /// Caller IP address
    pub ip_address: Option<String>,
    /// Caller user agent
    pub user_agent: Option<String>,
    /// Request correlation id
    pub request_id: String,
    /// Client session id, if any
    pub session_id: Option<String>,
    /// Request time
    pub timestamp: DateTime<Utc>,
    /// Request headers (lowercase names)
    #[serde(default)]
    pub headers: HashMap<String, String>,
    /// Free-form metadata
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl Default for SecurityContext {
    fn default() -> Self {
        Self::new()
    }
}

impl SecurityContext {
    /// Empty context with a fresh request id
    pub fn new() -> Self {
        Self {
            ip_address: None,
            user_agent: None,
            request_id: uuid::Uuid::new_v4().to_string(),
            session_id: None,
            timestamp: Utc::now(),
            headers: HashMap::new(),
            metadata: HashMap::new(),
        }
    }

    /// Set the IP address
    #[must_use]
    pub fn with_ip<S: Into<String>>(mut self, ip: S) -> Self {
        self.ip_address = Some(ip.into());
        self
    }

    /// Set the user agent
    #[must_use]
    pub fn with_user_agent<S: Into<String>>(mut self, ua: S) -> Self {
        self.user_agent = Some(ua.into());
        self
    }

    /// Set the session id
    #[must_use]
    pub fn with_session_id<S: Into<String>>(mut self, id: S) -> Self {
        self.session_id = Some(id.into());
        self
    }

    /// Add a header; the name is lowercased
    #[must_use]
    pub fn with_header<K: AsRef<str>, V: Into<String>>(mut self, name: K, value: V) -> Self {
        self.headers
            .insert(name.as_ref().to_lowercase(), value.into());
        self
    }

    /// Key used for rate limiting: the IP address when known, else `fallback`
    pub fn rate_limit_key(&self, fallback: &str) -> String {
        match &self.ip_address {
            Some(ip) => format!("ip:{ip}"),
            None => format!("user:{fallback}"),
        }
    }
}

/// Suspicious activity verdict
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SuspiciousActivityReport {
    /// Whether anything suspicious was found
    pub suspicious: bool,
    /// Accumulated risk score, 0 to 100
    pub risk_score: u8,
    /// Human readable reasons
    pub reasons: Vec<String>,
    /// Whether the attempt must be blocked
    pub blocked: bool,
}

/// Rate limit verdict
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RateLimitDecision {
    /// Whether the attempt may proceed
    pub allowed: bool,
    /// Attempts left in the current window
    pub remaining: u32,
    /// Time until the next attempt is allowed, when blocked
    pub retry_after: Option<Duration>,
}

impl RateLimitDecision {
    /// Allowed with `remaining` attempts left
    pub fn allow(remaining: u32) -> Self {
        Self {
            allowed: true,
            remaining,
            retry_after: None,
        }
    }

    /// Blocked until `retry_after` elapses
    pub fn deny(retry_after: Duration) -> Self {
        Self {
            allowed: false,
            remaining: 0,
            retry_after: Some(retry_after),
        }
    }
}

/// Security header validation outcome
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct HeaderValidation {
    /// No required header missing and no issue found
    pub valid: bool,
    /// Required headers that were absent
    pub missing: Vec<String>,
    /// Problems with present headers
    pub issues: Vec<String>,
}
