//! Authentication event types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;

/// Event severity, ordered `Debug < Info < Warn < Error`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Diagnostic detail
    Debug,
    /// Normal activity
    Info,
    /// Degraded or suspicious activity
    Warn,
    /// Failures
    Error,
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "trace" | "debug" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            "warn" | "warning" => Ok(Self::Warn),
            "error" => Ok(Self::Error),
            other => Err(format!("unknown log level: {other}")),
        }
    }
}

/// What happened
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthEventKind {
    /// Authentication started
    LoginAttempt,
    /// Authentication succeeded
    LoginSuccess,
    /// Authentication failed
    LoginFailure,
    /// Session cleared by global sign out
    Logout,
    /// Session refreshed
    SessionRefreshed,
    /// Persisted session found expired
    SessionExpired,
    /// User registered
    Registration,
    /// Account activated
    Activation,
    /// A fallback provider served the request
    ProviderFailover,
    /// Provider health changed
    ProviderHealthChanged,
    /// Attempt blocked by the security service
    SecurityAlert,
    /// Attempt rate limited
    RateLimited,
    /// Input rejected by the validator
    ValidationFailed,
}

impl AuthEventKind {
    /// Whether events of this kind should carry a provider name
    pub fn requires_provider(&self) -> bool {
        matches!(
            self,
            Self::LoginSuccess | Self::ProviderFailover | Self::ProviderHealthChanged
        )
    }
}

/// A single authentication occurrence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthEvent {
    /// Event id
    pub id: String,
    /// What happened
    pub kind: AuthEventKind,
    /// Severity
    pub level: LogLevel,
    /// Human readable message
    pub message: String,
    /// Occurrence time
    pub timestamp: DateTime<Utc>,
    /// User involved, if known
    pub user_id: Option<String>,
    /// Provider involved, if any
    pub provider: Option<String>,
    /// Request correlation id
    pub request_id: Option<String>,
    /// Structured details
    #[serde(default)]
    pub details: HashMap<String, serde_json::Value>,
}

impl AuthEvent {
    /// Info-level event happening now
    pub fn new<S: Into<String>>(kind: AuthEventKind, message: S) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            kind,
            level: LogLevel::Info,
            message: message.into(),
            timestamp: Utc::now(),
            user_id: None,
            provider: None,
            request_id: None,
            details: HashMap::new(),
        }
    }

    /// Set the level
    #[must_use]
    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    /// Set the user
    #[must_use]
    pub fn with_user<S: Into<String>>(mut self, user_id: S) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    /// Set the provider
    #[must_use]
    pub fn with_provider<S: Into<String>>(mut self, provider: S) -> Self {
        self.provider = Some(provider.into());
        self
    }

    /// Set the request id
    #[must_use]
    pub fn with_request_id<S: Into<String>>(mut self, request_id: S) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    /// Add a detail
    #[must_use]
    pub fn with_detail<K: Into<String>>(mut self, key: K, value: serde_json::Value) -> Self {
        self.details.insert(key.into(), value);
        self
    }
}
