//! Error handling types
//!
//! Two error types live here:
//!
//! - [`Error`]: infrastructure-level failures (configuration, I/O, JSON,
//!   internal faults). These stay inside the system.
//! - [`AuthError`]: the typed, user-visible failure carried by every
//!   [`AuthResult`]. It always has a stable [`AuthErrorCode`] and a message
//!   that is safe to show to the session layer.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Result type alias for operations that can fail
pub type Result<T> = std::result::Result<T, Error>;

/// Result of an authentication-facing operation
pub type AuthResult<T> = std::result::Result<T, AuthError>;

/// Main infrastructure error type for Aegis
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error (simple form)
    #[error("I/O error: {source}")]
    IoSimple {
        /// The underlying I/O error
        #[from]
        source: std::io::Error,
    },

    /// I/O operation error (with context)
    #[error("I/O error: {message}")]
    Io {
        /// Description of the I/O error
        message: String,
        /// Optional source error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// JSON parsing or serialization error
    #[error("JSON parsing error: {source}")]
    Json {
        /// The underlying JSON error
        #[from]
        source: serde_json::Error,
    },

    /// Resource not found error
    #[error("Not found: {resource}")]
    NotFound {
        /// The resource that was not found
        resource: String,
    },

    /// Invalid argument provided to a function
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// Description of the invalid argument
        message: String,
    },

    /// Configuration-related error
    #[error("Configuration error: {message}")]
    Configuration {
        /// Description of the configuration error
        message: String,
        /// Optional source error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Storage error raised by a repository implementation
    #[error("Storage error: {message}")]
    Storage {
        /// Description of the storage error
        message: String,
    },

    /// Internal system error
    #[error("Internal error: {message}")]
    Internal {
        /// Description of the internal error
        message: String,
    },

    /// Infrastructure operation error
    #[error("Infrastructure error: {message}")]
    Infrastructure {
        /// Description of the infrastructure error
        message: String,
        /// Optional source error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

// Basic error creation methods
impl Error {
    /// Create a not found error
    pub fn not_found<S: Into<String>>(resource: S) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    /// Create an invalid argument error
    pub fn invalid_argument<S: Into<String>>(message: S) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Create a storage error
    pub fn storage<S: Into<String>>(message: S) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

// I/O error creation methods
impl Error {
    /// Create an I/O error
    pub fn io<S: Into<String>>(message: S) -> Self {
        Self::Io {
            message: message.into(),
            source: None,
        }
    }

    /// Create an I/O error with source
    pub fn io_with_source<S: Into<String>, E: std::error::Error + Send + Sync + 'static>(
        message: S,
        source: E,
    ) -> Self {
        Self::Io {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

// Configuration error creation methods
impl Error {
    /// Create a configuration error
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
            source: None,
        }
    }

    /// Create a configuration error with source
    pub fn configuration_with_source<
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    >(
        message: S,
        source: E,
    ) -> Self {
        Self::Configuration {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

// Infrastructure error creation methods
impl Error {
    /// Create an infrastructure error
    pub fn infrastructure<S: Into<String>>(message: S) -> Self {
        Self::Infrastructure {
            message: message.into(),
            source: None,
        }
    }

    /// Create an infrastructure error with source
    pub fn infrastructure_with_source<
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    >(
        message: S,
        source: E,
    ) -> Self {
        Self::Infrastructure {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Self::Internal {
            message: s.to_string(),
        }
    }
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Self::Internal { message: s }
    }
}

// ============================================================================
// Authentication error taxonomy
// ============================================================================

/// Stable failure codes surfaced to callers of the authentication API
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuthErrorCode {
    /// Input failed validation before any provider was contacted
    ValidationError,
    /// Provider rejected the credentials
    CredentialsInvalid,
    /// Credentials were missing required material
    MissingCredentials,
    /// Circuit breaker short-circuited the call
    CircuitBreakerOpen,
    /// Primary provider and every fallback failed
    AllProvidersFailed,
    /// No provider with the requested name or type is registered/enabled
    ProviderNotFound,
    /// Provider type is not supported by this deployment
    UnsupportedProvider,
    /// A provider with the same name is already registered
    ProviderAlreadyRegistered,
    /// Provider failed in a way it did not classify further
    ProviderError,
    /// Provider type cannot self-register users
    RegistrationNotSupported,
    /// Provider type cannot activate accounts
    ActivationNotSupported,
    /// Provider type cannot sign out
    SignoutNotSupported,
    /// Provider type cannot resend activation codes
    ResendNotSupported,
    /// Provider type cannot refresh tokens
    RefreshNotSupported,
    /// No persisted session exists
    SessionNotFound,
    /// Persisted session has expired
    SessionExpired,
    /// Orchestrator has not completed initialization
    NotInitialized,
    /// Caller exceeded the attempt budget
    RateLimited,
    /// Attempt was blocked by the security service
    SuspiciousActivity,
    /// Operation exceeded its time budget
    Timeout,
    /// Referenced user does not exist
    UserNotFound,
    /// Activation code did not match
    InvalidActivationCode,
    /// Internal failure; details are logged, not surfaced
    InternalError,
}

impl AuthErrorCode {
    /// Stable wire representation of the code
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ValidationError => "VALIDATION_ERROR",
            Self::CredentialsInvalid => "CREDENTIALS_INVALID",
            Self::MissingCredentials => "MISSING_CREDENTIALS",
            Self::CircuitBreakerOpen => "CIRCUIT_BREAKER_OPEN",
            Self::AllProvidersFailed => "ALL_PROVIDERS_FAILED",
            Self::ProviderNotFound => "PROVIDER_NOT_FOUND",
            Self::UnsupportedProvider => "UNSUPPORTED_PROVIDER",
            Self::ProviderAlreadyRegistered => "PROVIDER_ALREADY_REGISTERED",
            Self::ProviderError => "PROVIDER_ERROR",
            Self::RegistrationNotSupported => "REGISTRATION_NOT_SUPPORTED",
            Self::ActivationNotSupported => "ACTIVATION_NOT_SUPPORTED",
            Self::SignoutNotSupported => "SIGNOUT_NOT_SUPPORTED",
            Self::ResendNotSupported => "RESEND_NOT_SUPPORTED",
            Self::RefreshNotSupported => "REFRESH_NOT_SUPPORTED",
            Self::SessionNotFound => "SESSION_NOT_FOUND",
            Self::SessionExpired => "SESSION_EXPIRED",
            Self::NotInitialized => "NOT_INITIALIZED",
            Self::RateLimited => "RATE_LIMITED",
            Self::SuspiciousActivity => "SUSPICIOUS_ACTIVITY",
            Self::Timeout => "TIMEOUT",
            Self::UserNotFound => "USER_NOT_FOUND",
            Self::InvalidActivationCode => "INVALID_ACTIVATION_CODE",
            Self::InternalError => "INTERNAL_ERROR",
        }
    }

    /// Whether the failure indicates the provider itself misbehaved
    ///
    /// Caller-caused failures (bad input, wrong password, unsupported
    /// operation, throttling) prove the provider answered and do not count
    /// against its circuit breaker.
    pub fn is_provider_fault(&self) -> bool {
        !matches!(
            self,
            Self::ValidationError
                | Self::CredentialsInvalid
                | Self::MissingCredentials
                | Self::UserNotFound
                | Self::InvalidActivationCode
                | Self::RateLimited
                | Self::SuspiciousActivity
                | Self::SessionNotFound
                | Self::SessionExpired
        ) && !self.is_not_supported()
    }

    /// Whether this code means the operation is not available for the provider type
    pub fn is_not_supported(&self) -> bool {
        matches!(
            self,
            Self::RegistrationNotSupported
                | Self::ActivationNotSupported
                | Self::SignoutNotSupported
                | Self::ResendNotSupported
                | Self::RefreshNotSupported
        )
    }
}

impl std::fmt::Display for AuthErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Typed authentication failure
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[error("{code}: {message}")]
pub struct AuthError {
    /// Stable failure code
    pub code: AuthErrorCode,
    /// Human readable message, safe to surface
    pub message: String,
    /// Structured details (provider names, attempted chain, ...)
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub details: HashMap<String, serde_json::Value>,
}

impl AuthError {
    /// Create an error with a code and message
    pub fn new<S: Into<String>>(code: AuthErrorCode, message: S) -> Self {
        Self {
            code,
            message: message.into(),
            details: HashMap::new(),
        }
    }

    /// Attach a structured detail
    pub fn with_detail<K: Into<String>>(mut self, key: K, value: serde_json::Value) -> Self {
        self.details.insert(key.into(), value);
        self
    }

    /// Input validation failure
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::new(AuthErrorCode::ValidationError, message)
    }

    /// Provider rejected credentials
    pub fn credentials_invalid() -> Self {
        Self::new(AuthErrorCode::CredentialsInvalid, "Invalid credentials")
    }

    /// Circuit breaker short-circuited the call
    pub fn circuit_open<S: AsRef<str>>(provider: S) -> Self {
        Self::new(
            AuthErrorCode::CircuitBreakerOpen,
            format!("Circuit breaker is open for provider {}", provider.as_ref()),
        )
        .with_detail("provider", serde_json::json!(provider.as_ref()))
    }

    /// No provider with the given name/type
    pub fn provider_not_found<S: Into<String>>(message: S) -> Self {
        Self::new(AuthErrorCode::ProviderNotFound, message)
    }

    /// Operation not supported for a provider type
    pub fn not_supported<S: AsRef<str>>(code: AuthErrorCode, provider: S, operation: &str) -> Self {
        Self::new(
            code,
            format!(
                "Provider {} does not support {}",
                provider.as_ref(),
                operation
            ),
        )
    }

    /// Operation timed out
    pub fn timeout<S: Into<String>>(message: S) -> Self {
        Self::new(AuthErrorCode::Timeout, message)
    }

    /// Generic internal failure with a fixed, non-leaking message
    pub fn internal() -> Self {
        Self::new(AuthErrorCode::InternalError, "An internal error occurred")
    }
}

/// Internal errors never leak their raw text across the authentication boundary
impl From<Error> for AuthError {
    fn from(_: Error) -> Self {
        Self::internal()
    }
}
