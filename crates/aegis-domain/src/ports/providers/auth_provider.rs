//! Identity Provider Port
//!
//! Every identity provider (OAuth, SAML, LDAP, token, local accounts, ...)
//! satisfies [`AuthProvider`]. Only identity, kind and `authenticate` are
//! required; every other capability has a default that either succeeds
//! trivially or returns the matching `*_NOT_SUPPORTED` code.
//!
//! ## Example
//!
//! ```ignore
//! use aegis_domain::ports::AuthProvider;
//!
//! struct Corporate;
//!
//! #[async_trait::async_trait]
//! impl AuthProvider for Corporate {
//!     fn name(&self) -> &str { "corporate" }
//!     fn provider_type(&self) -> ProviderType { ProviderType::Ldap }
//!     async fn authenticate(&self, c: &AuthCredentials) -> AuthResult<AuthSession> { ... }
//! }
//! ```

use crate::error::{AuthError, AuthErrorCode, AuthResult};
use crate::value_objects::{
    AuthCredentials, AuthSession, AuthUser, HealthCheckResult, ProviderCapability,
    ProviderPerformanceMetrics, ProviderType, RegistrationOutcome, RegistrationRequest,
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Identity provider capability contract
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Unique provider name
    fn name(&self) -> &str;

    /// Provider kind
    fn provider_type(&self) -> ProviderType;

    /// Authenticate credentials and produce a session
    async fn authenticate(&self, credentials: &AuthCredentials) -> AuthResult<AuthSession>;

    /// Whether the provider currently considers its session state valid
    ///
    /// Used as the lightweight health probe.
    async fn validate_session(&self) -> AuthResult<bool> {
        Ok(true)
    }

    /// Exchange a refresh token for a new session
    async fn refresh_token(&self, _refresh_token: &str) -> AuthResult<AuthSession> {
        Err(AuthError::not_supported(
            AuthErrorCode::RefreshNotSupported,
            self.name(),
            "token refresh",
        ))
    }

    /// Apply provider-specific settings
    async fn configure(&self, _settings: &HashMap<String, serde_json::Value>) -> AuthResult<()> {
        Ok(())
    }

    /// Advertised capabilities
    fn capabilities(&self) -> Vec<ProviderCapability> {
        vec![ProviderCapability::Authenticate]
    }

    /// Whether a capability is advertised
    fn supports(&self, capability: ProviderCapability) -> bool {
        self.capabilities().contains(&capability)
    }

    /// Prepare the provider for use
    async fn initialize(&self) -> AuthResult<()> {
        Ok(())
    }

    /// Self-reported health probe
    async fn health_check(&self) -> HealthCheckResult {
        let started = Instant::now();
        let outcome = self.validate_session().await;
        let elapsed = started.elapsed().max(Duration::from_millis(1));
        match outcome {
            Ok(true) => HealthCheckResult::healthy(self.name(), elapsed),
            Ok(false) => HealthCheckResult::unhealthy(self.name(), elapsed, "session invalid"),
            Err(e) => HealthCheckResult::unhealthy(self.name(), elapsed, e.message),
        }
    }

    /// Request counters kept by the provider itself
    fn performance_metrics(&self) -> ProviderPerformanceMetrics {
        ProviderPerformanceMetrics::default()
    }

    /// Reset the provider's own counters
    fn reset_performance_metrics(&self) {}

    /// Quick health flag
    async fn is_healthy(&self) -> bool {
        matches!(self.validate_session().await, Ok(true))
    }

    /// Whether `initialize` has completed
    fn is_initialized(&self) -> bool {
        true
    }

    /// Time since initialization
    fn uptime(&self) -> Duration {
        Duration::ZERO
    }

    /// Release resources, within `timeout`
    async fn shutdown(&self, _timeout: Duration) -> AuthResult<()> {
        Ok(())
    }

    /// Self-register a user
    async fn register(&self, _request: &RegistrationRequest) -> AuthResult<RegistrationOutcome> {
        Err(AuthError::not_supported(
            AuthErrorCode::RegistrationNotSupported,
            self.name(),
            "user registration",
        ))
    }

    /// Activate an account with a code
    async fn activate(&self, _identifier: &str, _code: &str) -> AuthResult<AuthUser> {
        Err(AuthError::not_supported(
            AuthErrorCode::ActivationNotSupported,
            self.name(),
            "account activation",
        ))
    }

    /// Provider-side sign out
    async fn signout(&self) -> AuthResult<()> {
        Err(AuthError::not_supported(
            AuthErrorCode::SignoutNotSupported,
            self.name(),
            "sign out",
        ))
    }

    /// Issue a fresh activation code
    async fn resend_activation_code(&self, _identifier: &str) -> AuthResult<String> {
        Err(AuthError::not_supported(
            AuthErrorCode::ResendNotSupported,
            self.name(),
            "activation code resend",
        ))
    }
}
