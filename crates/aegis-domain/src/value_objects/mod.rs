//! Domain Value Objects
//!
//! Plain data carried between providers, the resilience layer and the
//! orchestrator. None of these types own behaviour beyond simple derived
//! queries (expiry checks, uptime arithmetic, result merging).
//!
//! ## Value Objects
//!
//! | Value Object | Description |
//! |--------------|-------------|
//! | [`AuthCredentials`] | Material submitted for authentication |
//! | [`AuthSession`] | Authenticated user, token and issuing provider |
//! | [`ProviderType`] | Tagged provider kind (OAuth, SAML, LDAP, ...) |
//! | [`SecurityContext`] | Request-scoped caller information |
//! | [`HealthCheckResult`] | Outcome of one provider health probe |
//! | [`HealthStatus`] | Health snapshot with metrics and bounded history |
//! | [`ValidationResult`] | Typed errors, warnings and suggestions from the validator |

/// Credentials, users, tokens, sessions and provider descriptors
pub mod auth;
/// Circuit breaker and provider health value objects
pub mod health;
/// Security context and security-service verdicts
pub mod security;
/// Validation results and batch items
pub mod validation;

pub use auth::{
    AuthCredentials, AuthSession, AuthToken, AuthUser, ProviderCapability,
    ProviderPerformanceMetrics, ProviderPriority, ProviderType, RegistrationOutcome,
    RegistrationRequest,
};
pub use health::{
    CircuitBreakerMetrics, CircuitState, HealthCheckResult, HealthState, HealthStatus,
    ProviderHealthMetrics,
};
pub use security::{HeaderValidation, RateLimitDecision, SecurityContext, SuspiciousActivityReport};
pub use validation::{
    ExecutionMode, ValidationIssue, ValidationIssueKind, ValidationItem, ValidationMetadata,
    ValidationResult, ValidationSeverity, ValidationTarget,
};
