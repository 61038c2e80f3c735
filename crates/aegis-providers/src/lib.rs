//! # Aegis - Provider Implementations
//!
//! Adapters implementing the ports defined in `aegis-domain`.
//!
//! ## Provider Categories
//!
//! | Category | Port | Implementations |
//! |----------|------|-----------------|
//! | Identity | `AuthProvider` | Null, Directory (LDAP-like), Local accounts |
//! | Repository | `AuthRepository` | InMemory |
//! | Event log | `AuthLogger` | Tracing |
//! | Metrics | `AuthMetrics` | InMemory (mirrored to the `metrics` facade) |
//! | Security | `SecurityService` | Default (rate limit, heuristics, headers) |
//! | Breach lookup | `BreachedPasswordSource` | InMemory |
//!
//! ## Usage
//!
//! ```ignore
//! use aegis_providers::auth::DirectoryAuthProvider;
//! use aegis_providers::repository::InMemoryAuthRepository;
//!
//! let directory = DirectoryAuthProvider::new("corporate");
//! directory.add_user("alice", "Corr3ct-horse", Some("alice@example.com"));
//! ```

// Re-export aegis-domain types commonly used with providers
pub use aegis_domain::error::{AuthError, AuthErrorCode, AuthResult, Error, Result};
pub use aegis_domain::ports::{
    AuthLogger, AuthMetrics, AuthProvider, AuthRepository, BreachedPasswordSource,
    SecurityService,
};

/// Provider-specific constants
pub mod constants;

/// Shared helpers (hashing, token generation)
pub mod utils;

/// Identity provider implementations
pub mod auth;

/// Repository implementations
pub mod repository;

/// Event logger implementations
pub mod logging;

/// Metrics implementations
pub mod metrics;

/// Security service implementations
pub mod security;

pub use auth::{DirectoryAuthProvider, LocalAccountProvider, NullAuthProvider};
pub use logging::TracingAuthLogger;
pub use metrics::InMemoryAuthMetrics;
pub use repository::InMemoryAuthRepository;
pub use security::{DefaultSecurityService, InMemoryBreachedPasswordSource, SecurityPolicy};
