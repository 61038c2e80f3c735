//! Domain Port Interfaces
//!
//! Boundary contracts between the domain and the outer layers. High-level
//! crates (application, infrastructure) depend on these traits; adapters in
//! `aegis-providers` implement them.
//!
//! ## Organization
//!
//! - **providers/** - The identity provider capability contract
//! - **infrastructure/** - Collaborators: repository, logger, metrics,
//!   security service, configuration and breach lookups

/// Collaborator ports
pub mod infrastructure;
/// Identity provider ports
pub mod providers;

pub use infrastructure::{
    AuthLogger, AuthMetrics, AuthMetricsSnapshot, AuthRepository, BreachedPasswordSource,
    ConfigProvider, ConfigProviderExt, ProviderCounters, SecurityService,
};
pub use providers::AuthProvider;
