//! Collaborator Ports
//!
//! | Port | Description |
//! |------|-------------|
//! | [`AuthRepository`] | Session, refresh token and pending-user persistence |
//! | [`AuthLogger`] | Authentication event sink |
//! | [`AuthMetrics`] | Attempt/success/failure counters |
//! | [`SecurityService`] | Rate limiting, suspicious activity and header checks |
//! | [`BreachedPasswordSource`] | Known-breached password lookup |
//! | [`ConfigProvider`] | Keyed configuration reads |

/// Configuration port
pub mod config;
/// Event logger port
pub mod logger;
/// Metrics port
pub mod metrics;
/// Repository port
pub mod repository;
/// Security service ports
pub mod security;

pub use config::{ConfigProvider, ConfigProviderExt};
pub use logger::AuthLogger;
pub use metrics::{AuthMetrics, AuthMetricsSnapshot, ProviderCounters};
pub use repository::AuthRepository;
pub use security::{BreachedPasswordSource, SecurityService};
