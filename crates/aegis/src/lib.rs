//! # Aegis
//!
//! Multi-provider authentication with priority-based provider selection,
//! per-provider circuit breakers, health monitoring, sequential failover and
//! rule-based credential validation.
//!
//! This crate is the public facade: it re-exports every layer and wires them
//! together from an [`AppConfig`](infrastructure::config::AppConfig).
//!
//! ## Example
//!
//! ```ignore
//! use aegis::bootstrap::{init_app, load_config};
//! use aegis::domain::AuthCredentials;
//!
//! let config = load_config(None)?;
//! let stack = init_app(&config).await?;
//! stack.orchestrator.initialize().await?;
//! let session = stack
//!     .orchestrator
//!     .authenticate(&AuthCredentials::password("alice", "Corr3ct-horse"), None)
//!     .await?;
//! ```
//!
//! ## Architecture
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`domain`] | Value objects, error taxonomy and ports |
//! | [`application`] | Provider manager, validator and orchestrator |
//! | [`infrastructure`] | Circuit breakers, health monitoring, configuration, logging |
//! | [`providers`] | Identity providers and collaborator adapters |
//! | [`bootstrap`] | Builds the full stack from configuration |
//! | [`cli`] | Command line interface of the `aegis` binary |

/// Domain layer - value objects, errors and ports
///
/// Re-exports from the domain crate for convenience
pub mod domain {
    pub use aegis_domain::*;
}

/// Application layer - provider management, validation, orchestration
///
/// Re-exports from the application crate for convenience
pub mod application {
    pub use aegis_application::*;
}

/// Infrastructure layer - resilience, health, config and logging
///
/// Re-exports from the infrastructure crate for convenience
pub mod infrastructure {
    pub use aegis_infrastructure::*;
}

/// Port adapters and reference identity providers
///
/// Re-exports from the providers crate for convenience
pub mod providers {
    pub use aegis_providers::*;
}

pub mod bootstrap;
pub mod cli;

// Re-export commonly used domain types at the crate root
pub use domain::*;

pub use application::{AuthOrchestrator, AuthValidator, ProviderManager};
pub use bootstrap::{AuthStack, init_app, load_config};
