//! Application Layer - Aegis
//!
//! Orchestrates authentication across pluggable identity providers.
//!
//! ## Architecture
//!
//! The application layer:
//! - Keeps the registry of providers with their priority and enablement
//! - Validates every input before any provider is contacted
//! - Drives the authentication pipeline through circuit breakers and
//!   fallback chains owned by the infrastructure layer
//!
//! ## Components
//!
//! - [`providers::ProviderManager`]: registration, best provider selection,
//!   failover, bulk initialize/shutdown and a manager-level health sweep
//! - [`validation::AuthValidator`]: named rules and rule groups with
//!   sequential, fail-fast and parallel execution
//! - [`use_cases::AuthOrchestrator`]: authenticate, sessions, sign out,
//!   registration and activation
//!
//! ## Dependencies
//!
//! This crate depends only on:
//! - `aegis-domain`: entities, value objects, error taxonomy and ports
//! - `aegis-infrastructure`: circuit breakers, health monitors, configuration

pub mod providers;
pub mod use_cases;
pub mod validation;

pub use providers::{ProviderManager, ProviderOptions};
pub use use_cases::{AuthOrchestrator, AuthOrchestratorDeps};
pub use validation::AuthValidator;
