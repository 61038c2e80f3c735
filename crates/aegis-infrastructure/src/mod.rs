//! # Infrastructure Layer
//!
//! Cross-cutting technical concerns supporting the application layer.
//!
//! ## Module Categories
//!
//! ### Resilience
//! | Module | Description |
//! |--------|-------------|
//! | [`resilience`] | Per-provider circuit breaker |
//! | [`health`] | Provider health monitors, fallback execution and reports |
//!
//! ### Configuration
//! | Module | Description |
//! |--------|-------------|
//! | [`config`] | Figment-based TOML/environment configuration |
//! | [`constants`] | Centralized configuration defaults |
//!
//! ### Observability
//! | Module | Description |
//! |--------|-------------|
//! | [`logging`] | Structured logging with tracing |

pub mod config;
pub mod constants;
pub mod error_ext;
pub mod health;
pub mod logging;
pub mod resilience;
pub mod utils;

// Re-export commonly used types
pub use error_ext::ErrorContext;
pub use health::{HealthCheckManager, ProviderHealthConfig, ProviderHealthMonitor};
pub use resilience::{CircuitBreaker, CircuitBreakerConfig};
pub use utils::TimedOperation;
