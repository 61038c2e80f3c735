//! Configuration types module

pub mod app;
pub mod health;
pub mod logging;
pub mod orchestrator;
pub mod providers;
pub mod resilience;
pub mod security;
pub mod session;
pub mod validation;

// Re-export main types
pub use app::AppConfig;
pub use health::HealthConfig;
pub use logging::LoggingConfig;
pub use orchestrator::OrchestratorConfig;
pub use providers::ProviderEntry;
pub use resilience::ResilienceConfig;
pub use security::SecurityConfig;
pub use session::SessionConfig;
pub use validation::ValidationConfig;
