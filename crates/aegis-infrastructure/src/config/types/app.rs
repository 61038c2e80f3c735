//! Main application configuration

use super::{
    HealthConfig, LoggingConfig, OrchestratorConfig, ProviderEntry, ResilienceConfig,
    SecurityConfig, SessionConfig, ValidationConfig,
};
use serde::{Deserialize, Serialize};

/// Root configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Logging
    pub logging: LoggingConfig,
    /// Circuit breaker thresholds
    pub resilience: ResilienceConfig,
    /// Health probing
    pub health: HealthConfig,
    /// Input validation policy
    pub validation: ValidationConfig,
    /// Session lifetime
    pub session: SessionConfig,
    /// Rate limiting and suspicious activity
    pub security: SecurityConfig,
    /// Orchestrator behaviour
    pub orchestrator: OrchestratorConfig,
    /// Declared identity providers
    pub providers: Vec<ProviderEntry>,
}

impl AppConfig {
    /// Declared provider by name
    pub fn provider(&self, name: &str) -> Option<&ProviderEntry> {
        self.providers.iter().find(|p| p.name == name)
    }
}
