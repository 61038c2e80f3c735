//! Orchestrator configuration types

use crate::constants::{PROVIDER_INIT_TIMEOUT_MS, PROVIDER_SHUTDOWN_TIMEOUT_MS};
use serde::{Deserialize, Serialize};

/// Orchestrator behaviour
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OrchestratorConfig {
    /// Walk the fallback chain when the selected provider fails
    pub enable_fallback: bool,
    /// Run the manager-level health sweep after initialization
    pub enable_health_monitoring: bool,
    /// Per-provider initialization budget, in milliseconds
    pub init_timeout_ms: u64,
    /// Per-provider shutdown budget, in milliseconds
    pub shutdown_timeout_ms: u64,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            enable_fallback: true,
            enable_health_monitoring: true,
            init_timeout_ms: PROVIDER_INIT_TIMEOUT_MS,
            shutdown_timeout_ms: PROVIDER_SHUTDOWN_TIMEOUT_MS,
        }
    }
}
