//! Provider declaration types

use aegis_domain::value_objects::{ProviderPriority, ProviderType};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One declared identity provider
///
/// ```toml
/// [[providers]]
/// name = "corporate-ldap"
/// kind = "ldap"
/// priority = "high"
/// fallbacks = ["local"]
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderEntry {
    /// Unique provider name
    pub name: String,
    /// Provider kind
    pub kind: ProviderType,
    /// Selection priority
    #[serde(default)]
    pub priority: ProviderPriority,
    /// Enabled at registration
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Ordered fallback provider names
    #[serde(default)]
    pub fallbacks: Vec<String>,
    /// Probe interval override, in milliseconds
    #[serde(default)]
    pub health_check_interval_ms: Option<u64>,
    /// Probe retries override
    #[serde(default)]
    pub max_retries: Option<u32>,
    /// Free-form metadata
    #[serde(default)]
    pub metadata: HashMap<String, String>,
    /// Provider-specific settings passed to `configure`
    #[serde(default)]
    pub settings: HashMap<String, serde_json::Value>,
}

fn default_enabled() -> bool {
    true
}
