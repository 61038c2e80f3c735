//! Keyed configuration access
//!
//! Implements the domain [`ConfigProvider`] port over a loaded [`AppConfig`].

use crate::config::AppConfig;
use crate::error_ext::ErrorContext;
use aegis_domain::error::Result;
use aegis_domain::ports::ConfigProvider;
use serde_json::Value;

/// [`ConfigProvider`] backed by the serialized configuration tree
///
/// ```ignore
/// use aegis_domain::ports::ConfigProviderExt;
///
/// let provider = FigmentConfigProvider::new(&config)?;
/// let ttl: Option<i64> = provider.get("session.ttl_secs");
/// let first: Option<String> = provider.get("providers.0.name");
/// ```
#[derive(Debug, Clone)]
pub struct FigmentConfigProvider {
    tree: Value,
    config: AppConfig,
}

impl FigmentConfigProvider {
    /// Snapshot `config` for keyed reads
    pub fn new(config: &AppConfig) -> Result<Self> {
        let tree = serde_json::to_value(config).context("Failed to serialize configuration")?;
        Ok(Self {
            tree,
            config: config.clone(),
        })
    }

    /// Typed configuration this provider was built from
    pub fn config(&self) -> &AppConfig {
        &self.config
    }
}

impl ConfigProvider for FigmentConfigProvider {
    fn get_value(&self, key: &str) -> Option<Value> {
        key.split('.')
            .filter(|segment| !segment.is_empty())
            .try_fold(&self.tree, |node, segment| match node {
                Value::Object(map) => map.get(segment),
                Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
                _ => None,
            })
            .filter(|value| !value.is_null())
            .cloned()
    }
}
