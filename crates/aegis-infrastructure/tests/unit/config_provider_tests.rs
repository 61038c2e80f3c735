//! Keyed configuration access tests

use aegis_domain::ports::{ConfigProvider, ConfigProviderExt};
use aegis_domain::{ProviderType, ProviderPriority};
use aegis_infrastructure::config::{AppConfig, FigmentConfigProvider, ProviderEntry};
use std::collections::HashMap;

fn config_with_provider() -> AppConfig {
    let mut config = AppConfig::default();
    config.providers.push(ProviderEntry {
        name: "corporate".to_string(),
        kind: ProviderType::Ldap,
        priority: ProviderPriority::Critical,
        enabled: true,
        fallbacks: Vec::new(),
        health_check_interval_ms: Some(15_000),
        max_retries: None,
        metadata: HashMap::new(),
        settings: HashMap::new(),
    });
    config
}

#[test]
fn test_dotted_keys_resolve_nested_values() {
    let provider = FigmentConfigProvider::new(&config_with_provider()).unwrap();

    let ttl: Option<i64> = provider.get("session.ttl_secs");
    assert_eq!(ttl, Some(3600));

    let retries: Option<u32> = provider.get("health.retries");
    assert_eq!(retries, Some(2));

    let name: Option<String> = provider.get("providers.0.name");
    assert_eq!(name.as_deref(), Some("corporate"));

    let kind: Option<ProviderType> = provider.get("providers.0.kind");
    assert_eq!(kind, Some(ProviderType::Ldap));
}

#[test]
fn test_missing_and_null_keys_are_absent() {
    let provider = FigmentConfigProvider::new(&config_with_provider()).unwrap();

    assert!(provider.get_value("session.nope").is_none());
    assert!(provider.get_value("providers.7.name").is_none());
    assert!(provider.get_value("providers.0.max_retries").is_none());
    assert!(provider.get_value("logging.file_output").is_none());
}

#[test]
fn test_type_mismatch_yields_none() {
    let provider = FigmentConfigProvider::new(&AppConfig::default()).unwrap();
    let level: Option<u64> = provider.get("logging.level");
    assert!(level.is_none());
}

#[test]
fn test_typed_config_is_kept() {
    let provider = FigmentConfigProvider::new(&config_with_provider()).unwrap();
    assert!(provider.config().provider("corporate").is_some());
}
