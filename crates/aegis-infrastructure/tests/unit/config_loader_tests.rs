//! Configuration loading and validation tests

use aegis_domain::{Error, ExecutionMode, ProviderPriority, ProviderType};
use aegis_infrastructure::config::loader::validate_app_config;
use aegis_infrastructure::config::{
    AppConfig, ConfigBuilder, ConfigLoader, HealthConfig, ProviderEntry, ResilienceConfig,
};
use std::collections::HashMap;
use std::io::Write;

fn provider(name: &str, fallbacks: &[&str]) -> ProviderEntry {
    ProviderEntry {
        name: name.to_string(),
        kind: ProviderType::Local,
        priority: ProviderPriority::Normal,
        enabled: true,
        fallbacks: fallbacks.iter().map(|f| (*f).to_string()).collect(),
        health_check_interval_ms: None,
        max_retries: None,
        metadata: HashMap::new(),
        settings: HashMap::new(),
    }
}

fn write_config(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(".toml")
        .tempfile()
        .expect("create temp config");
    file.write_all(contents.as_bytes()).expect("write temp config");
    file
}

fn assert_config_error(result: aegis_domain::Result<AppConfig>, needle: &str) {
    match result {
        Err(Error::Configuration { message, .. }) => {
            assert!(message.contains(needle), "unexpected message: {message}");
        }
        other => panic!("Expected configuration error containing {needle:?}, got {other:?}"),
    }
}

#[test]
fn test_defaults_are_valid() {
    let config = AppConfig::default();
    validate_app_config(&config).expect("defaults should validate");

    assert_eq!(config.resilience.failure_threshold, 5);
    assert_eq!(config.resilience.recovery_timeout_ms, 60_000);
    assert_eq!(config.health.check_interval_ms, 30_000);
    assert_eq!(config.health.timeout_ms, 5_000);
    assert_eq!(config.health.retries, 2);
    assert_eq!(config.validation.mode, ExecutionMode::Sequential);
    assert!(config.providers.is_empty());
}

#[test]
fn test_load_from_toml_file() {
    let file = write_config(
        r#"
[logging]
level = "debug"

[resilience]
failure_threshold = 3

[health]
check_interval_ms = 10000
timeout_ms = 2000

[validation]
mode = "fail_fast"

[[providers]]
name = "corporate"
kind = "ldap"
priority = "high"
fallbacks = ["local"]

[[providers]]
name = "local"
kind = "local"
"#,
    );

    let config = ConfigLoader::new()
        .with_config_path(file.path())
        .load()
        .expect("config should load");

    assert_eq!(config.logging.level, "debug");
    assert_eq!(config.resilience.failure_threshold, 3);
    // untouched keys keep their defaults
    assert_eq!(config.resilience.recovery_timeout_ms, 60_000);
    assert_eq!(config.health.timeout_ms, 2_000);
    assert_eq!(config.validation.mode, ExecutionMode::FailFast);

    let corporate = config.provider("corporate").expect("corporate declared");
    assert_eq!(corporate.kind, ProviderType::Ldap);
    assert_eq!(corporate.priority, ProviderPriority::High);
    assert_eq!(corporate.fallbacks, vec!["local".to_string()]);
    assert!(corporate.enabled);
    assert_eq!(
        config.provider("local").map(|p| p.priority),
        Some(ProviderPriority::Normal)
    );
}

#[test]
fn test_missing_file_falls_back_to_defaults() {
    let dir = tempfile::tempdir().expect("temp dir");
    let config = ConfigLoader::new()
        .with_config_path(dir.path().join("absent.toml"))
        .load()
        .expect("defaults should load");

    assert_eq!(config.health.retries, 2);
}

#[test]
fn test_env_overrides_file() {
    let file = write_config("[health]\nretries = 1\n");
    // SAFETY: the prefix is unique to this test
    unsafe {
        std::env::set_var("AEGISENVTEST_HEALTH__RETRIES", "4");
    }

    let config = ConfigLoader::new()
        .with_config_path(file.path())
        .with_env_prefix("AEGISENVTEST")
        .load();

    // SAFETY: see above
    unsafe {
        std::env::remove_var("AEGISENVTEST_HEALTH__RETRIES");
    }
    assert_eq!(config.expect("config should load").health.retries, 4);
}

#[test]
fn test_invalid_log_level_is_rejected() {
    let file = write_config("[logging]\nlevel = \"chatty\"\n");
    assert_config_error(
        ConfigLoader::new().with_config_path(file.path()).load(),
        "Invalid log level",
    );
}

#[test]
fn test_timeout_must_be_below_interval() {
    let health = HealthConfig {
        check_interval_ms: 1_000,
        timeout_ms: 1_000,
        ..HealthConfig::default()
    };
    assert_config_error(
        ConfigBuilder::new().with_health(health).build(),
        "must be smaller than the check interval",
    );
}

#[test]
fn test_zero_failure_threshold_is_rejected() {
    let resilience = ResilienceConfig {
        failure_threshold: 0,
        ..ResilienceConfig::default()
    };
    assert_config_error(
        ConfigBuilder::new().with_resilience(resilience).build(),
        "failure threshold",
    );
}

#[test]
fn test_provider_declarations_are_checked() {
    assert_config_error(
        ConfigBuilder::new()
            .with_provider(provider("a", &[]))
            .with_provider(provider("a", &[]))
            .build(),
        "Duplicate provider name",
    );
    assert_config_error(
        ConfigBuilder::new()
            .with_provider(provider("a", &["a"]))
            .build(),
        "itself as a fallback",
    );
    assert_config_error(
        ConfigBuilder::new()
            .with_provider(provider("a", &["missing"]))
            .build(),
        "undeclared fallback",
    );

    let config = ConfigBuilder::new()
        .with_provider(provider("a", &["b"]))
        .with_provider(provider("b", &[]))
        .build()
        .expect("valid chain");
    assert_eq!(config.providers.len(), 2);
}

#[test]
fn test_invalid_username_pattern_is_rejected() {
    let mut config = AppConfig::default();
    config.validation.username_pattern = "([a-z".to_string();

    match validate_app_config(&config) {
        Err(Error::Configuration { message, source }) => {
            assert!(message.contains("Invalid username pattern"));
            assert!(source.is_some());
        }
        other => panic!("Expected configuration error, got {other:?}"),
    }
}

#[test]
fn test_save_and_reload() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("aegis.toml");
    let config = ConfigBuilder::new()
        .with_provider(provider("local", &[]))
        .build()
        .expect("valid config");

    let loader = ConfigLoader::new().with_config_path(&path);
    loader.save_to_file(&config, &path).expect("save config");
    let reloaded = loader.load().expect("reload config");

    assert_eq!(reloaded.providers.len(), 1);
    assert_eq!(reloaded.providers[0].name, "local");
    assert_eq!(reloaded.session.ttl_secs, config.session.ttl_secs);
    assert_eq!(loader.config_path(), Some(path.as_path()));
}
