//! Bootstrap tests: configuration to a running authentication stack

use aegis::bootstrap::{build_provider, init_app, load_config, security_policy};
use aegis::cli::cli_context;
use aegis::domain::ports::{AuthMetrics, AuthProvider};
use aegis::domain::{AuthCredentials, AuthErrorCode, ProviderPriority, ProviderType};
use aegis::infrastructure::config::{AppConfig, ProviderEntry, SecurityConfig};
use serde_json::json;
use std::io::Write;
use std::time::Duration;

const PASSWORD: &str = "Str0ng-Passw0rd";

fn write_config(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(".toml")
        .tempfile()
        .expect("create temp config");
    file.write_all(contents.as_bytes()).expect("write temp config");
    file
}

fn entry(value: serde_json::Value) -> ProviderEntry {
    serde_json::from_value(value).expect("valid provider entry")
}

#[test]
fn test_load_config_reads_provider_declarations() {
    let file = write_config(
        r#"
[orchestrator]
enable_fallback = false

[[providers]]
name = "corp"
kind = "ldap"
priority = "high"
fallbacks = ["accounts"]

[providers.settings]
base_dn = "dc=corp,dc=example"

[[providers]]
name = "accounts"
kind = "local"
"#,
    );

    let config = load_config(Some(file.path())).unwrap();

    assert!(!config.orchestrator.enable_fallback);
    assert_eq!(config.providers.len(), 2);
    let corp = config.provider("corp").unwrap();
    assert_eq!(corp.kind, ProviderType::Ldap);
    assert_eq!(corp.priority, ProviderPriority::High);
    assert_eq!(corp.fallbacks, vec!["accounts".to_string()]);
    assert_eq!(corp.settings["base_dn"], json!("dc=corp,dc=example"));
    let accounts = config.provider("accounts").unwrap();
    assert_eq!(accounts.priority, ProviderPriority::Normal);
    assert!(accounts.enabled);
}

#[test]
fn test_load_config_rejects_undeclared_fallback() {
    let file = write_config(
        r#"
[[providers]]
name = "corp"
kind = "ldap"
fallbacks = ["nowhere"]
"#,
    );

    let err = load_config(Some(file.path())).unwrap_err();
    assert!(format!("{err:#}").contains("undeclared fallback"));
}

#[test]
fn test_build_provider_by_kind() {
    let cases = [
        ("ldap", ProviderType::Ldap),
        ("local", ProviderType::Local),
        ("oauth", ProviderType::OAuth),
        ("acme", ProviderType::Custom("acme".to_string())),
    ];

    for (kind, expected) in cases {
        let provider = build_provider(&entry(json!({ "name": "p", "kind": kind })));
        assert_eq!(provider.name(), "p");
        assert_eq!(provider.provider_type(), expected);
    }
}

#[test]
fn test_security_policy_follows_config() {
    let config = SecurityConfig {
        rate_limit_enabled: false,
        rate_limit_window_secs: 60,
        rate_limit_max_attempts: 3,
        suspicious_failure_threshold: 2,
        block_risk_score: 55,
        required_headers: vec!["User-Agent".to_string(), "X-Request-Id".to_string()],
    };

    let policy = security_policy(&config);

    assert!(!policy.rate_limit_enabled);
    assert_eq!(policy.window, Duration::from_secs(60));
    assert_eq!(policy.max_attempts, 3);
    assert_eq!(policy.suspicious_failure_threshold, 2);
    assert_eq!(policy.block_risk_score, 55);
    assert_eq!(policy.required_headers, vec!["user-agent", "x-request-id"]);
}

#[tokio::test]
async fn test_init_app_serves_authentication() {
    let mut config = AppConfig::default();
    config.orchestrator.enable_health_monitoring = false;
    config.providers = vec![
        entry(json!({ "name": "primary", "kind": "token", "priority": "high" })),
        entry(json!({ "name": "accounts", "kind": "local" })),
    ];

    let stack = init_app(&config).await.unwrap();
    stack.orchestrator.initialize().await.unwrap();

    let session = stack
        .orchestrator
        .authenticate(&AuthCredentials::password("alice", PASSWORD), Some(&cli_context()))
        .await
        .unwrap();

    assert_eq!(session.provider_name, "primary");
    assert_eq!(stack.metrics.snapshot().successes, 1);
    assert!(stack.orchestrator.get_current_session().await.unwrap().is_some());

    let stats = stack.orchestrator.statistics();
    assert_eq!(stats.manager.total_providers, 2);
    stack.orchestrator.shutdown().await;
}

#[tokio::test]
async fn test_init_app_applies_provider_settings() {
    let mut config = AppConfig::default();
    config.providers = vec![entry(json!({
        "name": "corp",
        "kind": "ldap",
        "settings": { "base_dn": "" }
    }))];

    let err = init_app(&config).await.unwrap_err();
    assert!(format!("{err:#}").contains("Failed to configure provider corp"));
}

#[tokio::test]
async fn test_init_app_rejects_duplicate_names() {
    let mut config = AppConfig::default();
    config.providers = vec![
        entry(json!({ "name": "twin", "kind": "token" })),
        entry(json!({ "name": "twin", "kind": "local" })),
    ];

    let err = init_app(&config).await.unwrap_err();
    assert!(format!("{err:#}").contains("Failed to register provider twin"));
}

#[tokio::test]
async fn test_disabled_entry_is_never_selected() {
    let mut config = AppConfig::default();
    config.orchestrator.enable_health_monitoring = false;
    config.providers = vec![
        entry(json!({ "name": "off", "kind": "token", "priority": "critical", "enabled": false })),
        entry(json!({ "name": "on", "kind": "token" })),
    ];

    let stack = init_app(&config).await.unwrap();
    stack.orchestrator.initialize().await.unwrap();

    let session = stack
        .orchestrator
        .authenticate(&AuthCredentials::password("alice", PASSWORD), None)
        .await
        .unwrap();
    assert_eq!(session.provider_name, "on");
}

#[tokio::test]
async fn test_stack_without_providers_cannot_start() {
    let stack = init_app(&AppConfig::default()).await.unwrap();

    let err = stack.orchestrator.initialize().await.unwrap_err();
    assert_eq!(err.code, AuthErrorCode::NotInitialized);
}
