//! Orchestrator tests: lifecycle, authentication pipeline, sessions and accounts

use crate::support::{HarnessBuilder, PASSWORD, credentials, null};
use aegis_application::providers::ProviderOptions;
use aegis_application::use_cases::OrchestratorState;
use aegis_application::validation::ValidationRule;
use aegis_domain::constants::{SESSION_METADATA_PROVIDER, SESSION_METADATA_REQUEST_ID};
use aegis_domain::ports::{AuthLogger, AuthMetrics, AuthProvider, AuthRepository};
use aegis_domain::{
    AuthCredentials, AuthError, AuthErrorCode, AuthEventKind, AuthResult, AuthSession, AuthToken,
    AuthUser, ProviderCapability, ProviderPriority, ProviderType, RegistrationRequest,
    SecurityContext, ValidationResult,
};
use aegis_providers::{
    DirectoryAuthProvider, LocalAccountProvider, NullAuthProvider, SecurityPolicy,
};
use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

fn browser() -> SecurityContext {
    SecurityContext::new()
        .with_ip("192.0.2.10")
        .with_user_agent("Mozilla/5.0")
        .with_header("User-Agent", "Mozilla/5.0")
}

fn has_event(harness: &crate::support::Harness, kind: AuthEventKind) -> bool {
    harness.logger.events().iter().any(|e| e.kind == kind)
}

fn registration(username: &str, password: &str) -> RegistrationRequest {
    RegistrationRequest {
        username: username.to_string(),
        email: Some(format!("{username}@example.com")),
        password: password.to_string(),
        ..RegistrationRequest::default()
    }
}

/// Authenticates nobody and refuses to sign out
struct StubbornProvider;

#[async_trait]
impl AuthProvider for StubbornProvider {
    fn name(&self) -> &str {
        "stubborn"
    }

    fn provider_type(&self) -> ProviderType {
        ProviderType::Custom("stubborn".to_string())
    }

    async fn authenticate(&self, _credentials: &AuthCredentials) -> AuthResult<AuthSession> {
        Err(AuthError::credentials_invalid())
    }

    fn capabilities(&self) -> Vec<ProviderCapability> {
        vec![ProviderCapability::Authenticate, ProviderCapability::Signout]
    }

    async fn signout(&self) -> AuthResult<()> {
        Err(AuthError::new(AuthErrorCode::ProviderError, "upstream refused"))
    }
}

// ---------------------------------------------------------------------------
// Lifecycle
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_requests_are_rejected_before_initialize() {
    let harness = HarnessBuilder::new()
        .provider(null("a"), ProviderOptions::default())
        .build();
    assert_eq!(harness.orchestrator.state(), OrchestratorState::Uninitialized);

    let err = harness
        .orchestrator
        .authenticate(&credentials(), None)
        .await
        .unwrap_err();
    assert_eq!(err.code, AuthErrorCode::NotInitialized);

    let err = harness
        .orchestrator
        .validate_current_session()
        .await
        .unwrap_err();
    assert_eq!(err.code, AuthErrorCode::NotInitialized);

    let err = harness
        .orchestrator
        .register_user("a", &registration("carol", PASSWORD))
        .await
        .unwrap_err();
    assert_eq!(err.code, AuthErrorCode::NotInitialized);
}

#[tokio::test]
async fn test_initialize_without_providers_fails() {
    let harness = HarnessBuilder::new().build();

    let err = harness.orchestrator.initialize().await.unwrap_err();
    assert_eq!(err.code, AuthErrorCode::NotInitialized);
    assert_eq!(harness.orchestrator.state(), OrchestratorState::Failed);

    let err = harness
        .orchestrator
        .authenticate(&credentials(), None)
        .await
        .unwrap_err();
    assert_eq!(err.code, AuthErrorCode::NotInitialized);
}

#[tokio::test]
async fn test_initialize_fails_when_every_provider_fails() {
    let harness = HarnessBuilder::new()
        .provider(
            Arc::new(NullAuthProvider::new("a").failing_init_with(AuthErrorCode::ProviderError)),
            ProviderOptions::default(),
        )
        .provider(
            Arc::new(NullAuthProvider::new("b").failing_init_with(AuthErrorCode::Timeout)),
            ProviderOptions::default(),
        )
        .build();

    let err = harness.orchestrator.initialize().await.unwrap_err();
    assert_eq!(err.code, AuthErrorCode::NotInitialized);
    assert_eq!(err.details["failures"].as_array().map(Vec::len), Some(2));
    assert_eq!(harness.orchestrator.state(), OrchestratorState::Failed);
}

#[tokio::test]
async fn test_partial_initialize_disables_failed_providers() {
    let harness = HarnessBuilder::new()
        .provider(
            Arc::new(NullAuthProvider::new("broken").failing_init_with(AuthErrorCode::ProviderError)),
            ProviderOptions::with_priority(ProviderPriority::Critical),
        )
        .provider(null("healthy"), ProviderOptions::default())
        .ready()
        .await;

    assert!(harness.orchestrator.state().is_ready());
    assert!(!harness.manager.get_registration("broken").unwrap().enabled);

    let session = harness
        .orchestrator
        .authenticate(&credentials(), None)
        .await
        .unwrap();
    assert_eq!(session.provider_name, "healthy");
}

#[tokio::test]
async fn test_initialize_is_idempotent_once_ready() {
    let provider = null("a");
    let harness = HarnessBuilder::new()
        .provider(provider.clone(), ProviderOptions::default())
        .ready()
        .await;

    harness.orchestrator.initialize().await.unwrap();
    assert_eq!(provider.initialize_calls(), 1);
}

#[tokio::test]
async fn test_initialize_starts_manager_monitoring_when_enabled() {
    let harness = HarnessBuilder::new()
        .config(|c| c.orchestrator.enable_health_monitoring = true)
        .provider(null("a"), ProviderOptions::default())
        .ready()
        .await;
    assert!(harness.manager.is_health_monitoring());

    harness.orchestrator.shutdown().await;
    assert!(!harness.manager.is_health_monitoring());
}

#[tokio::test]
async fn test_initialize_fails_when_monitoring_cannot_start() {
    let harness = HarnessBuilder::new()
        .config(|c| {
            c.orchestrator.enable_health_monitoring = true;
            c.health.manager_interval_ms = 0;
        })
        .provider(null("a"), ProviderOptions::default())
        .build();

    let err = harness.orchestrator.initialize().await.unwrap_err();

    assert_eq!(err.code, AuthErrorCode::NotInitialized);
    assert_eq!(harness.orchestrator.state(), OrchestratorState::Failed);
    assert!(!harness.manager.is_health_monitoring());
}

#[tokio::test]
async fn test_shutdown_stops_providers_and_rejects_requests() {
    let provider = null("a");
    let harness = HarnessBuilder::new()
        .provider(provider.clone(), ProviderOptions::default())
        .ready()
        .await;

    let report = harness.orchestrator.shutdown().await;
    assert!(report.all_succeeded());
    assert_eq!(provider.shutdown_calls(), 1);
    assert_eq!(harness.orchestrator.state(), OrchestratorState::ShutDown);

    let err = harness
        .orchestrator
        .authenticate(&credentials(), None)
        .await
        .unwrap_err();
    assert_eq!(err.code, AuthErrorCode::NotInitialized);
}

// ---------------------------------------------------------------------------
// Authentication pipeline
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_failover_serves_from_fallback_after_single_validation() {
    let primary = Arc::new(NullAuthProvider::new("a").failing_with(AuthErrorCode::ProviderError));
    let fallback = null("b");
    let harness = HarnessBuilder::new()
        .provider(
            primary.clone(),
            ProviderOptions::with_priority(ProviderPriority::High).fallbacks(["b"]),
        )
        .provider(fallback.clone(), ProviderOptions::default())
        .ready()
        .await;

    let validations = Arc::new(AtomicU32::new(0));
    let counter = Arc::clone(&validations);
    harness
        .validator
        .add_rule(ValidationRule::credentials("counting", move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            ValidationResult::valid()
        }))
        .unwrap();

    let session = harness
        .orchestrator
        .authenticate(&credentials(), Some(&browser()))
        .await
        .unwrap();

    assert_eq!(session.provider_name, "b");
    assert_eq!(validations.load(Ordering::SeqCst), 1);
    assert_eq!(primary.authenticate_calls(), 1);
    assert_eq!(fallback.authenticate_calls(), 1);
    assert!(has_event(&harness, AuthEventKind::ProviderFailover));
    assert!(has_event(&harness, AuthEventKind::LoginSuccess));

    let metrics = harness.metrics.snapshot();
    assert_eq!(metrics.total_attempts, 1);
    assert_eq!(metrics.successes, 1);
}

#[tokio::test]
async fn test_fallback_can_be_disabled_by_config() {
    let fallback = null("b");
    let harness = HarnessBuilder::new()
        .config(|c| c.orchestrator.enable_fallback = false)
        .provider(
            Arc::new(NullAuthProvider::new("a").failing_with(AuthErrorCode::ProviderError)),
            ProviderOptions::with_priority(ProviderPriority::High).fallbacks(["b"]),
        )
        .provider(fallback.clone(), ProviderOptions::default())
        .ready()
        .await;

    let err = harness
        .orchestrator
        .authenticate(&credentials(), None)
        .await
        .unwrap_err();

    assert_eq!(err.code, AuthErrorCode::ProviderError);
    assert_eq!(fallback.authenticate_calls(), 0);

    let metrics = harness.metrics.snapshot();
    assert_eq!(metrics.failures, 1);
    assert_eq!(metrics.failure_codes.get("PROVIDER_ERROR"), Some(&1));
    assert!(has_event(&harness, AuthEventKind::LoginFailure));
}

#[tokio::test]
async fn test_rejected_password_keeps_its_code() {
    let harness = HarnessBuilder::new()
        .provider(
            Arc::new(NullAuthProvider::new("a").failing_with(AuthErrorCode::CredentialsInvalid)),
            ProviderOptions::default(),
        )
        .ready()
        .await;

    let err = harness
        .orchestrator
        .authenticate(&credentials(), None)
        .await
        .unwrap_err();

    assert_eq!(err.code, AuthErrorCode::CredentialsInvalid);
    assert_eq!(
        harness.metrics.snapshot().failure_codes.get("CREDENTIALS_INVALID"),
        Some(&1)
    );
}

#[tokio::test]
async fn test_rejected_password_is_not_replayed_on_fallback() {
    let fallback = null("b");
    let primary =
        Arc::new(NullAuthProvider::new("a").failing_with(AuthErrorCode::CredentialsInvalid));
    let harness = HarnessBuilder::new()
        .provider(
            primary.clone(),
            ProviderOptions::with_priority(ProviderPriority::High).fallbacks(["b"]),
        )
        .provider(fallback.clone(), ProviderOptions::default())
        .ready()
        .await;

    let err = harness
        .orchestrator
        .authenticate(&credentials(), Some(&browser()))
        .await
        .unwrap_err();

    assert_eq!(err.code, AuthErrorCode::CredentialsInvalid);
    assert_eq!(primary.authenticate_calls(), 1);
    assert_eq!(fallback.authenticate_calls(), 0);
    assert!(harness.orchestrator.get_current_session().await.unwrap().is_none());
    assert!(!has_event(&harness, AuthEventKind::ProviderFailover));
}

#[tokio::test]
async fn test_invalid_credentials_never_reach_a_provider() {
    let provider = null("a");
    let harness = HarnessBuilder::new()
        .provider(provider.clone(), ProviderOptions::default())
        .ready()
        .await;

    let err = harness
        .orchestrator
        .authenticate(&AuthCredentials::password("alice", "weak"), None)
        .await
        .unwrap_err();

    assert_eq!(err.code, AuthErrorCode::ValidationError);
    let codes = err.details["errors"].as_array().unwrap();
    assert!(codes.contains(&json!("PASSWORD_TOO_SHORT")));
    assert_eq!(provider.authenticate_calls(), 0);
    assert!(has_event(&harness, AuthEventKind::ValidationFailed));
    assert_eq!(harness.metrics.snapshot().total_attempts, 0);
}

#[tokio::test]
async fn test_rate_limit_blocks_excess_attempts() {
    let provider = null("a");
    let harness = HarnessBuilder::new()
        .policy(SecurityPolicy {
            max_attempts: 2,
            ..SecurityPolicy::default()
        })
        .provider(provider.clone(), ProviderOptions::default())
        .ready()
        .await;
    let context = browser();

    for _ in 0..2 {
        harness
            .orchestrator
            .authenticate(&credentials(), Some(&context))
            .await
            .unwrap();
    }
    let err = harness
        .orchestrator
        .authenticate(&credentials(), Some(&context))
        .await
        .unwrap_err();

    assert_eq!(err.code, AuthErrorCode::RateLimited);
    assert!(err.details["retry_after_ms"].as_u64().unwrap() > 0);
    assert_eq!(provider.authenticate_calls(), 2);
    assert!(has_event(&harness, AuthEventKind::RateLimited));
}

#[tokio::test]
async fn test_suspicious_attempt_is_blocked() {
    let provider = null("a");
    let harness = HarnessBuilder::new()
        .policy(SecurityPolicy {
            block_risk_score: 40,
            ..SecurityPolicy::default()
        })
        .provider(provider.clone(), ProviderOptions::default())
        .ready()
        .await;
    let context = SecurityContext::new().with_ip("not-an-ip");

    let err = harness
        .orchestrator
        .authenticate(&credentials(), Some(&context))
        .await
        .unwrap_err();

    assert_eq!(err.code, AuthErrorCode::SuspiciousActivity);
    assert_eq!(err.details["risk_score"], json!(45));
    assert_eq!(provider.authenticate_calls(), 0);
    assert!(has_event(&harness, AuthEventKind::SecurityAlert));
}

#[tokio::test]
async fn test_repeated_failures_are_tracked_per_user() {
    let harness = HarnessBuilder::new()
        .provider(
            Arc::new(NullAuthProvider::new("a").failing_with(AuthErrorCode::CredentialsInvalid)),
            ProviderOptions::default(),
        )
        .ready()
        .await;

    for _ in 0..2 {
        let _ = harness
            .orchestrator
            .authenticate(&credentials(), Some(&browser()))
            .await;
    }

    assert_eq!(harness.security.recent_failures("ip:192.0.2.10"), 2);
    assert_eq!(harness.security.recent_failures("user:alice"), 2);
}

#[tokio::test]
async fn test_unknown_provider_type_is_not_found() {
    let harness = HarnessBuilder::new()
        .provider(null("a"), ProviderOptions::default())
        .ready()
        .await;

    let err = harness
        .orchestrator
        .authenticate(
            &credentials().with_provider_type(ProviderType::Saml),
            None,
        )
        .await
        .unwrap_err();
    assert_eq!(err.code, AuthErrorCode::ProviderNotFound);
}

// ---------------------------------------------------------------------------
// Sessions
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_session_is_stamped_capped_and_persisted() {
    let harness = HarnessBuilder::new()
        .config(|c| c.session.ttl_secs = 60)
        .provider(null("a"), ProviderOptions::default())
        .ready()
        .await;
    let context = browser();

    let session = harness
        .orchestrator
        .authenticate(&credentials(), Some(&context))
        .await
        .unwrap();

    assert_eq!(session.metadata[SESSION_METADATA_PROVIDER], json!("a"));
    assert_eq!(
        session.metadata[SESSION_METADATA_REQUEST_ID],
        json!(context.request_id)
    );
    assert!(session.expires_at <= session.created_at + chrono::Duration::seconds(60));
    assert!(session.token.expires_at > session.expires_at);

    let current = harness.orchestrator.get_current_session().await.unwrap().unwrap();
    assert_eq!(current.id, session.id);
    assert_eq!(
        harness.repository.get_refresh_token().await.unwrap(),
        session.token.refresh_token
    );
}

#[tokio::test]
async fn test_expired_session_is_removed() {
    let harness = HarnessBuilder::new()
        .provider(null("a"), ProviderOptions::default())
        .ready()
        .await;
    let expired = AuthSession::new(
        AuthUser::new("a:alice", "alice"),
        AuthToken::bearer("stale", chrono::Duration::seconds(-5)),
        ProviderType::Token,
        "a",
    );
    harness.repository.store_session(&expired).await.unwrap();

    assert!(harness.orchestrator.get_current_session().await.unwrap().is_none());
    assert!(harness.repository.get_session().await.unwrap().is_none());
    assert!(has_event(&harness, AuthEventKind::SessionExpired));

    let err = harness
        .orchestrator
        .validate_current_session()
        .await
        .unwrap_err();
    assert_eq!(err.code, AuthErrorCode::SessionNotFound);
}

#[tokio::test]
async fn test_validate_current_session_keeps_valid_session() {
    let harness = HarnessBuilder::new()
        .provider(null("a"), ProviderOptions::default())
        .ready()
        .await;
    let session = harness
        .orchestrator
        .authenticate(&credentials(), None)
        .await
        .unwrap();

    let current = harness.orchestrator.validate_current_session().await.unwrap();
    assert_eq!(current.id, session.id);
    assert_eq!(current.token.access_token, session.token.access_token);
}

#[tokio::test]
async fn test_session_revoked_by_provider_expires() {
    let provider = null("a");
    let harness = HarnessBuilder::new()
        .provider(provider.clone(), ProviderOptions::default())
        .ready()
        .await;
    harness
        .orchestrator
        .authenticate(&credentials(), None)
        .await
        .unwrap();

    provider.set_healthy(false);
    let err = harness
        .orchestrator
        .validate_current_session()
        .await
        .unwrap_err();

    assert_eq!(err.code, AuthErrorCode::SessionExpired);
    assert!(harness.repository.get_session().await.unwrap().is_none());
}

#[tokio::test]
async fn test_session_near_expiry_is_refreshed() {
    let harness = HarnessBuilder::new()
        .config(|c| c.session.refresh_window_secs = 7200)
        .provider(null("a"), ProviderOptions::default())
        .ready()
        .await;
    let session = harness
        .orchestrator
        .authenticate(&credentials(), None)
        .await
        .unwrap();

    let current = harness.orchestrator.validate_current_session().await.unwrap();

    assert_ne!(current.token.access_token, session.token.access_token);
    assert_eq!(current.user.username, "alice");
    assert!(has_event(&harness, AuthEventKind::SessionRefreshed));
}

#[tokio::test]
async fn test_refresh_session_rotates_tokens() {
    let harness = HarnessBuilder::new()
        .provider(null("a"), ProviderOptions::default())
        .ready()
        .await;

    let err = harness.orchestrator.refresh_session().await.unwrap_err();
    assert_eq!(err.code, AuthErrorCode::SessionNotFound);

    let session = harness
        .orchestrator
        .authenticate(&credentials(), None)
        .await
        .unwrap();
    let refreshed = harness.orchestrator.refresh_session().await.unwrap();

    assert_ne!(refreshed.token.access_token, session.token.access_token);
    assert_eq!(refreshed.metadata[SESSION_METADATA_PROVIDER], json!("a"));
    assert_eq!(
        harness.repository.get_refresh_token().await.unwrap(),
        refreshed.token.refresh_token
    );
    let current = harness.orchestrator.get_current_session().await.unwrap().unwrap();
    assert_eq!(current.id, refreshed.id);
}

#[tokio::test]
async fn test_rejected_refresh_token_clears_session() {
    let local = Arc::new(LocalAccountProvider::new("local"));
    let harness = HarnessBuilder::new()
        .provider(local.clone(), ProviderOptions::default())
        .ready()
        .await;
    let outcome = harness
        .orchestrator
        .register_user("local", &registration("carol", PASSWORD))
        .await
        .unwrap();
    let code = outcome.activation_code.unwrap();
    harness
        .orchestrator
        .activate_user("local", "carol", &code)
        .await
        .unwrap();
    harness
        .orchestrator
        .authenticate(&AuthCredentials::password("carol", PASSWORD), None)
        .await
        .unwrap();

    harness.repository.store_refresh_token("forged").await.unwrap();
    let err = harness.orchestrator.refresh_session().await.unwrap_err();

    assert_eq!(err.code, AuthErrorCode::SessionExpired);
    assert!(harness.repository.get_session().await.unwrap().is_none());
}

#[tokio::test]
async fn test_global_signout_collects_failures() {
    let signs_out = null("a");
    let silent = Arc::new(
        NullAuthProvider::new("silent").with_capabilities(vec![ProviderCapability::Authenticate]),
    );
    let harness = HarnessBuilder::new()
        .provider(
            signs_out.clone(),
            ProviderOptions::with_priority(ProviderPriority::High),
        )
        .provider(Arc::new(StubbornProvider), ProviderOptions::default())
        .provider(silent.clone(), ProviderOptions::default())
        .ready()
        .await;
    harness
        .orchestrator
        .authenticate(&credentials(), None)
        .await
        .unwrap();

    let report = harness.orchestrator.global_signout().await.unwrap();

    assert!(report.session_cleared);
    assert_eq!(report.providers_signed_out, vec!["a".to_string()]);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].provider, "stubborn");
    assert_eq!(report.failures[0].code, AuthErrorCode::ProviderError);
    assert!(!report.is_complete());
    assert_eq!(signs_out.signout_calls(), 1);
    assert_eq!(silent.signout_calls(), 0);
    assert!(harness.repository.get_session().await.unwrap().is_none());
    assert!(has_event(&harness, AuthEventKind::Logout));
}

#[tokio::test]
async fn test_global_signout_without_session() {
    let harness = HarnessBuilder::new()
        .provider(null("a"), ProviderOptions::default())
        .build();

    let report = harness.orchestrator.global_signout().await.unwrap();
    assert!(!report.session_cleared);
    assert!(report.is_complete());
}

// ---------------------------------------------------------------------------
// Accounts
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_register_activate_and_sign_in() {
    let local = Arc::new(LocalAccountProvider::new("local"));
    let harness = HarnessBuilder::new()
        .provider(local.clone(), ProviderOptions::default())
        .ready()
        .await;

    let outcome = harness
        .orchestrator
        .register_user("local", &registration("carol", PASSWORD))
        .await
        .unwrap();
    assert!(outcome.activation_required);
    assert!(!outcome.user.is_active);
    assert_eq!(harness.repository.user_count(), 1);
    assert!(has_event(&harness, AuthEventKind::Registration));

    let carol = AuthCredentials::password("carol", PASSWORD);
    let err = harness
        .orchestrator
        .authenticate(&carol, None)
        .await
        .unwrap_err();
    assert_eq!(err.code, AuthErrorCode::CredentialsInvalid);

    let code = harness
        .orchestrator
        .resend_activation_code("local", "carol")
        .await
        .unwrap();
    assert_eq!(local.pending_activation_code("carol"), Some(code.clone()));
    assert_eq!(harness.repository.activation_code("carol"), Some(code.clone()));

    let err = harness
        .orchestrator
        .activate_user("local", "carol", "000000-wrong")
        .await
        .unwrap_err();
    assert_eq!(err.code, AuthErrorCode::InvalidActivationCode);

    let user = harness
        .orchestrator
        .activate_user("local", "carol", &code)
        .await
        .unwrap();
    assert!(user.is_active);
    assert!(harness.repository.get_user("carol").await.unwrap().unwrap().is_active);
    assert!(has_event(&harness, AuthEventKind::Activation));

    let session = harness
        .orchestrator
        .authenticate(&carol, None)
        .await
        .unwrap();
    assert_eq!(session.provider_name, "local");
}

#[tokio::test]
async fn test_weak_registration_is_rejected() {
    let local = Arc::new(LocalAccountProvider::new("local"));
    let harness = HarnessBuilder::new()
        .provider(local.clone(), ProviderOptions::default())
        .ready()
        .await;

    let err = harness
        .orchestrator
        .register_user("local", &registration("carol", "Password1"))
        .await
        .unwrap_err();

    assert_eq!(err.code, AuthErrorCode::ValidationError);
    assert_eq!(local.account_count(), 0);
    assert_eq!(harness.repository.user_count(), 0);
}

#[tokio::test]
async fn test_directory_does_not_support_registration() {
    let directory = Arc::new(DirectoryAuthProvider::new("corp"));
    let harness = HarnessBuilder::new()
        .provider(directory, ProviderOptions::default())
        .ready()
        .await;

    let err = harness
        .orchestrator
        .register_user("corp", &registration("carol", PASSWORD))
        .await
        .unwrap_err();
    assert_eq!(err.code, AuthErrorCode::RegistrationNotSupported);

    let err = harness
        .orchestrator
        .register_user("nowhere", &registration("carol", PASSWORD))
        .await
        .unwrap_err();
    assert_eq!(err.code, AuthErrorCode::ProviderNotFound);
}

// ---------------------------------------------------------------------------
// Observability
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_statistics_aggregate_every_component() {
    let harness = HarnessBuilder::new()
        .provider(null("a"), ProviderOptions::default())
        .ready()
        .await;
    harness
        .orchestrator
        .authenticate(&credentials(), None)
        .await
        .unwrap();
    let _ = harness
        .orchestrator
        .authenticate(&AuthCredentials::password("alice", "weak"), None)
        .await;

    let stats = harness.orchestrator.statistics();
    assert_eq!(stats.state, OrchestratorState::Ready);
    assert_eq!(stats.manager.total_providers, 1);
    assert_eq!(stats.auth.total_attempts, 1);
    assert_eq!(stats.auth.successes, 1);
    assert_eq!(stats.validation.total_validations, 2);
    assert_eq!(stats.validation.invalid_count, 1);

    let json = serde_json::to_value(&stats).unwrap();
    assert_eq!(json["state"], json!("ready"));
}

#[tokio::test]
async fn test_health_report_covers_registered_providers() {
    let harness = HarnessBuilder::new()
        .provider(null("a"), ProviderOptions::default())
        .provider(null("b"), ProviderOptions::default())
        .ready()
        .await;

    let report = harness.orchestrator.health_report();
    assert_eq!(report.summary.total, 2);
    assert_eq!(report.summary.healthy, 2);
    assert!(report.providers.contains_key("a"));
    assert!(report.providers.contains_key("b"));
}

#[tokio::test]
async fn test_slow_provider_initialization_times_out() {
    let harness = HarnessBuilder::new()
        .config(|c| c.orchestrator.init_timeout_ms = 50)
        .provider(
            Arc::new(NullAuthProvider::new("slow").with_init_delay(Duration::from_millis(500))),
            ProviderOptions::with_priority(ProviderPriority::Critical),
        )
        .provider(null("fast"), ProviderOptions::default())
        .ready()
        .await;

    assert!(!harness.manager.get_registration("slow").unwrap().enabled);
    assert_eq!(
        harness.manager.get_best_provider(None).unwrap().name(),
        "fast"
    );
}
