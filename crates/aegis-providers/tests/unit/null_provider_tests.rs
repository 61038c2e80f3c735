//! Null provider tests

use aegis_domain::value_objects::{AuthCredentials, ProviderCapability, ProviderType};
use aegis_domain::AuthErrorCode;
use aegis_providers::{AuthProvider, NullAuthProvider};
use std::time::Duration;

#[tokio::test]
async fn test_accepts_any_credentials() {
    let provider = NullAuthProvider::new("null");
    let session = provider
        .authenticate(&AuthCredentials::password("alice", "whatever").with_email("a@x.io"))
        .await
        .unwrap();

    assert_eq!(session.provider_name, "null");
    assert_eq!(session.provider_type, ProviderType::Token);
    assert_eq!(session.user.username, "alice");
    assert_eq!(session.user.email.as_deref(), Some("a@x.io"));
    assert!(session.token.refresh_token.is_some());
    assert!(session.is_valid());
    assert_eq!(provider.authenticate_calls(), 1);
}

#[tokio::test]
async fn test_scripted_failure_can_be_cleared() {
    let provider = NullAuthProvider::new("flaky").failing_with(AuthErrorCode::ProviderError);
    let credentials = AuthCredentials::password("alice", "pw");

    let err = provider.authenticate(&credentials).await.unwrap_err();
    assert_eq!(err.code, AuthErrorCode::ProviderError);

    provider.set_failure(None);
    assert!(provider.authenticate(&credentials).await.is_ok());

    let metrics = provider.performance_metrics();
    assert_eq!(metrics.total_requests, 2);
    assert_eq!(metrics.failed_requests, 1);
    assert_eq!(metrics.successful_requests, 1);

    provider.reset_performance_metrics();
    assert_eq!(provider.performance_metrics().total_requests, 0);
}

#[tokio::test]
async fn test_health_follows_the_scripted_flag() {
    let provider = NullAuthProvider::new("null");
    assert!(provider.health_check().await.is_healthy());

    provider.set_healthy(false);
    let result = provider.health_check().await;
    assert!(!result.is_healthy());
    assert!(!provider.is_healthy().await);
}

#[tokio::test]
async fn test_refresh_requires_a_previous_login() {
    let provider = NullAuthProvider::new("null");
    let err = provider.refresh_token("rt_x").await.unwrap_err();
    assert_eq!(err.code, AuthErrorCode::SessionNotFound);

    provider
        .authenticate(&AuthCredentials::password("alice", "pw"))
        .await
        .unwrap();
    let refreshed = provider.refresh_token("rt_x").await.unwrap();
    assert_eq!(refreshed.user.username, "alice");
}

#[tokio::test]
async fn test_lifecycle_tracks_initialization() {
    let provider = NullAuthProvider::new("null").with_init_delay(Duration::from_millis(5));
    assert!(!provider.is_initialized());
    assert_eq!(provider.uptime(), Duration::ZERO);

    provider.initialize().await.unwrap();
    assert!(provider.is_initialized());
    assert_eq!(provider.initialize_calls(), 1);

    provider.shutdown(Duration::from_secs(1)).await.unwrap();
    assert!(!provider.is_initialized());
    assert_eq!(provider.shutdown_calls(), 1);
}

#[tokio::test]
async fn test_failing_initialization() {
    let provider = NullAuthProvider::new("broken").failing_init_with(AuthErrorCode::ProviderError);
    let err = provider.initialize().await.unwrap_err();
    assert_eq!(err.code, AuthErrorCode::ProviderError);
    assert!(!provider.is_initialized());
}

#[tokio::test]
async fn test_signout_without_capability_is_not_supported() {
    let provider = NullAuthProvider::new("null")
        .with_type(ProviderType::Saml)
        .with_capabilities(vec![ProviderCapability::Authenticate]);

    let err = provider.signout().await.unwrap_err();
    assert_eq!(err.code, AuthErrorCode::SignoutNotSupported);
    assert_eq!(provider.signout_calls(), 1);
    assert_eq!(provider.provider_type(), ProviderType::Saml);
}

#[tokio::test]
async fn test_registration_is_not_supported_by_default() {
    let provider = NullAuthProvider::new("null");
    let err = provider
        .register(&Default::default())
        .await
        .unwrap_err();
    assert_eq!(err.code, AuthErrorCode::RegistrationNotSupported);
    assert!(!err.code.is_provider_fault());
}
