//! Unit tests for authentication value objects

use aegis_domain::{
    AuthCredentials, AuthSession, AuthToken, AuthUser, ProviderPriority, ProviderType,
};
use chrono::Duration;

#[test]
fn test_provider_type_parsing() {
    assert_eq!("LDAP".parse::<ProviderType>().unwrap(), ProviderType::Ldap);
    assert_eq!("oidc".parse::<ProviderType>().unwrap(), ProviderType::OAuth);
    assert_eq!(
        "kerberos".parse::<ProviderType>().unwrap(),
        ProviderType::Custom("kerberos".to_string())
    );
}

#[test]
fn test_provider_type_serializes_as_string() {
    let json = serde_json::to_string(&ProviderType::Saml).unwrap();
    assert_eq!(json, "\"saml\"");
    let back: ProviderType = serde_json::from_str("\"local\"").unwrap();
    assert_eq!(back, ProviderType::Local);
}

#[test]
fn test_priority_ordering() {
    assert!(ProviderPriority::Critical > ProviderPriority::High);
    assert!(ProviderPriority::High > ProviderPriority::Normal);
    assert!(ProviderPriority::Normal > ProviderPriority::Backup);
    assert_eq!(ProviderPriority::default(), ProviderPriority::Normal);
    assert_eq!(
        "critical".parse::<ProviderPriority>().unwrap(),
        ProviderPriority::Critical
    );
    assert!("urgent".parse::<ProviderPriority>().is_err());
}

#[test]
fn test_credentials_debug_redacts_secrets() {
    let credentials = AuthCredentials::password("alice", "s3cret-pass");
    let debug = format!("{credentials:?}");
    assert!(debug.contains("alice"));
    assert!(!debug.contains("s3cret-pass"));
}

#[test]
fn test_credentials_identifier_falls_back_to_email() {
    let credentials = AuthCredentials::password("", "pw").with_email("a@example.com");
    assert_eq!(credentials.identifier(), Some("a@example.com"));
}

#[test]
fn test_token_expiry() {
    let token = AuthToken::bearer("abc", Duration::minutes(5));
    assert!(!token.is_expired());
    assert!(token.expires_within(Duration::minutes(10)));
    assert!(!token.expires_within(Duration::minutes(1)));

    let expired = AuthToken::bearer("abc", Duration::seconds(-1));
    assert!(expired.is_expired());
}

#[test]
fn test_session_follows_token_expiry() {
    let token = AuthToken::bearer("abc", Duration::hours(1));
    let expires_at = token.expires_at;
    let session = AuthSession::new(
        AuthUser::new("u-1", "alice"),
        token,
        ProviderType::Local,
        "local",
    );

    assert_eq!(session.expires_at, expires_at);
    assert_eq!(session.provider_name, "local");
    assert!(session.is_valid());
}
