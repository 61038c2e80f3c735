//! In-memory repository tests

use aegis_domain::value_objects::{AuthSession, AuthToken, AuthUser, ProviderType};
use aegis_domain::Error;
use aegis_providers::{AuthRepository, InMemoryAuthRepository};

fn session() -> AuthSession {
    AuthSession::new(
        AuthUser::new("u-1", "alice"),
        AuthToken::bearer("at_1", chrono::Duration::minutes(5)),
        ProviderType::Token,
        "primary",
    )
}

#[tokio::test]
async fn test_session_and_refresh_token_round_trip() {
    let repository = InMemoryAuthRepository::new();
    assert!(repository.get_session().await.unwrap().is_none());

    let session = session();
    repository.store_session(&session).await.unwrap();
    repository.store_refresh_token("rt_1").await.unwrap();

    assert_eq!(repository.get_session().await.unwrap(), Some(session));
    assert_eq!(
        repository.get_refresh_token().await.unwrap().as_deref(),
        Some("rt_1")
    );

    repository.remove_session().await.unwrap();
    assert!(repository.get_session().await.unwrap().is_none());
    assert!(repository.get_refresh_token().await.unwrap().is_some());

    repository.clear().await.unwrap();
    assert!(repository.get_refresh_token().await.unwrap().is_none());
}

#[tokio::test]
async fn test_users_are_found_by_username_or_email() {
    let repository = InMemoryAuthRepository::new();
    let mut user = AuthUser::new("u-2", "Bob").with_email("bob@example.com");
    user.is_active = false;
    repository.create_user(&user, Some("123456")).await.unwrap();

    assert_eq!(repository.user_count(), 1);
    assert!(repository.get_user("bob").await.unwrap().is_some());
    assert!(repository.get_user("BOB@example.com").await.unwrap().is_some());
    assert!(repository.get_user("carol").await.unwrap().is_none());
    assert_eq!(repository.activation_code("bob").as_deref(), Some("123456"));
}

#[tokio::test]
async fn test_duplicate_user_is_rejected() {
    let repository = InMemoryAuthRepository::new();
    let user = AuthUser::new("u-2", "bob");
    repository.create_user(&user, None).await.unwrap();

    let err = repository
        .create_user(&AuthUser::new("u-3", "BOB"), None)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidArgument { .. }));
}

#[tokio::test]
async fn test_activation_and_resend() {
    let repository = InMemoryAuthRepository::new();
    let mut user = AuthUser::new("u-2", "bob");
    user.is_active = false;
    repository.create_user(&user, Some("111111")).await.unwrap();

    assert_eq!(
        repository.resend_activation_code("bob", "222222").await.unwrap(),
        1
    );
    assert_eq!(
        repository.resend_activation_code("bob", "333333").await.unwrap(),
        2
    );
    assert_eq!(repository.activation_code("bob").as_deref(), Some("333333"));

    let activated = repository.activate_user("bob").await.unwrap();
    assert!(activated.is_active);
    assert!(repository.activation_code("bob").is_none());
}

#[tokio::test]
async fn test_unknown_user_operations_fail_with_not_found() {
    let repository = InMemoryAuthRepository::new();
    assert!(matches!(
        repository.activate_user("ghost").await.unwrap_err(),
        Error::NotFound { .. }
    ));
    assert!(matches!(
        repository
            .resend_activation_code("ghost", "1")
            .await
            .unwrap_err(),
        Error::NotFound { .. }
    ));
}
