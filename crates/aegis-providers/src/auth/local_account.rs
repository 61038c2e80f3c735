//! Local account provider
//!
//! Self-service username/email + password accounts. New accounts start
//! inactive and must be activated with a generated code before they can
//! sign in. Refresh tokens are single-use and rotated on every refresh.

use crate::auth::issue_session;
use crate::constants::{ISSUED_TOKEN_TTL_SECS, SETTING_TOKEN_TTL_SECS};
use crate::utils::{PasswordDigest, generate_activation_code};
use aegis_domain::error::{AuthError, AuthErrorCode, AuthResult};
use aegis_domain::ports::AuthProvider;
use aegis_domain::value_objects::{
    AuthCredentials, AuthSession, AuthUser, ProviderCapability, ProviderPerformanceMetrics,
    ProviderType, RegistrationOutcome, RegistrationRequest,
};
use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Instant;
use tracing::{debug, info};

#[derive(Debug, Clone)]
struct LocalAccount {
    user: AuthUser,
    digest: PasswordDigest,
    activation_code: Option<String>,
    resend_count: u32,
}

/// Provider for locally managed accounts
pub struct LocalAccountProvider {
    name: String,
    token_ttl_secs: AtomicI64,
    /// Keyed by lowercased username
    accounts: DashMap<String, LocalAccount>,
    /// Lowercased email to lowercased username
    emails: DashMap<String, String>,
    /// Outstanding refresh token to lowercased username
    refresh_tokens: DashMap<String, String>,
    performance: Mutex<ProviderPerformanceMetrics>,
}

impl LocalAccountProvider {
    /// Provider with no accounts
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            token_ttl_secs: AtomicI64::new(ISSUED_TOKEN_TTL_SECS),
            accounts: DashMap::new(),
            emails: DashMap::new(),
            refresh_tokens: DashMap::new(),
            performance: Mutex::new(ProviderPerformanceMetrics::default()),
        }
    }

    /// Pending activation code of `identifier`, for out-of-band delivery
    pub fn pending_activation_code(&self, identifier: &str) -> Option<String> {
        let key = self.resolve(identifier)?;
        self.accounts
            .get(&key)
            .and_then(|account| account.activation_code.clone())
    }

    /// Number of accounts
    pub fn account_count(&self) -> usize {
        self.accounts.len()
    }

    fn resolve(&self, identifier: &str) -> Option<String> {
        let key = identifier.to_lowercase();
        if self.accounts.contains_key(&key) {
            return Some(key);
        }
        self.emails.get(&key).map(|username| username.value().clone())
    }

    fn user_not_found(identifier: &str) -> AuthError {
        AuthError::new(
            AuthErrorCode::UserNotFound,
            format!("No account for {identifier}"),
        )
    }

    fn issue(&self, key: &str, user: AuthUser) -> AuthSession {
        let session = issue_session(
            user,
            ProviderType::Local,
            &self.name,
            self.token_ttl_secs.load(Ordering::SeqCst),
        );
        if let Some(refresh) = &session.token.refresh_token {
            self.refresh_tokens.insert(refresh.clone(), key.to_string());
        }
        session
    }

    fn check_password(&self, credentials: &AuthCredentials) -> AuthResult<(String, AuthUser)> {
        let (Some(identifier), Some(password)) = (
            credentials.identifier(),
            credentials.password.as_deref().filter(|p| !p.is_empty()),
        ) else {
            return Err(AuthError::new(
                AuthErrorCode::MissingCredentials,
                "A username or email and a password are required",
            ));
        };

        let account = self
            .resolve(identifier)
            .and_then(|key| self.accounts.get(&key).map(|a| (key, a.value().clone())));
        let Some((key, account)) = account else {
            return Err(AuthError::credentials_invalid());
        };
        if !account.digest.verify(password) {
            return Err(AuthError::credentials_invalid());
        }
        if !account.user.is_active {
            return Err(AuthError::new(
                AuthErrorCode::CredentialsInvalid,
                "Account has not been activated",
            )
            .with_detail("reason", serde_json::json!("inactive")));
        }
        Ok((key, account.user))
    }
}

impl std::fmt::Debug for LocalAccountProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalAccountProvider")
            .field("name", &self.name)
            .field("accounts", &self.accounts.len())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl AuthProvider for LocalAccountProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn provider_type(&self) -> ProviderType {
        ProviderType::Local
    }

    async fn authenticate(&self, credentials: &AuthCredentials) -> AuthResult<AuthSession> {
        let started = Instant::now();
        let outcome = self.check_password(credentials);
        self.performance
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .record(outcome.is_ok(), started.elapsed());

        let (key, user) = outcome?;
        Ok(self.issue(&key, user))
    }

    async fn refresh_token(&self, refresh_token: &str) -> AuthResult<AuthSession> {
        let Some((_, key)) = self.refresh_tokens.remove(refresh_token) else {
            return Err(AuthError::new(
                AuthErrorCode::SessionExpired,
                "Refresh token is not valid",
            ));
        };
        let user = self
            .accounts
            .get(&key)
            .map(|account| account.user.clone())
            .filter(|user| user.is_active)
            .ok_or_else(|| Self::user_not_found(&key))?;
        debug!(provider = %self.name, "Refresh token rotated");
        Ok(self.issue(&key, user))
    }

    async fn configure(&self, settings: &HashMap<String, Value>) -> AuthResult<()> {
        if let Some(value) = settings.get(SETTING_TOKEN_TTL_SECS) {
            let ttl = value
                .as_i64()
                .filter(|ttl| *ttl > 0)
                .ok_or_else(|| AuthError::validation("token_ttl_secs must be a positive integer"))?;
            self.token_ttl_secs.store(ttl, Ordering::SeqCst);
        }
        Ok(())
    }

    fn capabilities(&self) -> Vec<ProviderCapability> {
        vec![
            ProviderCapability::Authenticate,
            ProviderCapability::SessionValidation,
            ProviderCapability::RefreshToken,
            ProviderCapability::Register,
            ProviderCapability::Activate,
            ProviderCapability::Signout,
            ProviderCapability::ResendActivation,
        ]
    }

    fn performance_metrics(&self) -> ProviderPerformanceMetrics {
        self.performance
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn reset_performance_metrics(&self) {
        *self.performance.lock().unwrap_or_else(PoisonError::into_inner) =
            ProviderPerformanceMetrics::default();
    }

    async fn register(&self, request: &RegistrationRequest) -> AuthResult<RegistrationOutcome> {
        let username = request.username.trim();
        if username.is_empty() || request.password.is_empty() {
            return Err(AuthError::validation(
                "Registration requires a username and a password",
            ));
        }
        let key = username.to_lowercase();
        let email = request.email.as_deref().map(str::to_lowercase);
        if self.accounts.contains_key(&key)
            || email.as_ref().is_some_and(|e| self.emails.contains_key(e))
        {
            return Err(AuthError::validation("Username or email is already registered"));
        }

        let mut user = AuthUser::new(uuid::Uuid::new_v4().to_string(), username);
        user.email.clone_from(&request.email);
        user.display_name.clone_from(&request.display_name);
        user.attributes.clone_from(&request.attributes);
        user.is_active = false;

        let code = generate_activation_code();
        self.accounts.insert(
            key.clone(),
            LocalAccount {
                user: user.clone(),
                digest: PasswordDigest::new(&request.password),
                activation_code: Some(code.clone()),
                resend_count: 0,
            },
        );
        if let Some(email) = email {
            self.emails.insert(email, key);
        }
        info!(provider = %self.name, username = %user.username, "Account registered, pending activation");

        Ok(RegistrationOutcome {
            user,
            activation_required: true,
            activation_code: Some(code),
        })
    }

    async fn activate(&self, identifier: &str, code: &str) -> AuthResult<AuthUser> {
        let key = self
            .resolve(identifier)
            .ok_or_else(|| Self::user_not_found(identifier))?;
        let mut account = self
            .accounts
            .get_mut(&key)
            .ok_or_else(|| Self::user_not_found(identifier))?;

        if account.user.is_active {
            return Ok(account.user.clone());
        }
        if account.activation_code.as_deref() != Some(code) {
            return Err(AuthError::new(
                AuthErrorCode::InvalidActivationCode,
                "Activation code does not match",
            ));
        }
        account.user.is_active = true;
        account.activation_code = None;
        info!(provider = %self.name, username = %account.user.username, "Account activated");
        Ok(account.user.clone())
    }

    async fn signout(&self) -> AuthResult<()> {
        self.refresh_tokens.clear();
        Ok(())
    }

    async fn resend_activation_code(&self, identifier: &str) -> AuthResult<String> {
        let key = self
            .resolve(identifier)
            .ok_or_else(|| Self::user_not_found(identifier))?;
        let mut account = self
            .accounts
            .get_mut(&key)
            .ok_or_else(|| Self::user_not_found(identifier))?;
        if account.user.is_active {
            return Err(AuthError::validation("Account is already active"));
        }
        let code = generate_activation_code();
        account.activation_code = Some(code.clone());
        account.resend_count += 1;
        debug!(provider = %self.name, resends = account.resend_count, "Activation code reissued");
        Ok(code)
    }
}
