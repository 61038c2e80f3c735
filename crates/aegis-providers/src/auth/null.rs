//! Null identity provider
//!
//! Accepts any credentials (or fails with a configured code) without
//! contacting anything. Every knob can be changed at runtime so tests can
//! script degradations.

use crate::auth::issue_session;
use crate::constants::ISSUED_TOKEN_TTL_SECS;
use aegis_domain::error::{AuthError, AuthErrorCode, AuthResult};
use aegis_domain::ports::AuthProvider;
use aegis_domain::value_objects::{
    AuthCredentials, AuthSession, AuthUser, ProviderCapability, ProviderPerformanceMetrics,
    ProviderType,
};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Mutex, PoisonError, RwLock};
use std::time::{Duration, Instant};
use tracing::debug;

/// Scriptable identity provider
///
/// # Example
///
/// ```ignore
/// use aegis_providers::auth::NullAuthProvider;
///
/// let flaky = NullAuthProvider::new("flaky").failing_with(AuthErrorCode::ProviderError);
/// flaky.set_failure(None); // recovers
/// ```
pub struct NullAuthProvider {
    name: String,
    provider_type: ProviderType,
    capabilities: Vec<ProviderCapability>,
    failure: RwLock<Option<AuthErrorCode>>,
    init_failure: RwLock<Option<AuthErrorCode>>,
    init_delay: RwLock<Duration>,
    healthy: AtomicBool,
    initialized_at: Mutex<Option<Instant>>,
    last_user: Mutex<Option<AuthUser>>,
    performance: Mutex<ProviderPerformanceMetrics>,
    authenticate_calls: AtomicU32,
    signout_calls: AtomicU32,
    initialize_calls: AtomicU32,
    shutdown_calls: AtomicU32,
}

impl NullAuthProvider {
    /// Healthy `Token` provider that accepts everything
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            provider_type: ProviderType::Token,
            capabilities: vec![
                ProviderCapability::Authenticate,
                ProviderCapability::SessionValidation,
                ProviderCapability::RefreshToken,
                ProviderCapability::Signout,
            ],
            failure: RwLock::new(None),
            init_failure: RwLock::new(None),
            init_delay: RwLock::new(Duration::ZERO),
            healthy: AtomicBool::new(true),
            initialized_at: Mutex::new(None),
            last_user: Mutex::new(None),
            performance: Mutex::new(ProviderPerformanceMetrics::default()),
            authenticate_calls: AtomicU32::new(0),
            signout_calls: AtomicU32::new(0),
            initialize_calls: AtomicU32::new(0),
            shutdown_calls: AtomicU32::new(0),
        }
    }

    /// Report a different provider kind
    #[must_use]
    pub fn with_type(mut self, provider_type: ProviderType) -> Self {
        self.provider_type = provider_type;
        self
    }

    /// Advertise a different capability set
    #[must_use]
    pub fn with_capabilities(mut self, capabilities: Vec<ProviderCapability>) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// Fail every authentication with `code`
    #[must_use]
    pub fn failing_with(self, code: AuthErrorCode) -> Self {
        self.set_failure(Some(code));
        self
    }

    /// Fail `initialize` with `code`
    #[must_use]
    pub fn failing_init_with(self, code: AuthErrorCode) -> Self {
        *self
            .init_failure
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(code);
        self
    }

    /// Delay `initialize` by `delay`
    #[must_use]
    pub fn with_init_delay(self, delay: Duration) -> Self {
        *self.init_delay.write().unwrap_or_else(PoisonError::into_inner) = delay;
        self
    }

    /// Change the authentication outcome; `None` accepts again
    pub fn set_failure(&self, code: Option<AuthErrorCode>) {
        *self.failure.write().unwrap_or_else(PoisonError::into_inner) = code;
    }

    /// Change what the session-validity probe reports
    pub fn set_healthy(&self, healthy: bool) {
        self.healthy.store(healthy, Ordering::SeqCst);
    }

    /// `authenticate` invocations
    pub fn authenticate_calls(&self) -> u32 {
        self.authenticate_calls.load(Ordering::SeqCst)
    }

    /// `signout` invocations
    pub fn signout_calls(&self) -> u32 {
        self.signout_calls.load(Ordering::SeqCst)
    }

    /// `initialize` invocations
    pub fn initialize_calls(&self) -> u32 {
        self.initialize_calls.load(Ordering::SeqCst)
    }

    /// `shutdown` invocations
    pub fn shutdown_calls(&self) -> u32 {
        self.shutdown_calls.load(Ordering::SeqCst)
    }

    fn record(&self, success: bool, elapsed: Duration) {
        self.performance
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .record(success, elapsed);
    }
}

impl std::fmt::Debug for NullAuthProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NullAuthProvider")
            .field("name", &self.name)
            .field("provider_type", &self.provider_type)
            .field("healthy", &self.healthy.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl AuthProvider for NullAuthProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn provider_type(&self) -> ProviderType {
        self.provider_type.clone()
    }

    async fn authenticate(&self, credentials: &AuthCredentials) -> AuthResult<AuthSession> {
        let started = Instant::now();
        self.authenticate_calls.fetch_add(1, Ordering::SeqCst);

        let failure = self
            .failure
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        if let Some(code) = failure {
            debug!(provider = %self.name, %code, "Null provider failing as scripted");
            self.record(false, started.elapsed());
            return Err(AuthError::new(
                code,
                format!("Provider {} rejected the request", self.name),
            ));
        }

        let identifier = credentials.identifier().unwrap_or("anonymous");
        let mut user = AuthUser::new(format!("{}:{identifier}", self.name), identifier);
        user.email.clone_from(&credentials.email);
        *self.last_user.lock().unwrap_or_else(PoisonError::into_inner) = Some(user.clone());

        self.record(true, started.elapsed());
        Ok(issue_session(
            user,
            self.provider_type.clone(),
            &self.name,
            ISSUED_TOKEN_TTL_SECS,
        ))
    }

    async fn validate_session(&self) -> AuthResult<bool> {
        Ok(self.healthy.load(Ordering::SeqCst))
    }

    async fn refresh_token(&self, _refresh_token: &str) -> AuthResult<AuthSession> {
        let user = self
            .last_user
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or_else(|| {
                AuthError::new(AuthErrorCode::SessionNotFound, "No session to refresh")
            })?;
        Ok(issue_session(
            user,
            self.provider_type.clone(),
            &self.name,
            ISSUED_TOKEN_TTL_SECS,
        ))
    }

    fn capabilities(&self) -> Vec<ProviderCapability> {
        self.capabilities.clone()
    }

    async fn initialize(&self) -> AuthResult<()> {
        self.initialize_calls.fetch_add(1, Ordering::SeqCst);
        let delay = *self.init_delay.read().unwrap_or_else(PoisonError::into_inner);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        let failure = self
            .init_failure
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        if let Some(code) = failure {
            return Err(AuthError::new(
                code,
                format!("Provider {} failed to initialize", self.name),
            ));
        }
        *self
            .initialized_at
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(Instant::now());
        Ok(())
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

    fn is_initialized(&self) -> bool {
        self.initialized_at
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    fn uptime(&self) -> Duration {
        self.initialized_at
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .map_or(Duration::ZERO, |at| at.elapsed())
    }

    async fn shutdown(&self, _timeout: Duration) -> AuthResult<()> {
        self.shutdown_calls.fetch_add(1, Ordering::SeqCst);
        *self
            .initialized_at
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }

    async fn signout(&self) -> AuthResult<()> {
        self.signout_calls.fetch_add(1, Ordering::SeqCst);
        if !self.supports(ProviderCapability::Signout) {
            return Err(AuthError::not_supported(
                AuthErrorCode::SignoutNotSupported,
                &self.name,
                "sign out",
            ));
        }
        *self.last_user.lock().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}
