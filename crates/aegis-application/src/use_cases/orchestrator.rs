//! Authentication Orchestrator Use Case
//!
//! Entry point of the authentication API. Every attempt runs through the
//! same pipeline:
//!
//! ```text
//! validate ─▶ rate limit ─▶ suspicious activity ─▶ best provider ─▶ breaker/failover ─▶ persist
//! ```
//!
//! Invalid or blocked attempts never reach a provider.

use crate::providers::{LifecycleReport, ProviderManager};
use crate::use_cases::reports::{
    OrchestratorState, OrchestratorStatistics, SignoutFailure, SignoutReport,
};
use crate::validation::AuthValidator;
use aegis_domain::constants::{SESSION_METADATA_PROVIDER, SESSION_METADATA_REQUEST_ID};
use aegis_domain::error::{AuthError, AuthErrorCode, AuthResult, Error};
use aegis_domain::events::{AuthEvent, AuthEventKind, LogLevel};
use aegis_domain::ports::{
    AuthLogger, AuthMetrics, AuthRepository, ConfigProvider, ConfigProviderExt, SecurityService,
};
use aegis_domain::value_objects::{
    AuthCredentials, AuthSession, AuthUser, ProviderCapability, RegistrationOutcome,
    RegistrationRequest, SecurityContext, ValidationResult,
};
use aegis_infrastructure::constants::{
    MANAGER_HEALTH_INTERVAL_MS, PROVIDER_INIT_TIMEOUT_MS, PROVIDER_SHUTDOWN_TIMEOUT_MS,
    SESSION_REFRESH_WINDOW_SECS, SESSION_TTL_SECS,
};
use aegis_infrastructure::health::HealthReport;
use aegis_infrastructure::utils::TimedOperation;
use futures::future::join_all;
use serde_json::json;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Collaborators of an [`AuthOrchestrator`]
#[derive(Clone)]
pub struct AuthOrchestratorDeps {
    /// Provider registry
    pub provider_manager: Arc<ProviderManager>,
    /// Input validator
    pub validator: Arc<AuthValidator>,
    /// Session and user persistence
    pub repository: Arc<dyn AuthRepository>,
    /// Authentication event sink
    pub logger: Arc<dyn AuthLogger>,
    /// Authentication counters
    pub metrics: Arc<dyn AuthMetrics>,
    /// Rate limiting and suspicious activity screening
    pub security: Arc<dyn SecurityService>,
    /// Keyed configuration
    pub config: Arc<dyn ConfigProvider>,
}

#[derive(Debug, Clone)]
struct OrchestratorSettings {
    enable_fallback: bool,
    enable_health_monitoring: bool,
    init_timeout: Duration,
    shutdown_timeout: Duration,
    manager_interval: Duration,
    session_ttl: chrono::Duration,
    refresh_window: chrono::Duration,
}

impl OrchestratorSettings {
    fn from_config(config: &dyn ConfigProvider) -> Self {
        Self {
            enable_fallback: config.get("orchestrator.enable_fallback").unwrap_or(true),
            enable_health_monitoring: config
                .get("orchestrator.enable_health_monitoring")
                .unwrap_or(true),
            init_timeout: Duration::from_millis(
                config
                    .get("orchestrator.init_timeout_ms")
                    .unwrap_or(PROVIDER_INIT_TIMEOUT_MS),
            ),
            shutdown_timeout: Duration::from_millis(
                config
                    .get("orchestrator.shutdown_timeout_ms")
                    .unwrap_or(PROVIDER_SHUTDOWN_TIMEOUT_MS),
            ),
            manager_interval: Duration::from_millis(
                config
                    .get("health.manager_interval_ms")
                    .unwrap_or(MANAGER_HEALTH_INTERVAL_MS),
            ),
            session_ttl: chrono::Duration::seconds(
                config.get("session.ttl_secs").unwrap_or(SESSION_TTL_SECS),
            ),
            refresh_window: chrono::Duration::seconds(
                config
                    .get("session.refresh_window_secs")
                    .unwrap_or(SESSION_REFRESH_WINDOW_SECS),
            ),
        }
    }
}

/// Authentication orchestrator
///
/// # Example
///
/// ```ignore
/// use aegis_application::use_cases::{AuthOrchestrator, AuthOrchestratorDeps};
///
/// let orchestrator = AuthOrchestrator::new(deps);
/// orchestrator.initialize().await?;
/// let session = orchestrator
///     .authenticate(&AuthCredentials::password("alice", "Corr3ct-horse"), Some(&context))
///     .await?;
/// ```
pub struct AuthOrchestrator {
    deps: AuthOrchestratorDeps,
    settings: OrchestratorSettings,
    state: RwLock<OrchestratorState>,
}

impl AuthOrchestrator {
    /// Orchestrator over `deps`; call [`initialize`](Self::initialize) before use
    pub fn new(deps: AuthOrchestratorDeps) -> Self {
        let settings = OrchestratorSettings::from_config(deps.config.as_ref());
        Self {
            deps,
            settings,
            state: RwLock::new(OrchestratorState::Uninitialized),
        }
    }

    /// Provider registry
    pub fn provider_manager(&self) -> &Arc<ProviderManager> {
        &self.deps.provider_manager
    }

    /// Input validator
    pub fn validator(&self) -> &Arc<AuthValidator> {
        &self.deps.validator
    }

    /// Current lifecycle state
    pub fn state(&self) -> OrchestratorState {
        *self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_state(&self, state: OrchestratorState) {
        *self.state.write().unwrap_or_else(PoisonError::into_inner) = state;
    }

    fn ensure_ready(&self) -> AuthResult<()> {
        match self.state() {
            OrchestratorState::Ready => Ok(()),
            state => Err(AuthError::new(
                AuthErrorCode::NotInitialized,
                "Authentication service is not initialized",
            )
            .with_detail("state", json!(state))),
        }
    }

    /// Initialize every provider and start manager-level monitoring
    ///
    /// All or nothing: unless at least one provider initializes, the
    /// orchestrator ends up `Failed` and every request is rejected with
    /// `NOT_INITIALIZED`. Providers that failed are disabled so they are
    /// never selected.
    pub async fn initialize(&self) -> AuthResult<()> {
        {
            let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
            match *state {
                OrchestratorState::Ready => return Ok(()),
                OrchestratorState::Initializing => {
                    return Err(AuthError::new(
                        AuthErrorCode::NotInitialized,
                        "Initialization is already in progress",
                    ));
                }
                _ => *state = OrchestratorState::Initializing,
            }
        }

        let manager = &self.deps.provider_manager;
        let report = manager
            .initialize_all_providers(self.settings.init_timeout)
            .await;

        if !report.any_succeeded() {
            self.set_state(OrchestratorState::Failed);
            let failures: Vec<_> = report
                .failed()
                .into_iter()
                .map(|(provider, e)| json!({ "provider": provider, "code": e.code }))
                .collect();
            error!(failed = failures.len(), "No provider could be initialized");
            return Err(AuthError::new(
                AuthErrorCode::NotInitialized,
                "No provider could be initialized",
            )
            .with_detail("failures", json!(failures)));
        }

        for (provider, e) in report.failed() {
            warn!(provider = %provider, code = %e.code, "Disabling provider that failed to initialize");
            if let Err(e) = manager.set_provider_enabled(provider, false) {
                debug!(provider = %provider, error = %e, "Provider vanished during initialization");
            }
        }

        if self.settings.enable_health_monitoring {
            if let Err(e) = manager.start_health_monitoring(self.settings.manager_interval) {
                self.set_state(OrchestratorState::Failed);
                error!(error = %e, "Health monitoring could not start");
                return Err(AuthError::new(
                    AuthErrorCode::NotInitialized,
                    "Health monitoring could not start",
                )
                .with_detail("cause", json!(e.message)));
            }
        }
        self.set_state(OrchestratorState::Ready);
        info!(
            providers = report.succeeded().len(),
            fallback = self.settings.enable_fallback,
            "Authentication service ready"
        );
        Ok(())
    }

    /// Authenticate `credentials`, persist and return the session
    pub async fn authenticate(
        &self,
        credentials: &AuthCredentials,
        context: Option<&SecurityContext>,
    ) -> AuthResult<AuthSession> {
        self.ensure_ready()?;
        let timer = TimedOperation::start();
        let identifier = credentials.identifier().unwrap_or("anonymous").to_string();
        let request_id = context.map(|c| c.request_id.as_str());

        self.deps.logger.log(
            event(AuthEventKind::LoginAttempt, "Authentication attempt", request_id)
                .with_user(&identifier),
        );

        let validation = self.deps.validator.validate_credentials(credentials).await;
        if !validation.is_valid {
            let error = validation_error(&validation);
            self.deps.logger.log(
                event(AuthEventKind::ValidationFailed, &error.message, request_id)
                    .with_level(LogLevel::Warn)
                    .with_user(&identifier)
                    .with_detail("errors", error_codes(&validation)),
            );
            return Err(error);
        }

        let user_key = format!("user:{identifier}");
        let rate_key = context.map_or_else(|| user_key.clone(), |c| c.rate_limit_key(&identifier));
        self.screen(credentials, context, &identifier, &rate_key)
            .await?;

        let provider = self
            .deps
            .provider_manager
            .get_best_provider(credentials.provider_type.as_ref())
            .inspect_err(|e| {
                self.deps.logger.log_error(
                    event(AuthEventKind::LoginFailure, "No provider available", request_id)
                        .with_user(&identifier),
                    e,
                );
            })?;
        let primary = provider.name().to_string();
        self.deps.metrics.record_attempt(&primary);

        let outcome = if self.settings.enable_fallback {
            self.deps
                .provider_manager
                .execute_with_failover(&primary, |p| async move {
                    p.authenticate(credentials).await
                })
                .await
        } else {
            self.deps
                .provider_manager
                .execute_on(&primary, |p| async move { p.authenticate(credentials).await })
                .await
        };

        match outcome {
            Ok(session) => {
                let served_by = session.provider_name.clone();
                if served_by != primary {
                    self.deps.logger.log(
                        event(AuthEventKind::ProviderFailover, "Request served by fallback provider", request_id)
                            .with_level(LogLevel::Warn)
                            .with_provider(&served_by)
                            .with_detail("primary", json!(primary)),
                    );
                }
                let session = self.finalize_session(session, request_id);
                self.persist(&session).await?;

                self.record_outcome(&rate_key, &user_key, true).await;
                self.deps.metrics.record_success(&served_by, timer.elapsed());
                self.deps.logger.log(
                    event(AuthEventKind::LoginSuccess, "Authentication succeeded", request_id)
                        .with_user(&session.user.id)
                        .with_provider(&served_by),
                );
                Ok(session)
            }
            Err(e) => {
                self.record_outcome(&rate_key, &user_key, false).await;
                self.deps
                    .metrics
                    .record_failure(&primary, &e.code, timer.elapsed());
                self.deps.logger.log_error(
                    event(AuthEventKind::LoginFailure, "Authentication failed", request_id)
                        .with_user(&identifier)
                        .with_provider(&primary),
                    &e,
                );
                Err(e)
            }
        }
    }

    /// Rate limit and suspicious activity gate
    async fn screen(
        &self,
        credentials: &AuthCredentials,
        context: Option<&SecurityContext>,
        identifier: &str,
        rate_key: &str,
    ) -> AuthResult<()> {
        let request_id = context.map(|c| c.request_id.as_str());

        let decision = self.deps.security.check_rate_limit(rate_key).await;
        if !decision.allowed {
            let retry_after_ms = decision
                .retry_after
                .map_or(0, |d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX));
            self.deps.logger.log_security(
                event(AuthEventKind::RateLimited, "Authentication rate limited", request_id)
                    .with_level(LogLevel::Warn)
                    .with_user(identifier)
                    .with_detail("key", json!(rate_key))
                    .with_detail("retry_after_ms", json!(retry_after_ms)),
            );
            return Err(AuthError::new(
                AuthErrorCode::RateLimited,
                "Too many authentication attempts",
            )
            .with_detail("retry_after_ms", json!(retry_after_ms)));
        }

        let Some(context) = context else {
            return Ok(());
        };

        let headers = self.deps.security.validate_security_headers(&context.headers);
        if !headers.valid {
            self.deps.logger.log(
                event(AuthEventKind::SecurityAlert, "Security headers incomplete", request_id)
                    .with_level(LogLevel::Warn)
                    .with_detail("missing", json!(headers.missing))
                    .with_detail("issues", json!(headers.issues)),
            );
        }

        let report = self
            .deps
            .security
            .detect_suspicious_activity(credentials, context)
            .await;
        if report.blocked {
            self.deps.logger.log_security(
                event(AuthEventKind::SecurityAlert, "Suspicious authentication blocked", request_id)
                    .with_level(LogLevel::Error)
                    .with_user(identifier)
                    .with_detail("risk_score", json!(report.risk_score))
                    .with_detail("reasons", json!(report.reasons)),
            );
            return Err(AuthError::new(
                AuthErrorCode::SuspiciousActivity,
                "Authentication attempt blocked",
            )
            .with_detail("risk_score", json!(report.risk_score)));
        }
        if report.suspicious {
            self.deps.logger.log_security(
                event(AuthEventKind::SecurityAlert, "Suspicious authentication allowed", request_id)
                    .with_level(LogLevel::Warn)
                    .with_user(identifier)
                    .with_detail("risk_score", json!(report.risk_score))
                    .with_detail("reasons", json!(report.reasons)),
            );
        }
        Ok(())
    }

    async fn record_outcome(&self, rate_key: &str, user_key: &str, success: bool) {
        self.deps.security.record_outcome(rate_key, success).await;
        if user_key != rate_key {
            self.deps.security.record_outcome(user_key, success).await;
        }
    }

    /// Stamp provenance and cap the lifetime at the session TTL
    fn finalize_session(&self, session: AuthSession, request_id: Option<&str>) -> AuthSession {
        let provider = session.provider_name.clone();
        let mut session = session.with_metadata(SESSION_METADATA_PROVIDER, json!(provider));
        if let Some(request_id) = request_id {
            session = session.with_metadata(SESSION_METADATA_REQUEST_ID, json!(request_id));
        }
        let cap = session.created_at + self.settings.session_ttl;
        if session.expires_at > cap {
            session.expires_at = cap;
        }
        session
    }

    async fn persist(&self, session: &AuthSession) -> AuthResult<()> {
        let repository = &self.deps.repository;
        repository
            .clear()
            .await
            .map_err(|e| repository_failure(e, "clear"))?;
        repository
            .store_session(session)
            .await
            .map_err(|e| repository_failure(e, "store session"))?;
        if let Some(refresh_token) = &session.token.refresh_token {
            repository
                .store_refresh_token(refresh_token)
                .await
                .map_err(|e| repository_failure(e, "store refresh token"))?;
        }
        Ok(())
    }

    /// Persisted session, without contacting any provider
    ///
    /// An expired session is removed and reported as absent.
    pub async fn get_current_session(&self) -> AuthResult<Option<AuthSession>> {
        let session = self
            .deps
            .repository
            .get_session()
            .await
            .map_err(|e| repository_failure(e, "read session"))?;
        match session {
            Some(session) if !session.is_valid() => {
                self.expire(&session).await?;
                Ok(None)
            }
            other => Ok(other),
        }
    }

    async fn expire(&self, session: &AuthSession) -> AuthResult<()> {
        self.deps
            .repository
            .clear()
            .await
            .map_err(|e| repository_failure(e, "clear"))?;
        self.deps.logger.log(
            event(AuthEventKind::SessionExpired, "Session expired", None)
                .with_user(&session.user.id)
                .with_provider(&session.provider_name),
        );
        Ok(())
    }

    /// Check the persisted session with its token rules and issuing provider
    ///
    /// A session close to expiry is refreshed when the provider supports it.
    pub async fn validate_current_session(&self) -> AuthResult<AuthSession> {
        self.ensure_ready()?;
        let session = self.get_current_session().await?.ok_or_else(|| {
            AuthError::new(AuthErrorCode::SessionNotFound, "No active session")
        })?;

        let token_check = self.deps.validator.validate_token(&session.token).await;
        if !token_check.is_valid {
            self.expire(&session).await?;
            return Err(AuthError::new(
                AuthErrorCode::SessionExpired,
                token_check.first_error().unwrap_or("Session token is invalid"),
            ));
        }

        let name = session.provider_name.clone();
        let Some(provider) = self.deps.provider_manager.get_provider(&name) else {
            debug!(provider = %name, "Issuing provider is gone, keeping the local verdict");
            return Ok(session);
        };

        let still_valid = self
            .deps
            .provider_manager
            .execute_on(&name, |p| async move { p.validate_session().await })
            .await?;
        if !still_valid {
            self.expire(&session).await?;
            return Err(AuthError::new(
                AuthErrorCode::SessionExpired,
                "Session was revoked by the provider",
            ));
        }

        if session.token.expires_within(self.settings.refresh_window)
            && provider.supports(ProviderCapability::RefreshToken)
        {
            debug!(provider = %name, "Session close to expiry, refreshing");
            return self.refresh_session().await;
        }
        Ok(session)
    }

    /// Exchange the persisted refresh token for a new session
    pub async fn refresh_session(&self) -> AuthResult<AuthSession> {
        self.ensure_ready()?;
        let repository = &self.deps.repository;
        let session = repository
            .get_session()
            .await
            .map_err(|e| repository_failure(e, "read session"))?
            .ok_or_else(|| AuthError::new(AuthErrorCode::SessionNotFound, "No session to refresh"))?;
        let refresh_token = repository
            .get_refresh_token()
            .await
            .map_err(|e| repository_failure(e, "read refresh token"))?
            .or_else(|| session.token.refresh_token.clone())
            .ok_or_else(|| {
                AuthError::new(AuthErrorCode::SessionExpired, "Session has no refresh token")
            })?;

        let name = session.provider_name.clone();
        let refresh_token = refresh_token.as_str();
        let outcome = self
            .deps
            .provider_manager
            .execute_on(&name, |p| async move { p.refresh_token(refresh_token).await })
            .await;

        match outcome {
            Ok(refreshed) => {
                let refreshed = self.finalize_session(refreshed, None);
                self.persist(&refreshed).await?;
                self.deps.logger.log(
                    event(AuthEventKind::SessionRefreshed, "Session refreshed", None)
                        .with_user(&refreshed.user.id)
                        .with_provider(&name),
                );
                Ok(refreshed)
            }
            Err(e) => {
                if e.code == AuthErrorCode::SessionExpired {
                    self.expire(&session).await?;
                }
                self.deps.logger.log_error(
                    event(AuthEventKind::SessionExpired, "Session refresh failed", None)
                        .with_user(&session.user.id)
                        .with_provider(&name),
                    &e,
                );
                Err(e)
            }
        }
    }

    /// Clear the persisted session and sign out of every capable provider
    ///
    /// Individual provider failures are collected in the report.
    pub async fn global_signout(&self) -> AuthResult<SignoutReport> {
        let repository = &self.deps.repository;
        let had_session = match repository.get_session().await {
            Ok(session) => session.is_some(),
            Err(e) => {
                error!(error = %e, "Failed to read session during sign out");
                false
            }
        };
        let session_cleared = match repository.clear().await {
            Ok(()) => had_session,
            Err(e) => {
                error!(error = %e, "Failed to clear session during sign out");
                false
            }
        };

        let manager = &self.deps.provider_manager;
        let providers = manager.providers_where(|p| p.supports(ProviderCapability::Signout));
        let outcomes = join_all(providers.iter().map(|provider| async move {
            let name = provider.name().to_string();
            let outcome = manager
                .execute_on(&name, |p| async move { p.signout().await })
                .await;
            (name, outcome)
        }))
        .await;

        let mut report = SignoutReport {
            session_cleared,
            ..SignoutReport::default()
        };
        for (provider, outcome) in outcomes {
            match outcome {
                Ok(()) => report.providers_signed_out.push(provider),
                Err(e) => {
                    warn!(provider = %provider, code = %e.code, "Provider sign out failed");
                    report.failures.push(SignoutFailure {
                        provider,
                        code: e.code,
                        message: e.message,
                    });
                }
            }
        }

        self.deps.logger.log(
            event(AuthEventKind::Logout, "Global sign out", None)
                .with_detail("providers", json!(report.providers_signed_out))
                .with_detail("failures", json!(report.failures.len())),
        );
        Ok(report)
    }

    /// Register a user with provider `provider_name`
    pub async fn register_user(
        &self,
        provider_name: &str,
        request: &RegistrationRequest,
    ) -> AuthResult<RegistrationOutcome> {
        self.ensure_ready()?;
        let credentials = AuthCredentials {
            username: Some(request.username.clone()),
            email: request.email.clone(),
            password: Some(request.password.clone()),
            ..AuthCredentials::default()
        };
        let validation = self.deps.validator.validate_credentials(&credentials).await;
        if !validation.is_valid {
            let error = validation_error(&validation);
            self.deps.logger.log(
                event(AuthEventKind::ValidationFailed, &error.message, None)
                    .with_level(LogLevel::Warn)
                    .with_user(&request.username)
                    .with_detail("errors", error_codes(&validation)),
            );
            return Err(error);
        }

        let outcome = self
            .deps
            .provider_manager
            .execute_on(provider_name, |p| async move { p.register(request).await })
            .await?;
        self.deps
            .repository
            .create_user(&outcome.user, outcome.activation_code.as_deref())
            .await
            .map_err(|e| repository_failure(e, "create user"))?;

        self.deps.logger.log(
            event(AuthEventKind::Registration, "User registered", None)
                .with_user(&outcome.user.id)
                .with_provider(provider_name)
                .with_detail("activation_required", json!(outcome.activation_required)),
        );
        Ok(outcome)
    }

    /// Activate `identifier` with `code` at provider `provider_name`
    pub async fn activate_user(
        &self,
        provider_name: &str,
        identifier: &str,
        code: &str,
    ) -> AuthResult<AuthUser> {
        self.ensure_ready()?;
        let user = self
            .deps
            .provider_manager
            .execute_on(provider_name, |p| async move {
                p.activate(identifier, code).await
            })
            .await?;

        match self.deps.repository.activate_user(identifier).await {
            Ok(_) | Err(Error::NotFound { .. }) => {}
            Err(e) => return Err(repository_failure(e, "activate user")),
        }
        self.deps.logger.log(
            event(AuthEventKind::Activation, "Account activated", None)
                .with_user(&user.id)
                .with_provider(provider_name),
        );
        Ok(user)
    }

    /// Issue a fresh activation code for `identifier` at provider `provider_name`
    pub async fn resend_activation_code(
        &self,
        provider_name: &str,
        identifier: &str,
    ) -> AuthResult<String> {
        self.ensure_ready()?;
        let code = self
            .deps
            .provider_manager
            .execute_on(provider_name, |p| async move {
                p.resend_activation_code(identifier).await
            })
            .await?;

        match self
            .deps
            .repository
            .resend_activation_code(identifier, &code)
            .await
        {
            Ok(resends) => debug!(provider = %provider_name, resends, "Activation code reissued"),
            Err(Error::NotFound { .. }) => {}
            Err(e) => return Err(repository_failure(e, "resend activation code")),
        }
        Ok(code)
    }

    /// Health report over every registered provider
    pub fn health_report(&self) -> HealthReport {
        self.deps.provider_manager.health().get_health_report()
    }

    /// Lifecycle state, registry, authentication and validation statistics
    pub fn statistics(&self) -> OrchestratorStatistics {
        OrchestratorStatistics {
            state: self.state(),
            manager: self.deps.provider_manager.get_manager_statistics(),
            auth: self.deps.metrics.snapshot(),
            validation: self.deps.validator.get_statistics(),
        }
    }

    /// Stop all monitoring and shut every provider down
    pub async fn shutdown(&self) -> LifecycleReport {
        self.set_state(OrchestratorState::ShutDown);
        let manager = &self.deps.provider_manager;
        let report = manager
            .shutdown_all_providers(self.settings.shutdown_timeout)
            .await;
        manager.health().stop_all_monitoring();
        info!(
            succeeded = report.succeeded().len(),
            failed = report.failed().len(),
            "Authentication service shut down"
        );
        report
    }
}

impl std::fmt::Debug for AuthOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthOrchestrator")
            .field("state", &self.state())
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

fn event(kind: AuthEventKind, message: &str, request_id: Option<&str>) -> AuthEvent {
    let event = AuthEvent::new(kind, message);
    match request_id {
        Some(request_id) => event.with_request_id(request_id),
        None => event,
    }
}

fn error_codes(result: &ValidationResult) -> serde_json::Value {
    json!(result.errors.iter().map(|e| e.code.as_str()).collect::<Vec<_>>())
}

fn validation_error(result: &ValidationResult) -> AuthError {
    AuthError::validation(result.first_error().unwrap_or("Invalid input"))
        .with_detail("errors", error_codes(result))
}

/// Internal failures are logged with their raw text and surfaced as `INTERNAL_ERROR`
fn repository_failure(error: Error, operation: &str) -> AuthError {
    error!(error = %error, operation, "Repository operation failed");
    AuthError::from(error)
}
