//! Stack Bootstrap
//!
//! Composes the authentication stack from an [`AppConfig`]:
//!
//! 1. One [`HealthCheckManager`] with the `health` and `resilience` sections
//!    as the default probe and breaker policy
//! 2. One identity provider per `[[providers]]` entry, configured with the
//!    entry's `settings` and registered with its options
//! 3. The validator, repository, event logger, metrics and security service
//! 4. The [`AuthOrchestrator`] over all of the above
//!
//! The returned stack is not initialized; call
//! [`AuthOrchestrator::initialize`] before serving requests.

use aegis_application::providers::{ProviderManager, ProviderOptions};
use aegis_application::use_cases::{AuthOrchestrator, AuthOrchestratorDeps};
use aegis_application::validation::AuthValidator;
use aegis_domain::ports::AuthProvider;
use aegis_domain::value_objects::ProviderType;
use aegis_infrastructure::config::{
    AppConfig, ConfigLoader, FigmentConfigProvider, ProviderEntry, SecurityConfig,
};
use aegis_infrastructure::health::{HealthCheckManager, ProviderHealthConfig};
use aegis_providers::{
    DefaultSecurityService, DirectoryAuthProvider, InMemoryAuthMetrics, InMemoryAuthRepository,
    InMemoryBreachedPasswordSource, LocalAccountProvider, NullAuthProvider, SecurityPolicy,
    TracingAuthLogger,
};
use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Orchestrator plus handles on its in-process collaborators
pub struct AuthStack {
    /// Entry point of the authentication API
    pub orchestrator: AuthOrchestrator,
    /// Session and user store
    pub repository: Arc<InMemoryAuthRepository>,
    /// Event log
    pub logger: Arc<TracingAuthLogger>,
    /// Authentication counters
    pub metrics: Arc<InMemoryAuthMetrics>,
    /// Rate limiter and risk scorer
    pub security: Arc<DefaultSecurityService>,
}

impl std::fmt::Debug for AuthStack {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthStack")
            .field("orchestrator", &self.orchestrator)
            .finish_non_exhaustive()
    }
}

/// Load and validate configuration from an optional explicit path
pub fn load_config(config_path: Option<&Path>) -> Result<AppConfig> {
    let loader = match config_path {
        Some(path) => ConfigLoader::new().with_config_path(path),
        None => ConfigLoader::new(),
    };
    loader.load().context("Failed to load configuration")
}

/// Security service policy from the `security` section
pub fn security_policy(config: &SecurityConfig) -> SecurityPolicy {
    SecurityPolicy {
        rate_limit_enabled: config.rate_limit_enabled,
        window: Duration::from_secs(config.rate_limit_window_secs),
        max_attempts: config.rate_limit_max_attempts,
        suspicious_failure_threshold: config.suspicious_failure_threshold,
        block_risk_score: config.block_risk_score,
        required_headers: config
            .required_headers
            .iter()
            .map(|h| h.to_lowercase())
            .collect(),
    }
}

/// Identity provider for a declared entry
///
/// `ldap` entries get a directory provider and `local` entries a local
/// account provider; every other kind is served by a null provider
/// reporting that kind.
pub fn build_provider(entry: &ProviderEntry) -> Arc<dyn AuthProvider> {
    match &entry.kind {
        ProviderType::Ldap => Arc::new(DirectoryAuthProvider::new(entry.name.as_str())),
        ProviderType::Local => Arc::new(LocalAccountProvider::new(entry.name.as_str())),
        kind => Arc::new(NullAuthProvider::new(entry.name.as_str()).with_type(kind.clone())),
    }
}

/// Build the full stack from `config`
///
/// Must be called from within a tokio runtime.
pub async fn init_app(config: &AppConfig) -> Result<AuthStack> {
    let health = Arc::new(HealthCheckManager::new(ProviderHealthConfig::from_config(
        &config.health,
        &config.resilience,
    )));
    let manager = Arc::new(ProviderManager::new(health));

    for entry in &config.providers {
        let provider = build_provider(entry);
        provider
            .configure(&entry.settings)
            .await
            .with_context(|| format!("Failed to configure provider {}", entry.name))?;
        manager
            .register_provider(provider, ProviderOptions::from(entry))
            .with_context(|| format!("Failed to register provider {}", entry.name))?;
        debug!(provider = %entry.name, kind = %entry.kind, priority = ?entry.priority, "Provider registered");
    }

    let validator = Arc::new(
        AuthValidator::new(
            &config.validation,
            Some(Arc::new(InMemoryBreachedPasswordSource::new())),
        )
        .context("Failed to build the credential validator")?,
    );
    let repository = Arc::new(InMemoryAuthRepository::new());
    let logger = Arc::new(TracingAuthLogger::new(config.logging.event_buffer_size));
    let metrics = Arc::new(InMemoryAuthMetrics::new());
    let security = Arc::new(DefaultSecurityService::new(security_policy(
        &config.security,
    )));
    let keyed_config = Arc::new(
        FigmentConfigProvider::new(config).context("Failed to expose configuration")?,
    );

    let orchestrator = AuthOrchestrator::new(AuthOrchestratorDeps {
        provider_manager: manager,
        validator,
        repository: repository.clone(),
        logger: logger.clone(),
        metrics: metrics.clone(),
        security: security.clone(),
        config: keyed_config,
    });
    info!(providers = config.providers.len(), "Authentication stack assembled");

    Ok(AuthStack {
        orchestrator,
        repository,
        logger,
        metrics,
        security,
    })
}
