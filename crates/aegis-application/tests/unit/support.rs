//! Shared fixtures for the application tests
#![allow(dead_code)]

use aegis_application::providers::{ProviderManager, ProviderOptions};
use aegis_application::use_cases::{AuthOrchestrator, AuthOrchestratorDeps};
use aegis_application::validation::AuthValidator;
use aegis_domain::ports::AuthProvider;
use aegis_domain::value_objects::AuthCredentials;
use aegis_infrastructure::config::{AppConfig, FigmentConfigProvider, ValidationConfig};
use aegis_infrastructure::health::{HealthCheckManager, ProviderHealthConfig};
use aegis_providers::{
    DefaultSecurityService, InMemoryAuthMetrics, InMemoryAuthRepository,
    InMemoryBreachedPasswordSource, NullAuthProvider, SecurityPolicy, TracingAuthLogger,
};
use std::sync::Arc;
use std::time::Duration;

/// Satisfies the default password policy and is not in the breach corpus
pub const PASSWORD: &str = "Str0ng-Passw0rd";

pub fn credentials() -> AuthCredentials {
    AuthCredentials::password("alice", PASSWORD)
}

pub fn null(name: &str) -> Arc<NullAuthProvider> {
    Arc::new(NullAuthProvider::new(name))
}

/// Monitors that never probe on their own during a test
pub fn health_manager() -> Arc<HealthCheckManager> {
    Arc::new(HealthCheckManager::new(
        ProviderHealthConfig::default()
            .with_check_interval(Duration::from_secs(3600))
            .with_timeout(Duration::from_millis(100))
            .with_retries(0),
    ))
}

pub fn provider_manager() -> Arc<ProviderManager> {
    Arc::new(ProviderManager::new(health_manager()))
}

pub fn validator(config: &ValidationConfig) -> AuthValidator {
    AuthValidator::new(config, Some(Arc::new(InMemoryBreachedPasswordSource::new()))).unwrap()
}

pub struct Harness {
    pub orchestrator: AuthOrchestrator,
    pub manager: Arc<ProviderManager>,
    pub validator: Arc<AuthValidator>,
    pub repository: Arc<InMemoryAuthRepository>,
    pub logger: Arc<TracingAuthLogger>,
    pub metrics: Arc<InMemoryAuthMetrics>,
    pub security: Arc<DefaultSecurityService>,
}

pub struct HarnessBuilder {
    config: AppConfig,
    policy: SecurityPolicy,
    providers: Vec<(Arc<dyn AuthProvider>, ProviderOptions)>,
}

impl HarnessBuilder {
    pub fn new() -> Self {
        let mut config = AppConfig::default();
        config.orchestrator.enable_health_monitoring = false;
        Self {
            config,
            policy: SecurityPolicy::default(),
            providers: Vec::new(),
        }
    }

    pub fn config(mut self, edit: impl FnOnce(&mut AppConfig)) -> Self {
        edit(&mut self.config);
        self
    }

    pub fn policy(mut self, policy: SecurityPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn provider(mut self, provider: Arc<dyn AuthProvider>, options: ProviderOptions) -> Self {
        self.providers.push((provider, options));
        self
    }

    pub fn build(self) -> Harness {
        let manager = provider_manager();
        for (provider, options) in self.providers {
            manager.register_provider(provider, options).unwrap();
        }
        let validator = Arc::new(validator(&self.config.validation));
        let repository = Arc::new(InMemoryAuthRepository::new());
        let logger = Arc::new(TracingAuthLogger::new(100));
        let metrics = Arc::new(InMemoryAuthMetrics::new());
        let security = Arc::new(DefaultSecurityService::new(self.policy));
        let config = Arc::new(FigmentConfigProvider::new(&self.config).unwrap());

        let orchestrator = AuthOrchestrator::new(AuthOrchestratorDeps {
            provider_manager: Arc::clone(&manager),
            validator: Arc::clone(&validator),
            repository: repository.clone(),
            logger: logger.clone(),
            metrics: metrics.clone(),
            security: security.clone(),
            config,
        });

        Harness {
            orchestrator,
            manager,
            validator,
            repository,
            logger,
            metrics,
            security,
        }
    }

    /// Build and initialize
    pub async fn ready(self) -> Harness {
        let harness = self.build();
        harness.orchestrator.initialize().await.unwrap();
        harness
    }
}
