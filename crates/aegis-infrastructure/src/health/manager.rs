//! Health check manager
//!
//! Registry of monitored providers with their fallback chains. Executes
//! operations against a primary provider and walks its fallback chain
//! strictly in order when it fails.

use crate::health::events::{HealthEvent, HealthEventSink, HealthListenerId};
use crate::health::monitor::{ProviderHealthConfig, ProviderHealthMonitor};
use aegis_domain::error::{AuthError, AuthErrorCode, AuthResult};
use aegis_domain::ports::AuthProvider;
use aegis_domain::value_objects::{HealthCheckResult, HealthStatus};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use futures::future::join_all;
use serde::Serialize;
use std::collections::HashMap;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, error, info, warn};

/// Aggregate counts of a health report
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HealthSummary {
    /// Monitored providers
    pub total: usize,
    /// Providers whose last probe was healthy
    pub healthy: usize,
    /// Providers whose last probe was unhealthy
    pub unhealthy: usize,
}

/// Health report over all monitored providers
#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    /// Report time
    pub timestamp: DateTime<Utc>,
    /// Per-provider detail
    pub providers: HashMap<String, HealthStatus>,
    /// Aggregate counts
    pub summary: HealthSummary,
}

/// One provider tried during fallback execution
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FallbackAttempt {
    /// Provider name
    pub provider: String,
    /// Failure code
    pub code: AuthErrorCode,
    /// Failure message
    pub message: String,
}

struct MonitoredProvider {
    monitor: Arc<ProviderHealthMonitor>,
    fallbacks: Vec<String>,
}

type ListenerRegistry = Arc<RwLock<Vec<(HealthListenerId, HealthEventSink)>>>;

/// Registry of provider health monitors
pub struct HealthCheckManager {
    providers: DashMap<String, MonitoredProvider>,
    listeners: ListenerRegistry,
    next_listener_id: AtomicU64,
    default_config: ProviderHealthConfig,
}

impl HealthCheckManager {
    /// Create a manager using `default_config` for providers registered without one
    pub fn new(default_config: ProviderHealthConfig) -> Self {
        Self {
            providers: DashMap::new(),
            listeners: Arc::new(RwLock::new(Vec::new())),
            next_listener_id: AtomicU64::new(1),
            default_config,
        }
    }

    /// Default probe configuration
    pub fn default_config(&self) -> &ProviderHealthConfig {
        &self.default_config
    }

    /// Create and start a monitor for `provider`
    ///
    /// `fallbacks` overrides the fallback chain of `config`. Fails with
    /// `PROVIDER_ALREADY_REGISTERED` if the name is taken and with
    /// `VALIDATION_ERROR` if the probe interval is zero.
    pub fn register_provider(
        &self,
        provider: Arc<dyn AuthProvider>,
        config: Option<ProviderHealthConfig>,
        fallbacks: Option<Vec<String>>,
    ) -> AuthResult<Arc<ProviderHealthMonitor>> {
        let name = provider.name().to_string();
        let mut config = config.unwrap_or_else(|| self.default_config.clone());
        if let Some(fallbacks) = fallbacks {
            config.fallback_providers = fallbacks;
        }
        let fallbacks = config.fallback_providers.clone();
        if config.check_interval.is_zero() {
            return Err(AuthError::validation(format!(
                "Health check interval of {name} must be greater than zero"
            )));
        }

        let entry = match self.providers.entry(name.clone()) {
            dashmap::mapref::entry::Entry::Occupied(_) => {
                return Err(AuthError::new(
                    AuthErrorCode::ProviderAlreadyRegistered,
                    format!("Provider {name} is already monitored"),
                ));
            }
            dashmap::mapref::entry::Entry::Vacant(entry) => entry,
        };

        let monitor = Arc::new(ProviderHealthMonitor::new(provider, config));
        monitor.set_event_sink(self.dispatcher());
        monitor.start_monitoring()?;

        entry.insert(MonitoredProvider {
            monitor: Arc::clone(&monitor),
            fallbacks: fallbacks.clone(),
        });
        info!(provider = %name, ?fallbacks, "Provider registered for health monitoring");
        Ok(monitor)
    }

    /// Stop and discard the monitor of `name`
    pub fn unregister_provider(&self, name: &str) -> bool {
        match self.providers.remove(name) {
            Some((_, entry)) => {
                entry.monitor.stop_monitoring();
                info!(provider = %name, "Provider unregistered from health monitoring");
                true
            }
            None => false,
        }
    }

    /// Monitor of `name`
    pub fn monitor(&self, name: &str) -> Option<Arc<ProviderHealthMonitor>> {
        self.providers
            .get(name)
            .map(|entry| Arc::clone(&entry.monitor))
    }

    /// Fallback chain of `name`
    pub fn fallbacks(&self, name: &str) -> Option<Vec<String>> {
        self.providers.get(name).map(|entry| entry.fallbacks.clone())
    }

    /// Replace the fallback chain of `name`
    pub fn set_fallbacks(&self, name: &str, fallbacks: Vec<String>) -> AuthResult<()> {
        let mut entry = self
            .providers
            .get_mut(name)
            .ok_or_else(|| not_registered(name))?;
        entry.fallbacks = fallbacks;
        Ok(())
    }

    /// Names of all monitored providers
    pub fn provider_names(&self) -> Vec<String> {
        self.providers.iter().map(|e| e.key().clone()).collect()
    }

    /// Run `operation` against `primary`, then its fallbacks in order
    ///
    /// Each call goes through the provider's circuit breaker. Only provider
    /// faults move on to the next provider; caller faults such as
    /// `CREDENTIALS_INVALID` are returned unchanged. Returns the first
    /// success, the primary's own error when no fallback was attempted,
    /// `ALL_PROVIDERS_FAILED` (with the attempted chain in `details.attempts`)
    /// when every attempted provider failed, and `PROVIDER_NOT_FOUND` when
    /// `primary` is not monitored.
    pub async fn execute_with_fallback<T, F, Fut>(
        &self,
        primary: &str,
        operation: F,
    ) -> AuthResult<T>
    where
        F: Fn(Arc<dyn AuthProvider>) -> Fut,
        Fut: Future<Output = AuthResult<T>>,
    {
        self.execute_with_fallback_where(primary, |_| true, operation)
            .await
    }

    /// [`execute_with_fallback`](Self::execute_with_fallback) skipping
    /// providers for which `eligible` returns false
    pub async fn execute_with_fallback_where<T, F, Fut, E>(
        &self,
        primary: &str,
        eligible: E,
        operation: F,
    ) -> AuthResult<T>
    where
        F: Fn(Arc<dyn AuthProvider>) -> Fut,
        Fut: Future<Output = AuthResult<T>>,
        E: Fn(&str) -> bool,
    {
        let fallbacks = self.fallbacks(primary).ok_or_else(|| not_registered(primary))?;

        let mut attempts: Vec<FallbackAttempt> = Vec::new();
        let mut primary_error: Option<AuthError> = None;
        let chain = std::iter::once(primary.to_string()).chain(fallbacks);

        for (position, name) in chain.enumerate() {
            if attempts.iter().any(|a| a.provider == name) {
                continue;
            }
            if !eligible(&name) {
                continue;
            }
            let Some(monitor) = self.monitor(&name) else {
                warn!(primary = %primary, fallback = %name, "Fallback provider is not registered");
                attempts.push(FallbackAttempt {
                    provider: name,
                    code: AuthErrorCode::ProviderNotFound,
                    message: "Provider is not registered".to_string(),
                });
                continue;
            };

            let provider = Arc::clone(monitor.provider());
            match monitor
                .circuit_breaker()
                .execute(|| operation(provider))
                .await
            {
                Ok(value) => {
                    if position > 0 {
                        info!(primary = %primary, provider = %name, "Request served by fallback provider");
                    }
                    return Ok(value);
                }
                Err(error) if !error.code.is_provider_fault() => {
                    debug!(provider = %name, code = %error.code, "Caller fault, not failing over");
                    return Err(error);
                }
                Err(error) => {
                    warn!(
                        provider = %name,
                        code = %error.code,
                        "Provider failed during fallback execution"
                    );
                    attempts.push(FallbackAttempt {
                        provider: name.clone(),
                        code: error.code.clone(),
                        message: error.message.clone(),
                    });
                    if position == 0 {
                        primary_error = Some(error);
                    }
                }
            }
        }

        if let (Some(error), [_]) = (primary_error.take(), attempts.as_slice()) {
            return Err(error);
        }

        error!(primary = %primary, attempted = attempts.len(), "All providers failed");
        Err(AuthError::new(
            AuthErrorCode::AllProvidersFailed,
            format!("All providers failed for {primary}"),
        )
        .with_detail("primary", serde_json::json!(primary))
        .with_detail(
            "attempts",
            serde_json::to_value(&attempts).unwrap_or(serde_json::Value::Null),
        ))
    }

    /// Health snapshot of `name`
    pub fn get_health_status(&self, name: &str) -> Option<HealthStatus> {
        self.monitor(name).map(|m| m.health_status())
    }

    /// Health snapshots of every monitored provider
    pub fn get_all_health_status(&self) -> HashMap<String, HealthStatus> {
        self.providers
            .iter()
            .map(|entry| (entry.key().clone(), entry.monitor.health_status()))
            .collect()
    }

    /// Aggregate report over every monitored provider
    pub fn get_health_report(&self) -> HealthReport {
        let providers = self.get_all_health_status();
        let healthy = providers.values().filter(|s| s.is_healthy()).count();
        HealthReport {
            timestamp: Utc::now(),
            summary: HealthSummary {
                total: providers.len(),
                healthy,
                unhealthy: providers.len() - healthy,
            },
            providers,
        }
    }

    /// Probe every monitored provider once, concurrently
    pub async fn check_all(&self) -> HashMap<String, HealthCheckResult> {
        let monitors: Vec<_> = self
            .providers
            .iter()
            .map(|entry| Arc::clone(&entry.monitor))
            .collect();
        join_all(monitors.iter().map(|m| m.perform_health_check()))
            .await
            .into_iter()
            .map(|result| (result.provider_name.clone(), result))
            .collect()
    }

    /// Register a health event listener
    pub fn on_health_event<F>(&self, listener: F) -> HealthListenerId
    where
        F: Fn(&HealthEvent) + Send + Sync + 'static,
    {
        let id = HealthListenerId(self.next_listener_id.fetch_add(1, Ordering::Relaxed));
        self.listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, Arc::new(listener)));
        id
    }

    /// Remove a listener; returns whether it was registered
    pub fn remove_health_listener(&self, id: HealthListenerId) -> bool {
        let mut listeners = self
            .listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let before = listeners.len();
        listeners.retain(|(existing, _)| *existing != id);
        listeners.len() != before
    }

    /// Restart periodic probing of every monitor
    pub fn start_all_monitoring(&self) {
        for entry in &self.providers {
            if let Err(e) = entry.monitor.start_monitoring() {
                warn!(provider = %entry.key(), error = %e, "Health monitoring not restarted");
            }
        }
    }

    /// Cancel periodic probing of every monitor; idempotent
    pub fn stop_all_monitoring(&self) {
        for entry in &self.providers {
            entry.monitor.stop_monitoring();
        }
        info!("All provider health monitoring stopped");
    }

    fn dispatcher(&self) -> HealthEventSink {
        let listeners = Arc::clone(&self.listeners);
        Arc::new(move |event: &HealthEvent| {
            let snapshot: Vec<HealthEventSink> = listeners
                .read()
                .unwrap_or_else(PoisonError::into_inner)
                .iter()
                .map(|(_, listener)| Arc::clone(listener))
                .collect();
            for listener in snapshot {
                if std::panic::catch_unwind(AssertUnwindSafe(|| listener(event))).is_err() {
                    warn!(provider = %event.provider(), "Health listener panicked");
                }
            }
        })
    }
}

impl Default for HealthCheckManager {
    fn default() -> Self {
        Self::new(ProviderHealthConfig::default())
    }
}

fn not_registered(name: &str) -> AuthError {
    AuthError::provider_not_found(format!("Provider {name} is not registered"))
}
