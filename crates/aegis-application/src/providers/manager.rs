//! Provider manager
//!
//! Registry of identity providers with priority and enablement, best
//! provider selection, failover execution and bulk lifecycle.
//!
//! Failure counting has a single owner: each registration's
//! [`ProviderHealthMonitor`]. The manager reads consecutive failures and
//! health from it instead of keeping its own counters.

use crate::providers::registration::{
    LifecycleReport, ManagerStatistics, ProviderHealthInfo, ProviderOptions, ProviderOutcome,
    ProviderRegistration,
};
use aegis_domain::error::{AuthError, AuthErrorCode, AuthResult};
use aegis_domain::ports::AuthProvider;
use aegis_domain::value_objects::{HealthCheckResult, ProviderPriority, ProviderType};
use aegis_infrastructure::health::{HealthCheckManager, ProviderHealthConfig, ProviderHealthMonitor};
use aegis_infrastructure::utils::TimedOperation;
use chrono::{DateTime, Utc};
use futures::FutureExt;
use futures::future::join_all;
use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex, PoisonError, RwLock, Weak};
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

struct RegisteredProvider {
    provider: Arc<dyn AuthProvider>,
    monitor: Arc<ProviderHealthMonitor>,
    priority: ProviderPriority,
    enabled: bool,
    failover_enabled: bool,
    fallbacks: Vec<String>,
    metadata: HashMap<String, String>,
    sequence: u64,
    registered_at: DateTime<Utc>,
}

impl RegisteredProvider {
    fn is_healthy(&self) -> bool {
        self.monitor.is_healthy() && !self.monitor.circuit_breaker().is_open()
    }

    fn snapshot(&self, name: &str) -> ProviderRegistration {
        let status = self.monitor.health_status();
        ProviderRegistration {
            name: name.to_string(),
            provider_type: self.provider.provider_type(),
            priority: self.priority,
            enabled: self.enabled,
            failover_enabled: self.failover_enabled,
            fallbacks: self.fallbacks.clone(),
            metadata: self.metadata.clone(),
            registered_at: self.registered_at,
            health: ProviderHealthInfo {
                healthy: self.is_healthy(),
                consecutive_failures: status.metrics.consecutive_failures,
                last_check: status.metrics.last_check,
            },
        }
    }
}

#[derive(Default)]
struct Registry {
    entries: HashMap<String, RegisteredProvider>,
    next_sequence: u64,
}

/// Registry of identity providers
///
/// # Example
///
/// ```ignore
/// use aegis_application::providers::{ProviderManager, ProviderOptions};
///
/// let manager = ProviderManager::new(Arc::new(HealthCheckManager::default()));
/// manager.register_provider(ldap, ProviderOptions::with_priority(ProviderPriority::High).fallbacks(["local"]))?;
/// manager.register_provider(local, ProviderOptions::default())?;
/// let provider = manager.get_best_provider(None)?;
/// ```
pub struct ProviderManager {
    health: Arc<HealthCheckManager>,
    registry: RwLock<Registry>,
    sweep: Mutex<Option<CancellationToken>>,
}

impl ProviderManager {
    /// Manager whose providers are monitored by `health`
    pub fn new(health: Arc<HealthCheckManager>) -> Self {
        Self {
            health,
            registry: RwLock::new(Registry::default()),
            sweep: Mutex::new(None),
        }
    }

    /// Health check manager owning the provider monitors
    pub fn health(&self) -> &Arc<HealthCheckManager> {
        &self.health
    }

    /// Register `provider` and start monitoring it
    ///
    /// Fails with `PROVIDER_ALREADY_REGISTERED` if the name is taken and with
    /// `VALIDATION_ERROR` if the health check interval is zero. Must be
    /// called from within a tokio runtime.
    pub fn register_provider(
        &self,
        provider: Arc<dyn AuthProvider>,
        options: ProviderOptions,
    ) -> AuthResult<()> {
        let name = provider.name().to_string();
        if self
            .registry
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .entries
            .contains_key(&name)
        {
            return Err(already_registered(&name));
        }

        let mut config: ProviderHealthConfig = self.health.default_config().clone();
        if let Some(interval) = options.health_check_interval {
            config.check_interval = interval;
        }
        if let Some(retries) = options.max_retries {
            config.retries = retries;
        }
        let fallbacks = if options.failover_enabled {
            options.fallbacks.clone()
        } else {
            Vec::new()
        };
        let monitor =
            self.health
                .register_provider(Arc::clone(&provider), Some(config), Some(fallbacks))?;

        let mut registry = self.registry.write().unwrap_or_else(PoisonError::into_inner);
        if registry.entries.contains_key(&name) {
            drop(registry);
            self.health.unregister_provider(&name);
            return Err(already_registered(&name));
        }
        let sequence = registry.next_sequence;
        registry.next_sequence += 1;
        registry.entries.insert(
            name.clone(),
            RegisteredProvider {
                provider,
                monitor,
                priority: options.priority,
                enabled: options.auto_enable,
                failover_enabled: options.failover_enabled,
                fallbacks: options.fallbacks,
                metadata: options.metadata,
                sequence,
                registered_at: Utc::now(),
            },
        );
        info!(
            provider = %name,
            priority = ?options.priority,
            enabled = options.auto_enable,
            "Provider registered"
        );
        Ok(())
    }

    /// Remove `name` and stop its monitor; returns whether it was registered
    pub fn unregister_provider(&self, name: &str) -> bool {
        let removed = self
            .registry
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entries
            .remove(name)
            .is_some();
        if removed {
            self.health.unregister_provider(name);
            info!(provider = %name, "Provider unregistered");
        }
        removed
    }

    /// Enable or disable `name` for selection
    pub fn set_provider_enabled(&self, name: &str, enabled: bool) -> AuthResult<()> {
        let mut registry = self.registry.write().unwrap_or_else(PoisonError::into_inner);
        let entry = registry
            .entries
            .get_mut(name)
            .ok_or_else(|| not_registered(name))?;
        entry.enabled = enabled;
        info!(provider = %name, enabled, "Provider enablement changed");
        Ok(())
    }

    /// Change the selection priority of `name`
    pub fn set_provider_priority(&self, name: &str, priority: ProviderPriority) -> AuthResult<()> {
        let mut registry = self.registry.write().unwrap_or_else(PoisonError::into_inner);
        let entry = registry
            .entries
            .get_mut(name)
            .ok_or_else(|| not_registered(name))?;
        entry.priority = priority;
        Ok(())
    }

    /// Registered provider `name`
    pub fn get_provider(&self, name: &str) -> Option<Arc<dyn AuthProvider>> {
        self.registry
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .entries
            .get(name)
            .map(|entry| Arc::clone(&entry.provider))
    }

    /// Registration snapshot of `name`
    pub fn get_registration(&self, name: &str) -> Option<ProviderRegistration> {
        self.registry
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .entries
            .get(name)
            .map(|entry| entry.snapshot(name))
    }

    /// Registration snapshots in selection order
    pub fn registrations(&self) -> Vec<ProviderRegistration> {
        let registry = self.registry.read().unwrap_or_else(PoisonError::into_inner);
        let mut entries: Vec<_> = registry.entries.iter().collect();
        entries.sort_by_key(|(_, entry)| selection_key(entry));
        entries
            .into_iter()
            .map(|(name, entry)| entry.snapshot(name))
            .collect()
    }

    /// Registered providers accepted by `keep`, in registration order
    pub fn providers_where<F>(&self, keep: F) -> Vec<Arc<dyn AuthProvider>>
    where
        F: Fn(&dyn AuthProvider) -> bool,
    {
        let registry = self.registry.read().unwrap_or_else(PoisonError::into_inner);
        let mut entries: Vec<_> = registry
            .entries
            .values()
            .filter(|entry| keep(entry.provider.as_ref()))
            .collect();
        entries.sort_by_key(|entry| entry.sequence);
        entries
            .into_iter()
            .map(|entry| Arc::clone(&entry.provider))
            .collect()
    }

    /// Highest-priority enabled provider, optionally of one kind
    ///
    /// Ties within a priority are broken by health, then by registration
    /// order. Priority always dominates: an unhealthy provider outranks a
    /// healthy one of lower priority.
    pub fn get_best_provider(
        &self,
        provider_type: Option<&ProviderType>,
    ) -> AuthResult<Arc<dyn AuthProvider>> {
        let registry = self.registry.read().unwrap_or_else(PoisonError::into_inner);
        registry
            .entries
            .values()
            .filter(|entry| entry.enabled)
            .filter(|entry| provider_type.is_none_or(|kind| entry.provider.provider_type() == *kind))
            .min_by_key(|entry| selection_key(entry))
            .map(|entry| Arc::clone(&entry.provider))
            .ok_or_else(|| match provider_type {
                Some(kind) => AuthError::provider_not_found(format!(
                    "No enabled provider of type {kind} is registered"
                )),
                None => AuthError::provider_not_found("No enabled provider is registered"),
            })
    }

    /// Run `operation` against `name` through its circuit breaker only
    pub async fn execute_on<T, F, Fut>(&self, name: &str, operation: F) -> AuthResult<T>
    where
        F: FnOnce(Arc<dyn AuthProvider>) -> Fut,
        Fut: Future<Output = AuthResult<T>>,
    {
        let (provider, monitor) = {
            let registry = self.registry.read().unwrap_or_else(PoisonError::into_inner);
            let entry = registry
                .entries
                .get(name)
                .ok_or_else(|| not_registered(name))?;
            (Arc::clone(&entry.provider), Arc::clone(&entry.monitor))
        };
        monitor
            .circuit_breaker()
            .execute(|| operation(provider))
            .await
    }

    /// Run `operation` against `primary`, then its enabled fallbacks in order
    ///
    /// Providers registered without failover only get the primary attempt.
    pub async fn execute_with_failover<T, F, Fut>(&self, primary: &str, operation: F) -> AuthResult<T>
    where
        F: Fn(Arc<dyn AuthProvider>) -> Fut,
        Fut: Future<Output = AuthResult<T>>,
    {
        let (failover_enabled, enabled): (bool, HashSet<String>) = {
            let registry = self.registry.read().unwrap_or_else(PoisonError::into_inner);
            let entry = registry
                .entries
                .get(primary)
                .ok_or_else(|| not_registered(primary))?;
            let enabled = registry
                .entries
                .iter()
                .filter(|(_, e)| e.enabled)
                .map(|(name, _)| name.clone())
                .collect();
            (entry.failover_enabled, enabled)
        };

        if !failover_enabled {
            return self.execute_on(primary, operation).await;
        }
        self.health
            .execute_with_fallback_where(
                primary,
                |name| name == primary || enabled.contains(name),
                operation,
            )
            .await
    }

    /// Probe every registered provider once, concurrently
    pub async fn perform_health_checks(&self) -> HashMap<String, HealthCheckResult> {
        let monitors: Vec<_> = self
            .registry
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .entries
            .values()
            .map(|entry| Arc::clone(&entry.monitor))
            .collect();

        let results: HashMap<_, _> = join_all(monitors.iter().map(|m| m.perform_health_check()))
            .await
            .into_iter()
            .map(|result| (result.provider_name.clone(), result))
            .collect();

        for monitor in &monitors {
            let failures = monitor.consecutive_failures();
            if failures > 0 {
                warn!(provider = %monitor.name(), consecutive_failures = failures, "Provider is failing health checks");
            }
        }
        debug!(checked = results.len(), "Manager health sweep completed");
        results
    }

    /// Sweep all providers every `interval`, independent of their monitors
    ///
    /// No-op while a sweep is already scheduled. Fails with
    /// `VALIDATION_ERROR` when `interval` is zero.
    pub fn start_health_monitoring(self: &Arc<Self>, interval: Duration) -> AuthResult<()> {
        if interval.is_zero() {
            return Err(AuthError::validation(
                "Manager health interval must be greater than zero",
            ));
        }
        let mut sweep = self.sweep.lock().unwrap_or_else(PoisonError::into_inner);
        if sweep.as_ref().is_some_and(|token| !token.is_cancelled()) {
            return Ok(());
        }

        let token = CancellationToken::new();
        let cancelled = token.clone();
        let manager: Weak<Self> = Arc::downgrade(self);

        tokio::spawn(async move {
            let mut ticker =
                tokio::time::interval_at(tokio::time::Instant::now() + interval, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    biased;
                    () = cancelled.cancelled() => break,
                    _ = ticker.tick() => {}
                }
                let Some(manager) = manager.upgrade() else {
                    break;
                };
                tokio::select! {
                    biased;
                    () = cancelled.cancelled() => break,
                    _ = manager.perform_health_checks() => {}
                }
            }
        });

        *sweep = Some(token);
        info!(
            interval_ms = u64::try_from(interval.as_millis()).unwrap_or(u64::MAX),
            "Manager health monitoring started"
        );
        Ok(())
    }

    /// Cancel the manager-level sweep; idempotent
    pub fn stop_health_monitoring(&self) {
        let token = self
            .sweep
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(token) = token {
            token.cancel();
            info!("Manager health monitoring stopped");
        }
    }

    /// Whether the manager-level sweep is scheduled
    pub fn is_health_monitoring(&self) -> bool {
        self.sweep
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|token| !token.is_cancelled())
    }

    /// Initialize every provider concurrently, each bounded by `timeout`
    ///
    /// Best effort: every outcome is collected, failures do not stop siblings.
    pub async fn initialize_all_providers(&self, timeout: Duration) -> LifecycleReport {
        let report = self
            .fan_out(timeout, "initialization", |provider| async move {
                provider.initialize().await
            })
            .await;
        info!(
            succeeded = report.succeeded().len(),
            failed = report.failed().len(),
            "Provider initialization finished"
        );
        report
    }

    /// Stop the sweep and shut every provider down concurrently
    pub async fn shutdown_all_providers(&self, timeout: Duration) -> LifecycleReport {
        self.stop_health_monitoring();
        let report = self
            .fan_out(timeout, "shutdown", |provider| async move {
                provider.shutdown(timeout).await
            })
            .await;
        info!(
            succeeded = report.succeeded().len(),
            failed = report.failed().len(),
            "Provider shutdown finished"
        );
        report
    }

    async fn fan_out<F, Fut>(&self, timeout: Duration, phase: &str, operation: F) -> LifecycleReport
    where
        F: Fn(Arc<dyn AuthProvider>) -> Fut,
        Fut: Future<Output = AuthResult<()>>,
    {
        let mut providers: Vec<(String, Arc<dyn AuthProvider>)> = self
            .registry
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .entries
            .iter()
            .map(|(name, entry)| (name.clone(), Arc::clone(&entry.provider)))
            .collect();
        providers.sort_by(|a, b| a.0.cmp(&b.0));

        let runs = providers.into_iter().map(|(name, provider)| {
            let call = operation(provider);
            async move {
                let timer = TimedOperation::start();
                let outcome =
                    match tokio::time::timeout(timeout, AssertUnwindSafe(call).catch_unwind()).await
                    {
                        Ok(Ok(outcome)) => outcome,
                        Ok(Err(_panic)) => Err(AuthError::new(
                            AuthErrorCode::ProviderError,
                            format!("Provider {name} panicked during {phase}"),
                        )),
                        Err(_elapsed) => Err(AuthError::timeout(format!(
                            "Provider {name} {phase} timed out after {}ms",
                            timeout.as_millis()
                        ))),
                    };
                if let Err(error) = &outcome {
                    warn!(provider = %name, code = %error.code, "Provider {phase} failed");
                }
                ProviderOutcome {
                    provider: name,
                    error: outcome.err(),
                    duration: timer.elapsed(),
                }
            }
        });

        LifecycleReport {
            outcomes: join_all(runs).await,
        }
    }

    /// Totals, enablement, health and histograms
    pub fn get_manager_statistics(&self) -> ManagerStatistics {
        let registry = self.registry.read().unwrap_or_else(PoisonError::into_inner);
        let mut stats = ManagerStatistics {
            total_providers: registry.entries.len(),
            health_monitoring_active: self.is_health_monitoring(),
            ..ManagerStatistics::default()
        };
        for entry in registry.entries.values() {
            if entry.enabled {
                stats.enabled_providers += 1;
            }
            if entry.is_healthy() {
                stats.healthy_providers += 1;
            }
            *stats
                .providers_by_type
                .entry(entry.provider.provider_type().to_string())
                .or_default() += 1;
            *stats
                .providers_by_priority
                .entry(format!("{:?}", entry.priority).to_lowercase())
                .or_default() += 1;
        }
        stats
    }

    /// Names of all registered providers
    pub fn provider_names(&self) -> Vec<String> {
        let mut names: Vec<_> = self
            .registry
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .entries
            .keys()
            .cloned()
            .collect();
        names.sort();
        names
    }
}

impl Drop for ProviderManager {
    fn drop(&mut self) {
        if let Some(token) = self
            .sweep
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            token.cancel();
        }
    }
}

impl std::fmt::Debug for ProviderManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderManager")
            .field("providers", &self.provider_names())
            .field("health_monitoring", &self.is_health_monitoring())
            .finish_non_exhaustive()
    }
}

/// Ascending sort key: highest priority first, then healthy, then oldest
fn selection_key(entry: &RegisteredProvider) -> (std::cmp::Reverse<ProviderPriority>, bool, u64) {
    (
        std::cmp::Reverse(entry.priority),
        !entry.is_healthy(),
        entry.sequence,
    )
}

fn not_registered(name: &str) -> AuthError {
    AuthError::provider_not_found(format!("Provider {name} is not registered"))
}

fn already_registered(name: &str) -> AuthError {
    AuthError::new(
        AuthErrorCode::ProviderAlreadyRegistered,
        format!("Provider {name} is already registered"),
    )
}
