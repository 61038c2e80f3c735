//! Provider registration types

use aegis_domain::error::AuthError;
use aegis_domain::value_objects::{ProviderPriority, ProviderType};
use aegis_infrastructure::config::ProviderEntry;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

/// Options applied when a provider is registered
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderOptions {
    /// Selection priority
    pub priority: ProviderPriority,
    /// Enable the provider immediately
    pub auto_enable: bool,
    /// Probe interval; the manager default when `None`
    pub health_check_interval: Option<Duration>,
    /// Walk the fallback chain when this provider fails
    pub failover_enabled: bool,
    /// Probe retries; the manager default when `None`
    pub max_retries: Option<u32>,
    /// Ordered fallback provider names
    pub fallbacks: Vec<String>,
    /// Free-form metadata
    pub metadata: HashMap<String, String>,
}

impl Default for ProviderOptions {
    fn default() -> Self {
        Self {
            priority: ProviderPriority::Normal,
            auto_enable: true,
            health_check_interval: None,
            failover_enabled: true,
            max_retries: None,
            fallbacks: Vec::new(),
            metadata: HashMap::new(),
        }
    }
}

impl ProviderOptions {
    /// Options with the given priority
    pub fn with_priority(priority: ProviderPriority) -> Self {
        Self {
            priority,
            ..Self::default()
        }
    }

    /// Register disabled
    #[must_use]
    pub fn disabled(mut self) -> Self {
        self.auto_enable = false;
        self
    }

    /// Set the fallback chain
    #[must_use]
    pub fn fallbacks<I, S>(mut self, fallbacks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fallbacks = fallbacks.into_iter().map(Into::into).collect();
        self
    }

    /// Do not fail over to the fallback chain
    #[must_use]
    pub fn without_failover(mut self) -> Self {
        self.failover_enabled = false;
        self
    }

    /// Override the probe interval
    #[must_use]
    pub fn health_check_interval(mut self, interval: Duration) -> Self {
        self.health_check_interval = Some(interval);
        self
    }

    /// Override the probe retries
    #[must_use]
    pub fn max_retries(mut self, retries: u32) -> Self {
        self.max_retries = Some(retries);
        self
    }

    /// Add a metadata entry
    #[must_use]
    pub fn metadata<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

impl From<&ProviderEntry> for ProviderOptions {
    fn from(entry: &ProviderEntry) -> Self {
        Self {
            priority: entry.priority,
            auto_enable: entry.enabled,
            health_check_interval: entry.health_check_interval_ms.map(Duration::from_millis),
            failover_enabled: true,
            max_retries: entry.max_retries,
            fallbacks: entry.fallbacks.clone(),
            metadata: entry.metadata.clone(),
        }
    }
}

/// Health view of a registered provider, read from its monitor
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProviderHealthInfo {
    /// Last probe was healthy and the circuit is not open
    pub healthy: bool,
    /// Unhealthy probes since the last healthy one
    pub consecutive_failures: u32,
    /// Time of the last probe
    pub last_check: Option<DateTime<Utc>>,
}

/// Snapshot of one registration
#[derive(Debug, Clone, Serialize)]
pub struct ProviderRegistration {
    /// Provider name
    pub name: String,
    /// Provider kind
    pub provider_type: ProviderType,
    /// Selection priority
    pub priority: ProviderPriority,
    /// Eligible for selection
    pub enabled: bool,
    /// Fails over to its fallback chain
    pub failover_enabled: bool,
    /// Ordered fallback provider names
    pub fallbacks: Vec<String>,
    /// Free-form metadata
    pub metadata: HashMap<String, String>,
    /// Registration time
    pub registered_at: DateTime<Utc>,
    /// Health as seen by the provider's monitor
    pub health: ProviderHealthInfo,
}

/// Outcome of one provider in a bulk lifecycle operation
#[derive(Debug, Clone, Serialize)]
pub struct ProviderOutcome {
    /// Provider name
    pub provider: String,
    /// Failure, if any
    pub error: Option<AuthError>,
    /// Time spent
    pub duration: Duration,
}

impl ProviderOutcome {
    /// Whether the operation succeeded
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Outcomes of a bulk initialize or shutdown
#[derive(Debug, Clone, Default, Serialize)]
pub struct LifecycleReport {
    /// One outcome per provider, in name order
    pub outcomes: Vec<ProviderOutcome>,
}

impl LifecycleReport {
    /// Providers that succeeded
    pub fn succeeded(&self) -> Vec<&str> {
        self.outcomes
            .iter()
            .filter(|o| o.is_success())
            .map(|o| o.provider.as_str())
            .collect()
    }

    /// Providers that failed, with their errors
    pub fn failed(&self) -> Vec<(&str, &AuthError)> {
        self.outcomes
            .iter()
            .filter_map(|o| o.error.as_ref().map(|e| (o.provider.as_str(), e)))
            .collect()
    }

    /// Whether at least one provider succeeded
    pub fn any_succeeded(&self) -> bool {
        self.outcomes.iter().any(ProviderOutcome::is_success)
    }

    /// Whether every provider succeeded
    pub fn all_succeeded(&self) -> bool {
        self.outcomes.iter().all(ProviderOutcome::is_success)
    }
}

/// Aggregate view of the provider registry
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ManagerStatistics {
    /// Registered providers
    pub total_providers: usize,
    /// Enabled providers
    pub enabled_providers: usize,
    /// Providers currently considered healthy
    pub healthy_providers: usize,
    /// Registered providers by kind
    pub providers_by_type: BTreeMap<String, usize>,
    /// Registered providers by priority
    pub providers_by_priority: BTreeMap<String, usize>,
    /// Whether the manager-level sweep is running
    pub health_monitoring_active: bool,
}
