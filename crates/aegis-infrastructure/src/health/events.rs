//! Health events

use aegis_domain::value_objects::{HealthCheckResult, HealthState};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;

/// Event emitted by a provider health monitor
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HealthEvent {
    /// A probe finished
    CheckCompleted(HealthCheckResult),
    /// The provider's classification changed
    StatusChanged {
        /// Provider name
        provider: String,
        /// Classification before the probe
        previous: HealthState,
        /// Classification after the probe
        current: HealthState,
        /// Time of the change
        timestamp: DateTime<Utc>,
    },
}

impl HealthEvent {
    /// Provider the event is about
    pub fn provider(&self) -> &str {
        match self {
            Self::CheckCompleted(result) => &result.provider_name,
            Self::StatusChanged { provider, .. } => provider,
        }
    }
}

/// Callback receiving health events
pub type HealthEventSink = Arc<dyn Fn(&HealthEvent) + Send + Sync>;

/// Handle returned when registering a health listener
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HealthListenerId(pub(crate) u64);
