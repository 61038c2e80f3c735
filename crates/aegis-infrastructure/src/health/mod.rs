//! Provider Health Monitoring
//!
//! | Type | Description |
//! |------|-------------|
//! | [`ProviderHealthMonitor`] | Probes one provider, owns its breaker, metrics and history |
//! | [`HealthCheckManager`] | Registry of monitors, fallback-chain execution, reports |
//! | [`HealthEvent`] | Probe completions and status changes delivered to listeners |

pub mod events;
pub mod manager;
pub mod monitor;

pub use events::{HealthEvent, HealthEventSink, HealthListenerId};
pub use manager::{FallbackAttempt, HealthCheckManager, HealthReport, HealthSummary};
pub use monitor::{ProviderHealthConfig, ProviderHealthMonitor};
