//! Provider registry
//!
//! | Type | Description |
//! |------|-------------|
//! | [`ProviderManager`] | Registration, priority selection, failover and lifecycle |
//! | [`ProviderOptions`] | Per-registration settings |
//! | [`LifecycleReport`] | Per-provider outcomes of bulk initialize/shutdown |

pub mod manager;
pub mod registration;

pub use manager::ProviderManager;
pub use registration::{
    LifecycleReport, ManagerStatistics, ProviderHealthInfo, ProviderOptions, ProviderOutcome,
    ProviderRegistration,
};
