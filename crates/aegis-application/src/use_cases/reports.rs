//! Orchestrator state and report types

use crate::providers::ManagerStatistics;
use crate::validation::ValidationStatistics;
use aegis_domain::error::AuthErrorCode;
use aegis_domain::ports::AuthMetricsSnapshot;
use serde::Serialize;

/// Lifecycle state of an orchestrator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OrchestratorState {
    /// `initialize` has not run
    Uninitialized,
    /// `initialize` is running
    Initializing,
    /// Accepting requests
    Ready,
    /// `initialize` failed; no request is accepted
    Failed,
    /// `shutdown` has run
    ShutDown,
}

impl OrchestratorState {
    /// Whether requests are accepted
    pub fn is_ready(self) -> bool {
        self == Self::Ready
    }
}

/// Provider that failed to sign out
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SignoutFailure {
    /// Provider name
    pub provider: String,
    /// Failure code
    pub code: AuthErrorCode,
    /// Failure message
    pub message: String,
}

/// Outcome of a global sign out
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SignoutReport {
    /// A persisted session existed and was cleared
    pub session_cleared: bool,
    /// Providers that signed out
    pub providers_signed_out: Vec<String>,
    /// Providers that failed to sign out
    pub failures: Vec<SignoutFailure>,
}

impl SignoutReport {
    /// Whether every signout-capable provider signed out
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Aggregate orchestrator statistics
#[derive(Debug, Clone, Serialize)]
pub struct OrchestratorStatistics {
    /// Lifecycle state
    pub state: OrchestratorState,
    /// Provider registry view
    pub manager: ManagerStatistics,
    /// Authentication counters
    pub auth: AuthMetricsSnapshot,
    /// Validation totals
    pub validation: ValidationStatistics,
}
