//! Use cases
//!
//! | Type | Description |
//! |------|-------------|
//! | [`AuthOrchestrator`] | Authentication pipeline, sessions, identity lifecycle |
//! | [`SignoutReport`] | Per-provider outcome of a global sign out |
//! | [`OrchestratorStatistics`] | Registry, authentication and validation totals |

pub mod orchestrator;
pub mod reports;

pub use orchestrator::{AuthOrchestrator, AuthOrchestratorDeps};
pub use reports::{OrchestratorState, OrchestratorStatistics, SignoutFailure, SignoutReport};
