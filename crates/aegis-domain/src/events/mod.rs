//! Authentication Events
//!
//! Immutable records of authentication activity. Events are handed to the
//! [`AuthLogger`](crate::ports::infrastructure::AuthLogger) port and can be
//! validated like any other input.
//!
//! | Event | Description |
//! |-------|-------------|
//! | [`AuthEvent`] | A single authentication occurrence |
//! | [`AuthEventKind`] | What happened |
//! | [`LogLevel`] | Severity used for filtering |

/// Authentication event definitions
pub mod auth_events;

pub use auth_events::{AuthEvent, AuthEventKind, LogLevel};
