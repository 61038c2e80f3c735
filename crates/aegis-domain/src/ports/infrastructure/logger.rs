//! Event Logger Port

use crate::error::AuthError;
use crate::events::{AuthEvent, LogLevel};

/// Authentication event sink
///
/// Implementations keep a queryable record of recent events in addition to
/// whatever they forward to the process log.
pub trait AuthLogger: Send + Sync {
    /// Record an event
    fn log(&self, event: AuthEvent);

    /// Record a failure with its typed error
    fn log_error(&self, event: AuthEvent, error: &AuthError);

    /// Record a security-relevant event; never filtered out by level
    fn log_security(&self, event: AuthEvent);

    /// Recorded events, oldest first
    fn events(&self) -> Vec<AuthEvent>;

    /// Forget recorded events
    fn clear(&self);

    /// Minimum level kept by `log`
    fn set_level(&self, level: LogLevel);
}
