//! Tracing-backed authentication event logger
//!
//! Every kept event is forwarded to `tracing` at its own level and retained
//! in a bounded buffer (oldest dropped first) for later inspection.

use crate::constants::DEFAULT_EVENT_CAPACITY;
use aegis_domain::error::AuthError;
use aegis_domain::events::{AuthEvent, LogLevel};
use aegis_domain::ports::AuthLogger;
use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError, RwLock};
use tracing::{debug, error, info, warn};

/// [`AuthLogger`] forwarding to `tracing`
#[derive(Debug)]
pub struct TracingAuthLogger {
    capacity: usize,
    min_level: RwLock<LogLevel>,
    events: Mutex<VecDeque<AuthEvent>>,
}

impl TracingAuthLogger {
    /// Logger keeping at most `capacity` events of level `Info` or above
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            min_level: RwLock::new(LogLevel::Info),
            events: Mutex::new(VecDeque::with_capacity(capacity.min(DEFAULT_EVENT_CAPACITY))),
        }
    }

    /// Set the initial minimum level
    #[must_use]
    pub fn with_level(self, level: LogLevel) -> Self {
        self.set_level(level);
        self
    }

    /// Buffer capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn level(&self) -> LogLevel {
        *self.min_level.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn keep(&self, event: AuthEvent) {
        let mut events = self.events.lock().unwrap_or_else(PoisonError::into_inner);
        if events.len() == self.capacity {
            events.pop_front();
        }
        events.push_back(event);
    }

    fn forward(event: &AuthEvent) {
        let provider = event.provider.as_deref().unwrap_or("-");
        let user = event.user_id.as_deref().unwrap_or("-");
        match event.level {
            LogLevel::Debug => debug!(kind = ?event.kind, provider, user, "{}", event.message),
            LogLevel::Info => info!(kind = ?event.kind, provider, user, "{}", event.message),
            LogLevel::Warn => warn!(kind = ?event.kind, provider, user, "{}", event.message),
            LogLevel::Error => error!(kind = ?event.kind, provider, user, "{}", event.message),
        }
    }
}

impl Default for TracingAuthLogger {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_CAPACITY)
    }
}

impl AuthLogger for TracingAuthLogger {
    fn log(&self, event: AuthEvent) {
        if event.level < self.level() {
            return;
        }
        Self::forward(&event);
        self.keep(event);
    }

    fn log_error(&self, event: AuthEvent, error: &AuthError) {
        let event = event
            .with_level(LogLevel::Error)
            .with_detail("error_code", serde_json::json!(error.code.as_str()));
        error!(
            kind = ?event.kind,
            code = %error.code,
            error = %error.message,
            "{}",
            event.message
        );
        self.keep(event);
    }

    fn log_security(&self, event: AuthEvent) {
        let event = if event.level < LogLevel::Warn {
            event.with_level(LogLevel::Warn)
        } else {
            event
        };
        warn!(
            target: "aegis::security",
            kind = ?event.kind,
            request_id = event.request_id.as_deref().unwrap_or("-"),
            "{}",
            event.message
        );
        self.keep(event);
    }

    fn events(&self) -> Vec<AuthEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .cloned()
            .collect()
    }

    fn clear(&self) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    fn set_level(&self, level: LogLevel) {
        *self.min_level.write().unwrap_or_else(PoisonError::into_inner) = level;
    }
}
