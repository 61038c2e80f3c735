//! Logging configuration types

use crate::constants::{DEFAULT_EVENT_BUFFER_SIZE, DEFAULT_LOG_LEVEL};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Enable JSON output format
    pub json_format: bool,

    /// Log to a daily-rolling file in addition to stdout
    pub file_output: Option<PathBuf>,

    /// Authentication events kept in memory by the event logger
    pub event_buffer_size: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
            json_format: false,
            file_output: None,
            event_buffer_size: DEFAULT_EVENT_BUFFER_SIZE,
        }
    }
}
