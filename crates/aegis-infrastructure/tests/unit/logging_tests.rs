//! Logging and timing helper tests

use aegis_infrastructure::constants::{DEFAULT_EVENT_BUFFER_SIZE, DEFAULT_LOG_LEVEL};
use aegis_infrastructure::logging::{LoggingConfig, parse_log_level};
use aegis_infrastructure::utils::TimedOperation;
use std::time::Duration;
use tracing::Level;

#[test]
fn test_parse_log_level() {
    assert_eq!(parse_log_level("trace").unwrap(), Level::TRACE);
    assert_eq!(parse_log_level("DEBUG").unwrap(), Level::DEBUG);
    assert_eq!(parse_log_level("info").unwrap(), Level::INFO);
    assert_eq!(parse_log_level("warn").unwrap(), Level::WARN);
    assert_eq!(parse_log_level("warning").unwrap(), Level::WARN);
    assert_eq!(parse_log_level("error").unwrap(), Level::ERROR);

    assert!(parse_log_level("verbose").is_err());
}

#[test]
fn test_logging_config_default() {
    let config = LoggingConfig::default();
    assert_eq!(config.level, DEFAULT_LOG_LEVEL);
    assert!(!config.json_format);
    assert!(config.file_output.is_none());
    assert_eq!(config.event_buffer_size, DEFAULT_EVENT_BUFFER_SIZE);
}

#[test]
fn test_timed_operation_floor() {
    let timer = TimedOperation::start().with_floor(Duration::from_millis(250));
    assert!(timer.elapsed() >= Duration::from_millis(250));
    assert!(timer.elapsed_ms() >= 250);
}

#[test]
fn test_timed_operation_remaining() {
    let timer = TimedOperation::start();
    assert!(timer.remaining(Duration::from_secs(60)).is_some());
    std::thread::sleep(Duration::from_millis(5));
    assert!(timer.remaining(Duration::from_millis(1)).is_none());
}
