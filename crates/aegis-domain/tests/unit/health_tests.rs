//! Unit tests for health value objects

use aegis_domain::{CircuitState, HealthCheckResult, ProviderHealthMetrics};
use std::time::Duration;

#[test]
fn test_metrics_default_uptime_is_100() {
    let metrics = ProviderHealthMetrics::default();
    assert_eq!(metrics.total_checks, 0);
    assert!((metrics.uptime - 100.0).abs() < f64::EPSILON);
}

#[test]
fn test_metrics_record_mixed_results() {
    let mut metrics = ProviderHealthMetrics::default();
    let ok = HealthCheckResult::healthy("p", Duration::from_millis(10));
    let bad = HealthCheckResult::unhealthy("p", Duration::from_millis(30), "down");

    metrics.record(&ok);
    metrics.record(&bad);
    metrics.record(&bad);

    assert_eq!(metrics.total_checks, 3);
    assert_eq!(metrics.successful_checks, 1);
    assert_eq!(metrics.failed_checks, 2);
    assert_eq!(metrics.consecutive_failures, 2);
    assert!((metrics.uptime - 100.0 / 3.0).abs() < 1e-9);
    assert!((metrics.average_response_time_ms - 70.0 / 3.0).abs() < 1e-9);

    metrics.record(&ok);
    assert_eq!(metrics.consecutive_failures, 0);
}

#[test]
fn test_circuit_state_wire_format() {
    assert_eq!(
        serde_json::to_string(&CircuitState::HalfOpen).unwrap(),
        "\"HALF_OPEN\""
    );
    assert_eq!(CircuitState::Open.to_string(), "OPEN");
}
