//! Provider health monitor tests

use crate::test_providers::{ProbeBehavior, ScriptedProvider};
use aegis_domain::{AuthErrorCode, CircuitState, HealthState};
use aegis_infrastructure::health::{HealthEvent, ProviderHealthConfig, ProviderHealthMonitor};
use aegis_infrastructure::resilience::CircuitBreakerConfig;
use std::sync::{Arc, Mutex};
use std::time::Duration;

fn fast_config() -> ProviderHealthConfig {
    ProviderHealthConfig::default()
        .with_check_interval(Duration::from_millis(40))
        .with_timeout(Duration::from_millis(50))
        .with_retries(0)
        .with_circuit_breaker(CircuitBreakerConfig::new(1000, Duration::from_secs(60)))
}

#[tokio::test]
async fn test_status_before_any_probe() {
    let monitor = ProviderHealthMonitor::new(ScriptedProvider::new("alpha"), fast_config());

    let status = monitor.health_status();
    assert_eq!(status.provider_name, "alpha");
    assert_eq!(status.status, HealthState::Healthy);
    assert_eq!(status.metrics.total_checks, 0);
    assert!((status.metrics.uptime - 100.0).abs() < f64::EPSILON);
    assert!(status.history.is_empty());
    assert_eq!(status.circuit.state, CircuitState::Closed);
}

#[tokio::test]
async fn test_healthy_probe_is_recorded() {
    let provider = ScriptedProvider::new("alpha");
    let monitor = ProviderHealthMonitor::new(provider.clone(), fast_config());

    let result = monitor.perform_health_check().await;

    assert!(result.is_healthy());
    assert!(result.response_time >= Duration::from_millis(1));
    assert_eq!(provider.probes(), 1);

    let status = monitor.health_status();
    assert_eq!(status.metrics.total_checks, 1);
    assert_eq!(status.metrics.successful_checks, 1);
    assert_eq!(status.last_result(), Some(&result));
}

#[tokio::test]
async fn test_consecutive_failures_and_uptime() {
    let provider = ScriptedProvider::new("alpha");
    provider.set_probe(ProbeBehavior::Failing);
    let monitor = ProviderHealthMonitor::new(provider, fast_config());

    for _ in 0..4 {
        let result = monitor.perform_health_check().await;
        assert_eq!(result.status, HealthState::Unhealthy);
        assert!(result.error.is_some());
    }

    let status = monitor.health_status();
    assert_eq!(monitor.consecutive_failures(), 4);
    assert_eq!(status.metrics.failed_checks, 4);
    assert!(status.metrics.uptime.abs() < f64::EPSILON);
    assert!(!monitor.is_healthy());
}

#[tokio::test]
async fn test_recovery_resets_consecutive_failures() {
    let provider = ScriptedProvider::new("alpha");
    provider.set_probe(ProbeBehavior::Failing);
    let monitor = ProviderHealthMonitor::new(provider.clone(), fast_config());

    monitor.perform_health_check().await;
    monitor.perform_health_check().await;
    provider.set_probe(ProbeBehavior::Healthy);
    monitor.perform_health_check().await;
    monitor.perform_health_check().await;

    let metrics = monitor.health_status().metrics;
    assert_eq!(metrics.consecutive_failures, 0);
    assert!((metrics.uptime - 50.0).abs() < 1e-9);
    assert!(monitor.is_healthy());
}

#[tokio::test]
async fn test_invalid_session_and_missing_capabilities_are_unhealthy() {
    let provider = ScriptedProvider::new("alpha");
    provider.set_probe(ProbeBehavior::Invalid);
    let monitor = ProviderHealthMonitor::new(provider.clone(), fast_config());
    assert!(!monitor.perform_health_check().await.is_healthy());

    provider.set_probe(ProbeBehavior::Healthy);
    provider.drop_capabilities();
    assert!(!monitor.perform_health_check().await.is_healthy());
}

#[tokio::test]
async fn test_history_is_bounded_but_counters_are_not() {
    let monitor = ProviderHealthMonitor::new(ScriptedProvider::new("alpha"), fast_config());

    for _ in 0..105 {
        monitor.perform_health_check().await;
    }

    let status = monitor.health_status();
    assert_eq!(status.metrics.total_checks, 105);
    assert_eq!(status.history.len(), 100);
}

#[tokio::test]
async fn test_hanging_probe_times_out() {
    let provider = ScriptedProvider::new("slow");
    provider.set_probe(ProbeBehavior::Hanging);
    let monitor = ProviderHealthMonitor::new(provider, fast_config());

    let started = std::time::Instant::now();
    let result = monitor.perform_health_check().await;

    assert_eq!(result.status, HealthState::Unhealthy);
    assert!(result.error.as_deref().unwrap_or_default().contains("timed out"));
    assert!(started.elapsed() < Duration::from_secs(5));
}

#[tokio::test]
async fn test_panicking_probe_is_contained() {
    let provider = ScriptedProvider::new("fragile");
    provider.set_probe(ProbeBehavior::Panicking);
    let monitor = ProviderHealthMonitor::new(provider, fast_config());

    let result = monitor.perform_health_check().await;

    assert_eq!(result.status, HealthState::Unhealthy);
    assert_eq!(monitor.consecutive_failures(), 1);
}

#[tokio::test]
async fn test_retries_make_extra_attempts() {
    let provider = ScriptedProvider::new("alpha");
    provider.set_probe(ProbeBehavior::Failing);
    let monitor = ProviderHealthMonitor::new(provider.clone(), fast_config().with_retries(2));

    monitor.perform_health_check().await;

    assert_eq!(provider.probes(), 3);
    assert_eq!(monitor.health_status().metrics.total_checks, 1);
}

#[tokio::test]
async fn test_open_breaker_skips_the_provider() {
    let provider = ScriptedProvider::new("alpha");
    provider.set_probe(ProbeBehavior::Failing);
    let config =
        fast_config().with_circuit_breaker(CircuitBreakerConfig::new(2, Duration::from_secs(60)));
    let monitor = ProviderHealthMonitor::new(provider.clone(), config);

    monitor.perform_health_check().await;
    monitor.perform_health_check().await;
    assert_eq!(monitor.circuit_breaker().state(), CircuitState::Open);

    let result = monitor.perform_health_check().await;
    assert_eq!(result.status, HealthState::Unhealthy);
    assert_eq!(provider.probes(), 2);
    assert_eq!(monitor.health_status().circuit.state, CircuitState::Open);
}

#[tokio::test]
async fn test_reset_metrics() {
    let provider = ScriptedProvider::new("alpha");
    provider.set_probe(ProbeBehavior::Failing);
    let monitor = ProviderHealthMonitor::new(provider, fast_config());
    monitor.perform_health_check().await;

    monitor.reset_metrics();

    let status = monitor.health_status();
    assert_eq!(status.metrics.total_checks, 0);
    assert_eq!(status.metrics.consecutive_failures, 0);
    assert!((status.metrics.uptime - 100.0).abs() < f64::EPSILON);
    assert!(status.history.is_empty());
    assert!(status.is_healthy());
}

#[tokio::test]
async fn test_status_change_events() {
    let provider = ScriptedProvider::new("alpha");
    let monitor = ProviderHealthMonitor::new(provider.clone(), fast_config());
    let seen: Arc<Mutex<Vec<HealthEvent>>> = Arc::new(Mutex::new(Vec::new()));
    let sink_seen = Arc::clone(&seen);
    monitor.set_event_sink(Arc::new(move |event: &HealthEvent| {
        sink_seen.lock().unwrap().push(event.clone());
    }));

    monitor.perform_health_check().await;
    provider.set_probe(ProbeBehavior::Failing);
    monitor.perform_health_check().await;

    let events = seen.lock().unwrap();
    let changes: Vec<_> = events
        .iter()
        .filter_map(|e| match e {
            HealthEvent::StatusChanged {
                previous, current, ..
            } => Some((*previous, *current)),
            HealthEvent::CheckCompleted(_) => None,
        })
        .collect();
    assert_eq!(events.len(), 3);
    assert_eq!(changes, vec![(HealthState::Healthy, HealthState::Unhealthy)]);
}

#[tokio::test]
async fn test_periodic_monitoring_start_stop_idempotent() {
    let provider = ScriptedProvider::new("alpha");
    let monitor = Arc::new(ProviderHealthMonitor::new(provider.clone(), fast_config()));

    monitor.start_monitoring().unwrap();
    monitor.start_monitoring().unwrap();
    assert!(monitor.is_monitoring());

    tokio::time::sleep(Duration::from_millis(150)).await;
    monitor.stop_monitoring();
    monitor.stop_monitoring();
    assert!(!monitor.is_monitoring());

    let probes_at_stop = provider.probes();
    assert!(probes_at_stop >= 1);

    tokio::time::sleep(Duration::from_millis(120)).await;
    assert_eq!(provider.probes(), probes_at_stop);
}

#[tokio::test]
async fn test_first_periodic_probe_waits_one_interval() {
    let provider = ScriptedProvider::new("alpha");
    let config = fast_config().with_check_interval(Duration::from_millis(300));
    let monitor = Arc::new(ProviderHealthMonitor::new(provider.clone(), config));

    monitor.start_monitoring().unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert_eq!(provider.probes(), 0);
    monitor.stop_monitoring();
}

#[tokio::test]
async fn test_concurrent_health_checks_are_serialized() {
    let provider = ScriptedProvider::new("alpha");
    provider.set_probe(ProbeBehavior::Slow(Duration::from_millis(30)));
    let config = fast_config()
        .with_check_interval(Duration::from_secs(3600))
        .with_timeout(Duration::from_millis(500));
    let monitor = ProviderHealthMonitor::new(provider.clone(), config);

    let (first, second) = tokio::join!(
        monitor.perform_health_check(),
        monitor.perform_health_check()
    );

    assert!(first.is_healthy());
    assert!(second.is_healthy());
    assert_eq!(provider.probes(), 2);
    assert_eq!(provider.max_concurrent_checks(), 1);
    assert_eq!(monitor.health_status().metrics.total_checks, 2);
}

#[tokio::test]
async fn test_stop_during_health_check_prevents_rescheduling() {
    let provider = ScriptedProvider::new("alpha");
    provider.set_probe(ProbeBehavior::Slow(Duration::from_millis(200)));
    let config = fast_config()
        .with_check_interval(Duration::from_millis(40))
        .with_timeout(Duration::from_millis(500));
    let monitor = Arc::new(ProviderHealthMonitor::new(provider.clone(), config));

    monitor.start_monitoring().unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(provider.probes(), 1);

    monitor.stop_monitoring();
    tokio::time::sleep(Duration::from_millis(400)).await;

    assert!(!monitor.is_monitoring());
    assert_eq!(provider.probes(), 1);
    assert_eq!(monitor.health_status().metrics.total_checks, 0);
}

#[tokio::test]
async fn test_zero_interval_is_rejected() {
    let provider = ScriptedProvider::new("alpha");
    let config = fast_config().with_check_interval(Duration::ZERO);
    let monitor = Arc::new(ProviderHealthMonitor::new(provider.clone(), config));

    let err = monitor.start_monitoring().unwrap_err();

    assert_eq!(err.code, AuthErrorCode::ValidationError);
    assert!(!monitor.is_monitoring());
    tokio::time::sleep(Duration::from_millis(30)).await;
    assert_eq!(provider.probes(), 0);
}
