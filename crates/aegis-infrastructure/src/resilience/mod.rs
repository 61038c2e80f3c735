//! Resilience primitives
//!
//! | Type | Description |
//! |------|-------------|
//! | [`CircuitBreaker`] | Per-provider failure-isolating state machine |
//! | [`CircuitBreakerConfig`] | Thresholds and timings of a breaker |

pub mod circuit_breaker;

pub use circuit_breaker::{CircuitBreaker, CircuitBreakerConfig};
