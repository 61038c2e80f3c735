//! Timing instrumentation helpers

use std::time::{Duration, Instant};

/// Tracks elapsed time of an operation, with an optional floor
///
/// # Example
///
/// ```ignore
/// use aegis_infrastructure::utils::TimedOperation;
///
/// let timer = TimedOperation::start().with_floor(Duration::from_millis(1));
/// provider.validate_session().await;
/// let response_time = timer.elapsed();
/// ```
#[derive(Debug, Clone, Copy)]
pub struct TimedOperation {
    start: Instant,
    floor: Duration,
}

impl TimedOperation {
    /// Start a new timed operation
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
            floor: Duration::ZERO,
        }
    }

    /// Never report less than `floor`
    #[must_use]
    pub fn with_floor(mut self, floor: Duration) -> Self {
        self.floor = floor;
        self
    }

    /// Elapsed time, at least the floor
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed().max(self.floor)
    }

    /// Elapsed time in milliseconds
    pub fn elapsed_ms(&self) -> u64 {
        u64::try_from(self.elapsed().as_millis()).unwrap_or(u64::MAX)
    }

    /// Remaining time before `deadline` (None if already exceeded)
    pub fn remaining(&self, deadline: Duration) -> Option<Duration> {
        deadline.checked_sub(self.start.elapsed())
    }
}
