use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Monotonic session clock
///
/// Clones share the same time base, including when mocked.
#[derive(Debug, Clone)]
pub struct Clock {
    inner: ClockSource,
}

#[derive(Debug, Clone)]
enum ClockSource {
    Monotonic(Instant),
    Mock(Arc<AtomicU64>),
}

/// Handle that drives a mocked [`Clock`]
#[derive(Debug, Clone)]
pub struct ClockMock(Arc<AtomicU64>);

impl ClockMock {
    pub fn increment(&self, amount: Duration) {
        self.0.fetch_add(saturating_nanos(amount), Ordering::SeqCst);
    }

    pub fn set(&self, value: Duration) {
        self.0.store(saturating_nanos(value), Ordering::SeqCst);
    }
}

fn saturating_nanos(amount: Duration) -> u64 {
    u64::try_from(amount.as_nanos()).unwrap_or(u64::MAX)
}

impl Clock {
    pub fn new() -> Self {
        Self {
            inner: ClockSource::Monotonic(Instant::now()),
        }
    }

    /// A clock frozen at zero that only moves through the returned handle
    pub fn mock() -> (Self, ClockMock) {
        let nanos = Arc::new(AtomicU64::new(0));
        (
            Self {
                inner: ClockSource::Mock(nanos.clone()),
            },
            ClockMock(nanos),
        )
    }

    /// Time since the clock's reference point
    pub fn now(&self) -> Duration {
        match &self.inner {
            ClockSource::Monotonic(origin) => origin.elapsed(),
            ClockSource::Mock(nanos) => Duration::from_nanos(nanos.load(Ordering::SeqCst)),
        }
    }

    /// Seconds elapsed since `since`, a value previously read from this clock
    pub fn elapsed_secs(&self, since: Duration) -> f64 {
        self.now().saturating_sub(since).as_secs_f64()
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mock_moves_only_when_told() {
        let (clock, mock) = Clock::mock();
        assert_eq!(clock.now(), Duration::ZERO);

        mock.increment(Duration::from_millis(250));
        assert_eq!(clock.now(), Duration::from_millis(250));

        let copy = clock.clone();
        mock.set(Duration::from_secs(2));
        assert_eq!(copy.now(), Duration::from_secs(2));
        assert!((clock.elapsed_secs(Duration::from_millis(500)) - 1.5).abs() < 1e-9);
    }

    #[test]
    fn oversized_durations_saturate() {
        let (clock, mock) = Clock::mock();
        mock.set(Duration::MAX);
        assert_eq!(clock.now(), Duration::from_nanos(u64::MAX));
    }

    #[test]
    fn monotonic_never_goes_back() {
        let clock = Clock::new();
        let a = clock.now();
        let b = clock.now();
        assert!(b >= a);
    }
}
