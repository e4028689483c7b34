//! Injectable time sources for the update-coalescing gate.
//!
//! The gate measures elapsed wall-clock time between accepted updates. Taking
//! the time source as a trait object keeps that measurement deterministic in
//! tests: the [`ManualClock`] advances only when told to, so debounce windows
//! can be exercised without real delays.

use std::sync::atomic::{AtomicI64, Ordering};

/// Millisecond-resolution time source.
///
/// Implementations must be cheap to call; the store reads the clock once per
/// attempted mutation.
pub trait Clock: Send + Sync {
    /// Returns the current time as milliseconds since the Unix epoch.
    fn now_millis(&self) -> i64;
}

/// Wall-clock time source backed by `chrono`.
///
/// This is the default clock used by stores when none is injected.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

/// Manually-advanced time source for tests.
///
/// Starts at a caller-chosen instant and only moves when [`advance`] or
/// [`set`] is called, making threshold boundaries exact.
///
/// [`advance`]: ManualClock::advance
/// [`set`]: ManualClock::set
///
/// # Examples
///
/// ```
/// use crudstore::{Clock, ManualClock};
///
/// let clock = ManualClock::new(1_000);
/// clock.advance(50);
/// assert_eq!(clock.now_millis(), 1_050);
/// ```
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicI64,
}

impl ManualClock {
    /// Creates a clock frozen at the given epoch-millisecond instant.
    #[must_use]
    pub fn new(start_millis: i64) -> Self {
        Self {
            now: AtomicI64::new(start_millis),
        }
    }

    /// Moves the clock forward by the given number of milliseconds.
    pub fn advance(&self, millis: i64) {
        self.now.fetch_add(millis, Ordering::SeqCst);
    }

    /// Jumps the clock to an absolute epoch-millisecond instant.
    pub fn set(&self, millis: i64) {
        self.now.store(millis, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_millis(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_advances_and_sets() {
        let clock = ManualClock::new(0);
        assert_eq!(clock.now_millis(), 0);

        clock.advance(100);
        assert_eq!(clock.now_millis(), 100);

        clock.set(5_000);
        assert_eq!(clock.now_millis(), 5_000);
    }

    #[test]
    fn system_clock_is_monotonic_enough_for_the_gate() {
        let clock = SystemClock;
        let first = clock.now_millis();
        let second = clock.now_millis();
        assert!(second >= first);
    }
}
