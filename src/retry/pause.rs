//! The wait between a failed attempt and the next one.
//!
//! The executor only promises that a pause happens strictly between two
//! attempts. Whether that pause is a real sleep or an advance of a test clock
//! is up to the [`Pause`] implementation.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

/// Something that can wait for a duration.
pub trait Pause {
    /// Wait for `delay`.
    fn pause(&self, delay: Duration);
}

/// Blocks the current thread with [`std::thread::sleep`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadSleep;

impl Pause for ThreadSleep {
    fn pause(&self, delay: Duration) {
        if !delay.is_zero() {
            std::thread::sleep(delay);
        }
    }
}

/// Returns immediately.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPause;

impl Pause for NoPause {
    fn pause(&self, _delay: Duration) {}
}

/// A test clock that records every pause instead of sleeping.
///
/// Clones share the same record, so a test can hand one clone to an executor
/// and inspect another afterwards.
///
/// # Examples
///
/// ```rust
/// use faultscript::{Pause, VirtualClock};
/// use std::time::Duration;
///
/// let clock = VirtualClock::new();
/// let handle = clock.clone();
///
/// clock.pause(Duration::from_millis(100));
/// clock.pause(Duration::from_millis(200));
///
/// assert_eq!(handle.pause_count(), 2);
/// assert_eq!(handle.elapsed(), Duration::from_millis(300));
/// ```
#[derive(Debug, Clone, Default)]
pub struct VirtualClock {
    pauses: Arc<Mutex<Vec<Duration>>>,
}

impl VirtualClock {
    /// A clock at time zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every recorded pause, in order.
    pub fn pauses(&self) -> Vec<Duration> {
        self.pauses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of pauses recorded.
    pub fn pause_count(&self) -> usize {
        self.pauses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Sum of all recorded pauses.
    pub fn elapsed(&self) -> Duration {
        self.pauses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .sum()
    }
}

impl Pause for VirtualClock {
    fn pause(&self, delay: Duration) {
        self.pauses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(delay);
    }
}

impl<P: Pause + ?Sized> Pause for &P {
    fn pause(&self, delay: Duration) {
        (**self).pause(delay)
    }
}

impl<P: Pause + ?Sized> Pause for Arc<P> {
    fn pause(&self, delay: Duration) {
        (**self).pause(delay)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn no_pause_returns_immediately() {
        let start = Instant::now();
        NoPause.pause(Duration::from_secs(60));
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn thread_sleep_waits() {
        let start = Instant::now();
        ThreadSleep.pause(Duration::from_millis(5));
        assert!(start.elapsed() >= Duration::from_millis(5));
    }

    #[test]
    fn virtual_clock_records_zero_pauses_too() {
        let clock = VirtualClock::new();
        clock.pause(Duration::ZERO);
        assert_eq!(clock.pause_count(), 1);
        assert_eq!(clock.elapsed(), Duration::ZERO);
    }

    #[test]
    fn shared_clock_through_arc() {
        let clock = VirtualClock::new();
        let shared: Arc<dyn Pause + Send + Sync> = Arc::new(clock.clone());
        shared.pause(Duration::from_millis(7));
        assert_eq!(clock.pauses(), vec![Duration::from_millis(7)]);
    }
}
