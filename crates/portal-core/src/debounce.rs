//! Debounced invocation with an explicit clock.
//!
//! ```text
//! schedule(a, t0) ─▶ pending(a, due t0+q)
//! schedule(b, t1) ─▶ pending(b, due t1+q)      (a is dropped)
//! poll(t < due)   ─▶ None
//! poll(t ≥ due)   ─▶ Some(b), idle
//! ```

use std::time::{Duration, Instant};

/// Holds at most one pending value until a quiet period has elapsed.
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    quiet_period: Duration,
    pending: Option<(T, Instant)>,
}

impl<T> Debouncer<T> {
    pub fn new(quiet_period: Duration) -> Self {
        Self {
            quiet_period,
            pending: None,
        }
    }

    pub fn quiet_period(&self) -> Duration {
        self.quiet_period
    }

    /// Replace any pending value and restart the quiet period at `now`.
    pub fn schedule(&mut self, value: T, now: Instant) {
        self.pending = Some((value, now + self.quiet_period));
    }

    /// Take the pending value once its quiet period has elapsed.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        match &self.pending {
            Some((_, due)) if now >= *due => self.pending.take().map(|(value, _)| value),
            _ => None,
        }
    }

    /// When the pending value becomes due.
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(_, due)| *due)
    }

    /// Drop the pending value. Returns whether one was pending.
    pub fn cancel(&mut self) -> bool {
        self.pending.take().is_some()
    }

    /// Take the pending value immediately, regardless of the quiet period.
    pub fn flush(&mut self) -> Option<T> {
        self.pending.take().map(|(value, _)| value)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const QUIET: Duration = Duration::from_millis(300);

    #[test]
    fn test_fires_after_quiet_period() {
        let t0 = Instant::now();
        let mut debouncer = Debouncer::new(QUIET);
        debouncer.schedule("a", t0);

        assert_eq!(debouncer.poll(t0 + Duration::from_millis(299)), None);
        assert_eq!(debouncer.poll(t0 + QUIET), Some("a"));
        assert!(!debouncer.is_pending());
        assert_eq!(debouncer.poll(t0 + QUIET * 2), None);
    }

    #[test]
    fn test_reschedule_restarts_timer() {
        let t0 = Instant::now();
        let mut debouncer = Debouncer::new(QUIET);
        debouncer.schedule("a", t0);
        debouncer.schedule("ab", t0 + Duration::from_millis(200));

        assert_eq!(debouncer.poll(t0 + QUIET), None);
        assert_eq!(debouncer.poll(t0 + Duration::from_millis(500)), Some("ab"));
    }

    #[test]
    fn test_cancel_and_flush() {
        let t0 = Instant::now();
        let mut debouncer = Debouncer::new(QUIET);
        debouncer.schedule(1, t0);
        assert_eq!(debouncer.deadline(), Some(t0 + QUIET));
        assert!(debouncer.cancel());
        assert_eq!(debouncer.poll(t0 + QUIET), None);

        debouncer.schedule(2, t0);
        assert_eq!(debouncer.flush(), Some(2));
        assert!(!debouncer.is_pending());
    }
}
