//! Trailing-edge debounce for deferred work.
//!
//! A [`Debouncer`] holds at most one pending deadline. Each
//! [`trigger`](Debouncer::trigger) replaces it, so a burst of triggers closer
//! together than the window fires exactly once, one window after the last
//! trigger. The host supplies the clock, which keeps the type free of
//! threads and timers and makes it deterministic under test.

use std::time::{Duration, Instant};

/// Single restartable deadline.
#[derive(Debug, Clone)]
pub struct Debouncer {
    window: Duration,
    deadline: Option<Instant>,
}

impl Debouncer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            deadline: None,
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Schedules the work one window after `now`, replacing any pending deadline.
    pub fn trigger(&mut self, now: Instant) {
        self.deadline = Some(now + self.window);
    }

    /// Returns `true` exactly once when the pending deadline has passed.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    /// Drops the pending deadline without firing.
    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: Duration = Duration::from_millis(50);

    #[test]
    fn test_burst_fires_once() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(WINDOW);
        let mut fired = 0;

        for step in 0..10u64 {
            let now = start + Duration::from_millis(step * 10);
            debouncer.trigger(now);
            if debouncer.poll(now) {
                fired += 1;
            }
        }
        // Last trigger at 90ms, deadline at 140ms
        assert!(!debouncer.poll(start + Duration::from_millis(139)));
        for ms in [140, 150, 500] {
            if debouncer.poll(start + Duration::from_millis(ms)) {
                fired += 1;
            }
        }

        assert_eq!(fired, 1);
        assert!(!debouncer.is_pending());
    }

    #[test]
    fn test_spaced_triggers_fire_each_time() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(WINDOW);

        debouncer.trigger(start);
        assert!(debouncer.poll(start + WINDOW));
        debouncer.trigger(start + WINDOW * 2);
        assert!(debouncer.poll(start + WINDOW * 3));
    }

    #[test]
    fn test_cancel() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(WINDOW);
        debouncer.trigger(start);
        debouncer.cancel();
        assert!(!debouncer.poll(start + WINDOW * 10));
        assert_eq!(debouncer.deadline(), None);
    }
}
