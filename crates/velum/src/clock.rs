#![forbid(unsafe_code)]

//! Time sources for transition timers.
//!
//! The lifecycle machine never sleeps; it records deadlines against a
//! [`Clock`] and fires them when [`Modal::tick`](crate::Modal::tick) is
//! driven past them. [`WallClock`] is the production source; [`ManualClock`]
//! is a shared-handle virtual clock for tests and deterministic demos.

use std::cell::Cell;
use std::rc::Rc;

use web_time::{Duration, Instant};

/// A monotonic time source.
pub trait Clock {
    /// The current instant.
    fn now(&self) -> Instant;
}

/// Real wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct WallClock;

impl Clock for WallClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// A virtual clock advanced by hand.
///
/// Clones share the same underlying instant, so a test can hold one handle
/// while the modal holds another.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Rc<Cell<Instant>>,
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ManualClock {
    /// Create a clock frozen at the current instant.
    pub fn new() -> Self {
        Self {
            now: Rc::new(Cell::new(Instant::now())),
        }
    }

    /// Advance the clock by `delta`.
    pub fn advance(&self, delta: Duration) {
        self.now.set(self.now.get() + delta);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.now.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_advances() {
        let clock = ManualClock::new();
        let start = clock.now();
        clock.advance(Duration::from_millis(300));
        assert_eq!(clock.now() - start, Duration::from_millis(300));
    }

    #[test]
    fn manual_clock_clones_share_time() {
        let a = ManualClock::new();
        let b = a.clone();
        a.advance(Duration::from_millis(50));
        assert_eq!(a.now(), b.now());
    }
}
