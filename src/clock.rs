//! Monotonic clock collaborator
//!
//! Milliseconds since boot, plus the short blocking delay used while hunting
//! for a free file name.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

pub trait Clock {
    /// Milliseconds since boot; never decreases
    fn now_ms(&self) -> u64;

    /// Block for `ms` milliseconds
    fn delay_ms(&self, ms: u64);
}

/// Wall-time clock counting from its construction
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    boot: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            boot: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now_ms(&self) -> u64 {
        self.boot.elapsed().as_millis() as u64
    }

    fn delay_ms(&self, ms: u64) {
        std::thread::sleep(Duration::from_millis(ms));
    }
}

/// Simulated clock. Clones share the same time.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Arc<AtomicU64>,
    frozen: Arc<AtomicBool>,
}

impl ManualClock {
    pub fn new(start_ms: u64) -> Self {
        Self {
            now: Arc::new(AtomicU64::new(start_ms)),
            frozen: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn set(&self, ms: u64) {
        self.now.store(ms, Ordering::SeqCst);
    }

    pub fn advance(&self, ms: u64) {
        self.now.fetch_add(ms, Ordering::SeqCst);
    }

    /// When frozen, `delay_ms` no longer moves time forward
    pub fn freeze(&self, frozen: bool) {
        self.frozen.store(frozen, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }

    fn delay_ms(&self, ms: u64) {
        if !self.frozen.load(Ordering::SeqCst) {
            self.advance(ms);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock_delay_advances() {
        let clock = ManualClock::new(100);
        let shared = clock.clone();

        clock.delay_ms(5);
        assert_eq!(shared.now_ms(), 105);

        shared.freeze(true);
        clock.delay_ms(5);
        assert_eq!(clock.now_ms(), 105);

        clock.set(2_000);
        assert_eq!(shared.now_ms(), 2_000);
    }

    #[test]
    fn test_monotonic_clock_never_decreases() {
        let clock = MonotonicClock::new();
        let first = clock.now_ms();
        clock.delay_ms(2);
        assert!(clock.now_ms() >= first + 2);
    }
}
