//! Clock adapters.
//!
//! - [`SystemClock`] reads the wall clock as Unix-epoch milliseconds, which
//!   is what `lastUpdated` stamps are stored as.
//! - [`ManualClock`] only moves when told to.  Simulation and tests use it
//!   to step debounce deadlines deterministically.

use std::cell::Cell;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::app::ports::Clock;

/// Wall-clock time from the host OS.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl SystemClock {
    pub fn new() -> Self {
        Self
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        // A clock set before 1970 reads as the epoch.
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    }
}

/// Hand-driven clock.  Share it through `Rc` to keep advancing it after
/// the store has taken its copy.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<u64>,
}

impl ManualClock {
    pub fn new(start_ms: u64) -> Self {
        Self { now: Cell::new(start_ms) }
    }

    pub fn advance(&self, ms: u64) {
        self.now.set(self.now.get().saturating_add(ms));
    }

    pub fn set(&self, now_ms: u64) {
        self.now.set(now_ms);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now.get()
    }
}
