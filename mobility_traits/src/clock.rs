use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};

/// Wall-clock abstraction for session timing and result timestamps.
///
/// - now(): current time as a UTC timestamp
/// - sleep(): sleeps for the provided duration (implementations may simulate)
/// - ms_since(): helper to compute elapsed milliseconds from an epoch timestamp
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
    fn sleep(&self, d: Duration);

    /// Milliseconds elapsed since `epoch`, saturating at 0 if the clock went backwards.
    fn ms_since(&self, epoch: DateTime<Utc>) -> u64 {
        let ms = (self.now() - epoch).num_milliseconds();
        u64::try_from(ms).unwrap_or(0)
    }
}

/// Default clock backed by the system time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl SystemClock {
    #[inline]
    pub fn new() -> Self {
        Self
    }
}

impl Clock for SystemClock {
    #[inline]
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    #[inline]
    fn sleep(&self, d: Duration) {
        if d.is_zero() {
            return;
        }
        thread::sleep(d);
    }
}

/// Deterministic clock whose time only moves when told to.
///
/// now() = origin + offset
/// sleep(d) advances internal time by d without actually sleeping.
/// Clones share the same offset, so a clone handed to a simulator and the
/// original held by a test observe the same time.
#[derive(Debug, Clone)]
pub struct ManualClock {
    origin: DateTime<Utc>,
    offset: Arc<Mutex<Duration>>,
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ManualClock {
    pub fn new() -> Self {
        Self::starting_at(DateTime::<Utc>::UNIX_EPOCH)
    }

    pub fn starting_at(origin: DateTime<Utc>) -> Self {
        Self {
            origin,
            offset: Arc::new(Mutex::new(Duration::ZERO)),
        }
    }

    /// Advance the clock by the given duration.
    pub fn advance(&self, d: Duration) {
        if let Ok(mut off) = self.offset.lock() {
            *off = off.saturating_add(d);
        }
    }

    /// Set the absolute offset relative to origin.
    pub fn set_offset(&self, d: Duration) {
        if let Ok(mut off) = self.offset.lock() {
            *off = d;
        }
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        let off = self.offset.lock().map(|g| *g).unwrap_or(Duration::ZERO);
        let delta = TimeDelta::from_std(off).unwrap_or(TimeDelta::zero());
        self.origin.checked_add_signed(delta).unwrap_or(self.origin)
    }

    fn sleep(&self, d: Duration) {
        self.advance(d);
    }
}
