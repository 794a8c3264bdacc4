use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use mobility_traits::Clock;

use crate::error::{HwError, Result};

/// Emission period for a line rate in Hz.
pub fn period_from_hz(rate_hz: f64) -> Result<Duration> {
    if !rate_hz.is_finite() || rate_hz <= 0.0 {
        return Err(HwError::InvalidRate(rate_hz));
    }
    Ok(Duration::from_secs_f64(1.0 / rate_hz))
}

/// Fixed-rate emission schedule on top of a `Clock`.
///
/// The first tick is due immediately; later ticks are spaced one period
/// apart from the previous due time, so slow consumers do not drift the rate.
#[derive(Debug, Clone)]
pub struct Pacer {
    period: Duration,
    next_due: Option<DateTime<Utc>>,
}

impl Pacer {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            next_due: None,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Wait for the next tick, but never longer than `timeout`.
    ///
    /// Returns `true` when a tick is due (and schedules the following one),
    /// `false` when the timeout ran out first.
    pub fn wait_tick(&mut self, clock: &impl Clock, timeout: Duration) -> bool {
        let now = clock.now();
        let due = *self.next_due.get_or_insert(now);
        let wait = (due - now).to_std().unwrap_or(Duration::ZERO);
        if wait > timeout {
            clock.sleep(timeout);
            return false;
        }
        clock.sleep(wait);
        let step = TimeDelta::from_std(self.period).unwrap_or(TimeDelta::zero());
        self.next_due = due.checked_add_signed(step);
        true
    }
}

/// Copy as much of `pending` as fits into `buf`, removing it from `pending`.
pub(crate) fn drain_into(pending: &mut Vec<u8>, buf: &mut [u8]) -> usize {
    let n = pending.len().min(buf.len());
    buf[..n].copy_from_slice(&pending[..n]);
    pending.drain(..n);
    n
}
