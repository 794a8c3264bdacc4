//! Simulated IMU: a deterministic multi-channel angle stream.
//!
//! Each channel is a slow sine around zero, phase-shifted per channel, with
//! values printed to two decimals like the real device firmware. Lines are
//! paced at the configured rate against a `Clock`, so a `ManualClock` makes
//! the stream fully reproducible.

use std::f64::consts::{PI, TAU};
use std::fmt::Write as _;
use std::time::Duration;

use mobility_traits::{ByteSource, Clock, SystemClock};

use crate::error::{HwError, Result};
use crate::util::{Pacer, drain_into, period_from_hz};

/// Motion frequency of the simulated joint, in Hz.
const MOTION_HZ: f64 = 0.5;

pub struct SimulatedImu<C: Clock = SystemClock> {
    clock: C,
    channels: usize,
    amplitude: f64,
    rate_hz: f64,
    pacer: Pacer,
    tick: u64,
    pending: Vec<u8>,
}

impl SimulatedImu<SystemClock> {
    pub fn new(channels: usize, rate_hz: f64, amplitude: f64) -> Result<Self> {
        Self::with_clock(channels, rate_hz, amplitude, SystemClock)
    }
}

impl<C: Clock> SimulatedImu<C> {
    pub fn with_clock(channels: usize, rate_hz: f64, amplitude: f64, clock: C) -> Result<Self> {
        if channels == 0 {
            return Err(HwError::NoChannels);
        }
        let period = period_from_hz(rate_hz)?;
        Ok(Self {
            clock,
            channels,
            amplitude,
            rate_hz,
            pacer: Pacer::new(period),
            tick: 0,
            pending: Vec::new(),
        })
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Lines emitted so far.
    pub fn ticks(&self) -> u64 {
        self.tick
    }

    /// Values for the given tick, before formatting.
    pub fn values_at(&self, tick: u64) -> Vec<f64> {
        let t = tick as f64 / self.rate_hz;
        (0..self.channels)
            .map(|ch| {
                let phase = ch as f64 * PI / 3.0;
                self.amplitude * (TAU * MOTION_HZ * t + phase).sin()
            })
            .collect()
    }

    fn render_line(&self, tick: u64) -> String {
        let mut line = String::with_capacity(self.channels * 8);
        for (i, v) in self.values_at(tick).into_iter().enumerate() {
            if i > 0 {
                line.push(',');
            }
            let _ = write!(line, "{v:.2}");
        }
        line.push_str("\r\n");
        line
    }
}

impl<C: Clock> ByteSource for SimulatedImu<C> {
    fn read(
        &mut self,
        buf: &mut [u8],
        timeout: Duration,
    ) -> std::result::Result<usize, Box<dyn std::error::Error + Send + Sync>> {
        if self.pending.is_empty() {
            if !self.pacer.wait_tick(&self.clock, timeout) {
                return Ok(0);
            }
            let line = self.render_line(self.tick);
            self.tick += 1;
            tracing::trace!(tick = self.tick, "simulated line");
            self.pending.extend_from_slice(line.as_bytes());
        }
        Ok(drain_into(&mut self.pending, buf))
    }
}
