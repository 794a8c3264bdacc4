//! Live view feed.
//!
//! Data arrival and display refresh are separate: every decoded sample is
//! pushed into the buffer, while redraws are throttled by `RefreshGate` and may
//! be skipped freely.

use crate::config::PlotCfg;
use mobility_traits::PlotFeed;
use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Per-channel moving window of recent readings.
#[derive(Debug, Clone)]
pub struct PlotBuffer {
    labels: Vec<String>,
    channels: Vec<VecDeque<f64>>,
    max_points: usize,
    pushed: u64,
}

impl PlotBuffer {
    pub fn new(channels: usize, cfg: &PlotCfg) -> Self {
        let labels = match &cfg.labels {
            Some(l) if l.len() == channels => l.clone(),
            _ => default_labels(channels),
        };
        let max_points = cfg.max_points.max(1);
        Self {
            labels,
            channels: (0..channels)
                .map(|_| VecDeque::with_capacity(max_points))
                .collect(),
            max_points,
            pushed: 0,
        }
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn channel(&self, idx: usize) -> Option<&VecDeque<f64>> {
        self.channels.get(idx)
    }

    /// Most recent value per channel, if anything has been pushed.
    pub fn latest(&self) -> Option<Vec<f64>> {
        self.channels
            .iter()
            .map(|c| c.back().copied())
            .collect::<Option<Vec<f64>>>()
    }

    /// Number of points currently held per channel.
    pub fn len(&self) -> usize {
        self.channels.first().map_or(0, VecDeque::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total samples ever pushed, including evicted ones.
    pub fn pushed(&self) -> u64 {
        self.pushed
    }

    /// Min and max over the current window of one channel.
    pub fn range(&self, idx: usize) -> Option<(f64, f64)> {
        let ch = self.channels.get(idx)?;
        let mut it = ch.iter().copied();
        let first = it.next()?;
        Some(it.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v))))
    }
}

impl PlotFeed for PlotBuffer {
    fn push(&mut self, values: &[f64]) {
        if values.len() != self.channels.len() {
            tracing::trace!(
                got = values.len(),
                want = self.channels.len(),
                "plot feed ignoring sample with wrong channel count"
            );
            return;
        }
        for (ch, v) in self.channels.iter_mut().zip(values) {
            if ch.len() == self.max_points {
                ch.pop_front();
            }
            ch.push_back(*v);
        }
        self.pushed += 1;
    }
}

/// Feed that discards everything; for headless runs.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullFeed;

impl PlotFeed for NullFeed {
    fn push(&mut self, _values: &[f64]) {}
}

pub fn default_labels(channels: usize) -> Vec<String> {
    (1..=channels).map(|i| format!("Sensor {i}")).collect()
}

/// Allows at most one refresh per interval.
#[derive(Debug, Clone)]
pub struct RefreshGate {
    interval: Duration,
    last: Option<Instant>,
}

impl RefreshGate {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last: None,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// True when a refresh is due at `now`; records it as done.
    pub fn ready(&mut self, now: Instant) -> bool {
        match self.last {
            Some(prev) if now.saturating_duration_since(prev) < self.interval => false,
            _ => {
                self.last = Some(now);
                true
            }
        }
    }
}
