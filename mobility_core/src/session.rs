//! Timed joint mobility test state machine.
//!
//! ```text
//! Idle --start--> AwaitingBaseline --sample--> Accumulating --sample, elapsed >= duration--> Idle
//!                       |                           |                                  (emits TestResult)
//!                       +-------------abort---------+--> Idle
//! ```
//!
//! Elapsed time is only checked when a sample arrives; a session that stops
//! receiving samples stays open indefinitely.

use crate::decoder::Sample;
use crate::error::SessionError;
use crate::joint::TestIdentifier;
use crate::scoring::score;
use crate::status::{SessionPhase, SessionStatus};
use crate::types::TestResult;
use crate::util::round_tenths;
use chrono::{DateTime, Utc};
use std::time::Duration;

#[derive(Debug, Clone)]
struct ActiveSession {
    test_identifier: TestIdentifier,
    start_time: DateTime<Utc>,
    baseline: Option<Sample>,
    max_difference: Vec<f64>,
}

#[derive(Debug, Clone)]
pub struct TestSession {
    expected_channels: usize,
    duration: Duration,
    active: Option<ActiveSession>,
}

impl TestSession {
    pub fn new(expected_channels: usize, duration: Duration) -> Self {
        Self {
            expected_channels,
            duration,
            active: None,
        }
    }

    pub fn expected_channels(&self) -> usize {
        self.expected_channels
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn phase(&self) -> SessionPhase {
        match &self.active {
            None => SessionPhase::Idle,
            Some(s) if s.baseline.is_none() => SessionPhase::AwaitingBaseline,
            Some(_) => SessionPhase::Accumulating,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn test_identifier(&self) -> Option<TestIdentifier> {
        self.active.as_ref().map(|s| s.test_identifier)
    }

    pub fn baseline(&self) -> Option<&Sample> {
        self.active.as_ref().and_then(|s| s.baseline.as_ref())
    }

    /// Running per-channel maximum deviation of the active session (unrounded).
    pub fn max_difference(&self) -> Option<&[f64]> {
        self.active.as_ref().map(|s| s.max_difference.as_slice())
    }

    pub fn start_time(&self) -> Option<DateTime<Utc>> {
        self.active.as_ref().map(|s| s.start_time)
    }

    /// Begin a test. Rejected while another test is running; the running test
    /// is left untouched.
    pub fn start(
        &mut self,
        test_identifier: TestIdentifier,
        now: DateTime<Utc>,
    ) -> Result<(), SessionError> {
        if self.active.is_some() {
            return Err(SessionError::AlreadyActive);
        }
        self.active = Some(ActiveSession {
            test_identifier,
            start_time: now,
            baseline: None,
            max_difference: vec![0.0; self.expected_channels],
        });
        tracing::info!(
            test = %test_identifier,
            duration_ms = self.duration.as_millis() as u64,
            "test session started"
        );
        Ok(())
    }

    /// Drop the running test without producing a result. Returns whether a
    /// test was running.
    pub fn abort(&mut self) -> bool {
        match self.active.take() {
            Some(s) => {
                tracing::info!(test = %s.test_identifier, "test session aborted");
                true
            }
            None => false,
        }
    }

    /// Feed one decoded sample taken at `now`.
    ///
    /// # Panics
    /// If the sample length differs from the configured channel count. The
    /// engine guarantees both come from the same configuration, so a mismatch
    /// is a wiring bug rather than bad device data.
    pub fn process_sample(&mut self, sample: &Sample, now: DateTime<Utc>) -> SessionStatus {
        let Some(active) = self.active.as_mut() else {
            return SessionStatus::Idle;
        };
        assert_eq!(
            sample.len(),
            self.expected_channels,
            "sample has {} channels, session configured for {}",
            sample.len(),
            self.expected_channels
        );

        let captured = if let Some(baseline) = &active.baseline {
            for ((max, cur), base) in active
                .max_difference
                .iter_mut()
                .zip(sample.values())
                .zip(baseline.values())
            {
                let diff = (cur - base).abs();
                if diff > *max {
                    *max = diff;
                }
            }
            false
        } else {
            active.baseline = Some(sample.clone());
            tracing::debug!(test = %active.test_identifier, baseline = ?sample.values(), "baseline captured");
            true
        };

        let elapsed = (now - active.start_time).to_std().unwrap_or(Duration::ZERO);
        if elapsed >= self.duration
            && let Some(done) = self.active.take()
        {
            return SessionStatus::Completed(finish(done, now));
        }
        if captured {
            SessionStatus::BaselineCaptured
        } else {
            SessionStatus::Accumulating { elapsed }
        }
    }
}

/// Round the accumulated deviations and score them.
fn finish(done: ActiveSession, now: DateTime<Utc>) -> TestResult {
    let mut rounded = done.max_difference;
    round_tenths(&mut rounded);
    let result = TestResult::new(done.test_identifier, now, score(&rounded), rounded);
    tracing::info!(
        test = %result.test_identifier,
        score = result.score,
        max_difference = ?result.max_difference,
        "test session completed"
    );
    result
}
