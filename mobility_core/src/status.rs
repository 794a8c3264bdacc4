//! Session status reported for each processed sample.

use crate::types::TestResult;
use std::time::Duration;

/// Where the session state machine currently is.
///
/// `Completed` is transient: completing a test emits the result and lands
/// back on `Idle`, so it only ever shows up as a `SessionStatus`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Idle,
    AwaitingBaseline,
    Accumulating,
}

/// Outcome of feeding one sample to the session.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionStatus {
    /// No test running; the sample only feeds the live view.
    Idle,
    /// The sample became the baseline.
    BaselineCaptured,
    /// Deviation updated; the window is still open.
    Accumulating { elapsed: Duration },
    /// Window elapsed; session is idle again.
    Completed(TestResult),
}

/// Outcome of feeding one raw device line through the engine.
#[derive(Debug, Clone, PartialEq)]
pub enum LineOutcome {
    /// Malformed line, discarded without touching session state.
    Dropped,
    Accepted(SessionStatus),
}
