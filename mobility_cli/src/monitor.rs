//! The `run` command: device stream → engine, with a throttled live view.

use std::io::{IsTerminal, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use eyre::{Result, WrapErr};
use mobility_config::Config;
use mobility_core::{
    EngineError, LineOutcome, LineReader, MobilityEngine, PlotBuffer, ReaderEvent, RefreshGate,
    ResultStore, SessionPhase, SessionStatus, TestIdentifier, TestResult,
};
use mobility_hardware::{ReplaySource, SimulatedImu};
use mobility_traits::{ByteSource, Clock, SystemClock};

/// How long the loop waits for a line before checking for Ctrl-C.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error("interrupted; the running test was aborted")]
    Interrupted,
    #[error("device stream ended before the test completed")]
    SourceClosed,
    #[error("line limit of {0} reached before the test completed")]
    LineLimit(u64),
}

#[derive(Debug)]
pub enum SourceKind {
    Simulated,
    Replay(PathBuf),
    Serial(String),
}

#[derive(Debug)]
pub struct RunParams {
    pub test: Option<TestIdentifier>,
    pub source: SourceKind,
    pub max_lines: Option<u64>,
}

#[derive(Debug, Default)]
pub struct RunSummary {
    pub lines: u64,
    pub dropped: u64,
    pub result: Option<TestResult>,
    pub best: Option<TestResult>,
}

pub fn open_source(cfg: &Config, kind: &SourceKind) -> Result<Box<dyn ByteSource + Send>> {
    let rate_hz = f64::from(cfg.simulator.rate_hz);
    match kind {
        SourceKind::Simulated => {
            let sim = SimulatedImu::new(cfg.device.channels, rate_hz, cfg.simulator.amplitude)?;
            tracing::info!(channels = cfg.device.channels, rate_hz, "using simulated device");
            Ok(Box::new(sim))
        }
        SourceKind::Replay(path) => {
            let src = ReplaySource::open(path)
                .wrap_err_with(|| format!("open replay file {}", path.display()))?
                .paced(rate_hz, SystemClock)?;
            tracing::info!(path = %path.display(), rate_hz, "replaying capture");
            Ok(Box::new(src))
        }
        #[cfg(feature = "serial")]
        SourceKind::Serial(port) => {
            let src = mobility_hardware::SerialSource::open(
                port,
                cfg.device.baud_rate,
                Duration::from_millis(cfg.device.read_timeout_ms),
            )?;
            Ok(Box::new(src))
        }
        #[cfg(not(feature = "serial"))]
        SourceKind::Serial(port) => {
            eyre::bail!("cannot open {port}: this build has no serial support (enable the `serial` feature)")
        }
    }
}

pub fn run_monitor(
    cfg: &Config,
    store: ResultStore,
    params: RunParams,
    shutdown: Arc<AtomicBool>,
) -> Result<RunSummary> {
    let clock = SystemClock::new();
    let channels = cfg.device.channels;
    let feed = PlotBuffer::new(channels, &(&cfg.plot).into());
    let mut engine = MobilityEngine::builder()
        .with_session(cfg.into())
        .with_store(store)
        .build_with_feed(feed)?;

    let source = open_source(cfg, &params.source)?;
    let reader = LineReader::spawn(source, Duration::from_millis(cfg.device.read_timeout_ms));

    if let Some(test) = params.test {
        engine.start(test, clock.now())?;
        if !crate::cli::json_mode() {
            eprintln!("{test}: {}", test.description());
        }
    }

    let live = !crate::cli::json_mode() && std::io::stderr().is_terminal();
    let mut gate = RefreshGate::new(Duration::from_millis(cfg.plot.refresh_ms));
    let mut summary = RunSummary::default();

    loop {
        if shutdown.load(Ordering::Relaxed) {
            if engine.abort() {
                return Err(RunError::Interrupted.into());
            }
            tracing::info!("monitor stopped by user");
            break;
        }

        match reader.recv_timeout(POLL_INTERVAL) {
            ReaderEvent::Line(line) => {
                summary.lines += 1;
                match engine.handle_line(&line, clock.now()) {
                    Ok(LineOutcome::Accepted(SessionStatus::Completed(result))) => {
                        summary.result = Some(result);
                        break;
                    }
                    Ok(_) => {}
                    Err(EngineError::Persist { result, source }) => {
                        // Show the score even though it was not saved.
                        crate::print_result(&result, None);
                        return Err(EngineError::Persist { result, source }.into());
                    }
                    Err(e) => return Err(e.into()),
                }
            }
            ReaderEvent::Idle => {}
            ReaderEvent::Closed => {
                if engine.abort() {
                    return Err(RunError::SourceClosed.into());
                }
                break;
            }
        }

        if live && gate.ready(Instant::now()) {
            render_live(&engine, clock.now());
        }

        if let Some(limit) = params.max_lines
            && summary.lines >= limit
        {
            if engine.abort() {
                return Err(RunError::LineLimit(limit).into());
            }
            break;
        }
    }

    if live {
        eprintln!();
    }
    summary.dropped = engine.dropped_lines();
    if let Some(result) = &summary.result {
        summary.best = engine.best_result_for(result.test_identifier).cloned();
    }
    Ok(summary)
}

fn render_live(engine: &MobilityEngine<PlotBuffer>, now: chrono::DateTime<chrono::Utc>) {
    let feed = engine.feed();
    let Some(latest) = feed.latest() else {
        return;
    };
    let mut line = String::new();
    match engine.phase() {
        SessionPhase::Idle => line.push_str("[monitor] "),
        SessionPhase::AwaitingBaseline => line.push_str("[baseline] "),
        SessionPhase::Accumulating => {
            let elapsed = engine
                .session()
                .start_time()
                .map(|t| (now - t).num_milliseconds().max(0))
                .unwrap_or(0);
            line.push_str(&format!("[{:.1}s] ", elapsed as f64 / 1000.0));
        }
    }
    let cells: Vec<String> = feed
        .labels()
        .iter()
        .zip(&latest)
        .map(|(label, v)| format!("{label}: {v:>6.1}"))
        .collect();
    line.push_str(&cells.join(" | "));
    let mut err = std::io::stderr().lock();
    let _ = write!(err, "\r{line}\x1b[K");
    let _ = err.flush();
}
