//! The single-task pipeline: raw line → decoder → plot feed → session → store.
//!
//! `MobilityEngine` is meant to be driven from one thread (the consumer of
//! `LineReader`). Nothing inside blocks except the synchronous store write on
//! test completion.

use chrono::{DateTime, Utc};
use mobility_traits::PlotFeed;

use crate::config::SessionCfg;
use crate::decoder::SampleDecoder;
use crate::error::{BuildError, EngineError, Result, SessionError};
use crate::joint::TestIdentifier;
use crate::plot::NullFeed;
use crate::session::TestSession;
use crate::status::{LineOutcome, SessionPhase, SessionStatus};
use crate::store::ResultStore;
use crate::types::TestResult;

pub struct MobilityEngine<F: PlotFeed = NullFeed> {
    decoder: SampleDecoder,
    session: TestSession,
    store: ResultStore,
    feed: F,
    dropped_lines: u64,
}

impl<F: PlotFeed> core::fmt::Debug for MobilityEngine<F> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("MobilityEngine")
            .field("channels", &self.decoder.expected_channels())
            .field("phase", &self.session.phase())
            .field("results", &self.store.len())
            .field("dropped_lines", &self.dropped_lines)
            .finish()
    }
}

impl MobilityEngine<NullFeed> {
    /// Start building an engine.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }
}

impl<F: PlotFeed> MobilityEngine<F> {
    /// Feed one raw device line received at `now`.
    ///
    /// Malformed lines are dropped and change nothing. Valid samples go to the
    /// plot feed first, then to the session. When the session completes, the
    /// result is appended to the store before this returns.
    pub fn handle_line(
        &mut self,
        line: &str,
        now: DateTime<Utc>,
    ) -> std::result::Result<LineOutcome, EngineError> {
        let sample = match self.decoder.decode(line) {
            Ok(s) => s,
            Err(e) => {
                self.dropped_lines += 1;
                tracing::trace!(error = %e, line, "dropping device line");
                return Ok(LineOutcome::Dropped);
            }
        };
        self.feed.push(sample.values());

        let status = self.session.process_sample(&sample, now);
        if let SessionStatus::Completed(result) = &status
            && let Err(source) = self.store.append(result.clone())
        {
            return Err(EngineError::Persist {
                result: Box::new(result.clone()),
                source,
            });
        }
        Ok(LineOutcome::Accepted(status))
    }

    pub fn start(
        &mut self,
        test: TestIdentifier,
        now: DateTime<Utc>,
    ) -> std::result::Result<(), SessionError> {
        self.session.start(test, now)
    }

    /// Abort the running test, if any. Returns whether one was running.
    pub fn abort(&mut self) -> bool {
        self.session.abort()
    }

    pub fn phase(&self) -> SessionPhase {
        self.session.phase()
    }

    pub fn session(&self) -> &TestSession {
        &self.session
    }

    pub fn store(&self) -> &ResultStore {
        &self.store
    }

    pub fn feed(&self) -> &F {
        &self.feed
    }

    pub fn results_for(&self, test: TestIdentifier) -> Vec<&TestResult> {
        self.store.results_for(test)
    }

    pub fn best_result_for(&self, test: TestIdentifier) -> Option<&TestResult> {
        self.store.best_result_for(test)
    }

    /// Lines rejected by the decoder since construction.
    pub fn dropped_lines(&self) -> u64 {
        self.dropped_lines
    }

    /// Tear down, handing back the store.
    pub fn into_store(self) -> ResultStore {
        self.store
    }
}

/// Builder for `MobilityEngine`. All fields are validated on `build()`.
#[derive(Debug, Default)]
pub struct EngineBuilder {
    session: Option<SessionCfg>,
    decoder_channels: Option<usize>,
    store: Option<ResultStore>,
}

impl EngineBuilder {
    pub fn with_session(mut self, cfg: SessionCfg) -> Self {
        self.session = Some(cfg);
        self
    }

    /// Override the decoder's channel count. Normally it follows the session
    /// config; a differing value makes `build` fail.
    pub fn with_decoder_channels(mut self, channels: usize) -> Self {
        self.decoder_channels = Some(channels);
        self
    }

    pub fn with_store(mut self, store: ResultStore) -> Self {
        self.store = Some(store);
        self
    }

    pub fn build(self) -> Result<MobilityEngine<NullFeed>> {
        self.build_with_feed(NullFeed)
    }

    pub fn build_with_feed<F: PlotFeed>(self, feed: F) -> Result<MobilityEngine<F>> {
        let session = self.session.unwrap_or_default();
        if session.channels == 0 {
            return Err(eyre::Report::new(BuildError::InvalidConfig(
                "channels must be >= 1",
            )));
        }
        if session.duration.is_zero() {
            return Err(eyre::Report::new(BuildError::InvalidConfig(
                "duration must be > 0",
            )));
        }
        let decoder_channels = self.decoder_channels.unwrap_or(session.channels);
        if decoder_channels != session.channels {
            return Err(eyre::Report::new(SessionError::ChannelCountMismatch {
                decoder: decoder_channels,
                session: session.channels,
            }));
        }
        let store = self
            .store
            .ok_or_else(|| eyre::Report::new(BuildError::MissingStore))?;

        tracing::debug!(
            channels = session.channels,
            duration_ms = session.duration.as_millis() as u64,
            history = store.len(),
            "engine built"
        );
        Ok(MobilityEngine {
            decoder: SampleDecoder::new(decoder_channels),
            session: TestSession::new(session.channels, session.duration),
            store,
            feed,
            dropped_lines: 0,
        })
    }
}
