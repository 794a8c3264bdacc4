//! Replay a recorded device capture as a byte source.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::time::Duration;

use mobility_traits::{ByteSource, Clock, SystemClock};

use crate::error::Result;
use crate::util::{Pacer, drain_into, period_from_hz};

/// Feeds the lines of a capture file back one at a time.
///
/// Unpaced by default: every read returns the next line immediately. With
/// `paced` the lines come out at a fixed rate, which keeps timed tests
/// meaningful when replaying against the real clock.
pub struct ReplaySource<R, C: Clock = SystemClock> {
    reader: R,
    pacing: Option<(Pacer, C)>,
    pending: Vec<u8>,
    lines: u64,
}

impl ReplaySource<BufReader<File>> {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        tracing::debug!(path = %path.as_ref().display(), "opened replay file");
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: BufRead> ReplaySource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            pacing: None,
            pending: Vec::new(),
            lines: 0,
        }
    }
}

impl<R: BufRead, C: Clock> ReplaySource<R, C> {
    /// Emit one line per `1 / rate_hz` seconds of `clock` time.
    pub fn paced<C2: Clock>(self, rate_hz: f64, clock: C2) -> Result<ReplaySource<R, C2>> {
        let period = period_from_hz(rate_hz)?;
        Ok(ReplaySource {
            reader: self.reader,
            pacing: Some((Pacer::new(period), clock)),
            pending: self.pending,
            lines: self.lines,
        })
    }

    /// Lines handed out so far.
    pub fn lines(&self) -> u64 {
        self.lines
    }
}

impl<R: BufRead, C: Clock> ByteSource for ReplaySource<R, C> {
    fn read(
        &mut self,
        buf: &mut [u8],
        timeout: Duration,
    ) -> std::result::Result<usize, Box<dyn std::error::Error + Send + Sync>> {
        if self.pending.is_empty() {
            if let Some((pacer, clock)) = &mut self.pacing
                && !pacer.wait_tick(&*clock, timeout)
            {
                return Ok(0);
            }
            let n = self.reader.read_until(b'\n', &mut self.pending)?;
            if n == 0 {
                tracing::debug!(lines = self.lines, "replay finished");
                return Err(Box::new(std::io::Error::new(
                    std::io::ErrorKind::UnexpectedEof,
                    "end of replay",
                )));
            }
            if !self.pending.ends_with(b"\n") {
                self.pending.push(b'\n');
            }
            self.lines += 1;
        }
        Ok(drain_into(&mut self.pending, buf))
    }
}
