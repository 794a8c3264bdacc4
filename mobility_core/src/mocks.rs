//! Test and helper byte sources for mobility_core

use mobility_traits::ByteSource;
use std::collections::VecDeque;
use std::time::Duration;

/// A source that never produces data; reads just wait out the timeout.
pub struct NoopSource;

impl ByteSource for NoopSource {
    fn read(
        &mut self,
        _buf: &mut [u8],
        timeout: Duration,
    ) -> Result<usize, Box<dyn std::error::Error + Send + Sync>> {
        std::thread::sleep(timeout);
        Ok(0)
    }
}

/// Replays a fixed list of chunks, then reports end of stream.
pub struct ScriptedSource {
    chunks: VecDeque<Vec<u8>>,
}

impl ScriptedSource {
    pub fn new<I, B>(chunks: I) -> Self
    where
        I: IntoIterator<Item = B>,
        B: Into<Vec<u8>>,
    {
        Self {
            chunks: chunks.into_iter().map(Into::into).collect(),
        }
    }
}

impl ByteSource for ScriptedSource {
    fn read(
        &mut self,
        buf: &mut [u8],
        _timeout: Duration,
    ) -> Result<usize, Box<dyn std::error::Error + Send + Sync>> {
        let Some(mut chunk) = self.chunks.pop_front() else {
            return Err(Box::new(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                "script finished",
            )));
        };
        let n = chunk.len().min(buf.len());
        buf[..n].copy_from_slice(&chunk[..n]);
        if n < chunk.len() {
            self.chunks.push_front(chunk.split_off(n));
        }
        Ok(n)
    }
}
