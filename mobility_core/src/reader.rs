//! Background device reader.
//!
//! Spawns one thread that owns the `ByteSource`, splits its bytes into lines
//! and hands them to the consumer through a bounded channel. Only text lines
//! cross the thread boundary; decoding, the session and the store stay on the
//! consuming thread.
//!
//! Each `LineReader` spawns exactly one thread, shut down and joined when the
//! reader is dropped.
use crate::lines::LineSplitter;
use crossbeam_channel as xch;
use mobility_traits::ByteSource;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

/// Lines buffered between the reader thread and the consumer.
pub const LINE_QUEUE_CAPACITY: usize = 1024;

const READ_BUF_LEN: usize = 512;

/// What the consumer got from `recv_timeout`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReaderEvent {
    Line(String),
    /// Nothing arrived within the wait.
    Idle,
    /// The source ended or failed; no more lines will come.
    Closed,
}

pub struct LineReader {
    rx: xch::Receiver<String>,
    lines_read: Arc<AtomicU64>,
    /// Shutdown flag for immediate response (atomic for lock-free check)
    shutdown: Arc<AtomicBool>,
    /// Join handle for graceful thread cleanup
    join_handle: Option<std::thread::JoinHandle<()>>,
}

impl LineReader {
    pub fn spawn<S: ByteSource + Send + 'static>(source: S, read_timeout: Duration) -> Self {
        Self::spawn_with_splitter(source, read_timeout, LineSplitter::default())
    }

    pub fn spawn_with_splitter<S: ByteSource + Send + 'static>(
        mut source: S,
        read_timeout: Duration,
        mut splitter: LineSplitter,
    ) -> Self {
        let (tx, rx) = xch::bounded(LINE_QUEUE_CAPACITY);
        let shutdown = Arc::new(AtomicBool::new(false));
        let shutdown_clone = shutdown.clone();
        let lines_read = Arc::new(AtomicU64::new(0));
        let lines_read_clone = lines_read.clone();

        let join_handle = std::thread::spawn(move || {
            let mut buf = [0u8; READ_BUF_LEN];
            'read: loop {
                if shutdown_clone.load(Ordering::Relaxed) {
                    tracing::debug!("reader thread received shutdown signal");
                    break;
                }

                let n = match source.read(&mut buf, read_timeout) {
                    Ok(n) => n,
                    Err(e) => {
                        if is_eof(e.as_ref()) {
                            tracing::debug!("device stream ended");
                        } else {
                            tracing::warn!(error = %e, "device read failed; stopping reader");
                        }
                        break;
                    }
                };
                if n == 0 {
                    continue;
                }

                for line in splitter.push(&buf[..n]) {
                    if shutdown_clone.load(Ordering::Relaxed) {
                        break 'read;
                    }
                    // Blocking send keeps every line; the consumer drains fast.
                    // If it is gone, there is nobody left to read for.
                    if tx.send(line).is_err() {
                        tracing::debug!("reader consumer disconnected, exiting thread");
                        break 'read;
                    }
                    lines_read_clone.fetch_add(1, Ordering::Relaxed);
                }
            }
            tracing::trace!("reader thread exiting cleanly");
        });

        Self {
            rx,
            lines_read,
            shutdown,
            join_handle: Some(join_handle),
        }
    }

    /// Wait up to `timeout` for the next line.
    pub fn recv_timeout(&self, timeout: Duration) -> ReaderEvent {
        match self.rx.recv_timeout(timeout) {
            Ok(line) => ReaderEvent::Line(line),
            Err(xch::RecvTimeoutError::Timeout) => ReaderEvent::Idle,
            Err(xch::RecvTimeoutError::Disconnected) => ReaderEvent::Closed,
        }
    }

    /// Drain every line already queued, without waiting.
    pub fn drain(&self) -> Vec<String> {
        self.rx.try_iter().collect()
    }

    /// Total lines handed to the channel so far.
    pub fn lines_read(&self) -> u64 {
        self.lines_read.load(Ordering::Relaxed)
    }
}

fn is_eof(e: &(dyn std::error::Error + Send + Sync + 'static)) -> bool {
    e.downcast_ref::<std::io::Error>()
        .is_some_and(|io| io.kind() == std::io::ErrorKind::UnexpectedEof)
}

impl Drop for LineReader {
    fn drop(&mut self) {
        self.shutdown.store(true, Ordering::Relaxed);

        // The thread notices the flag after its current read returns (bounded
        // by the read timeout). Free queue space so a send blocked on a full
        // queue can complete.
        let _ = self.rx.try_iter().count();
        if let Some(handle) = self.join_handle.take() {
            match handle.join() {
                Ok(()) => {
                    tracing::trace!("reader thread joined successfully");
                }
                Err(e) => {
                    // Thread panicked; log but don't propagate (we're in Drop)
                    tracing::warn!(?e, "reader thread panicked during shutdown");
                }
            }
        }
    }
}
