use crate::types::TestResult;
use thiserror::Error;

/// A device line that is not exactly `expected` comma-separated decimal numbers.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("malformed line: {reason}")]
    MalformedLine { reason: String },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("a test session is already active")]
    AlreadyActive,
    #[error("channel count mismatch: decoder expects {decoder}, session expects {session}")]
    ChannelCountMismatch { decoder: usize, session: usize },
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error on result store {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("result store {path} is corrupt: {source}")]
    Corrupt {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("result store {path} has unknown test identifier {name:?}")]
    UnknownTest { path: String, name: String },
    /// Refused before writing: JSON has no representation for NaN or infinity.
    #[error("refusing to store non-finite {field} in {test} result")]
    NonFinite { test: String, field: &'static str },
    #[error("encode results: {0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Session(#[from] SessionError),
    /// The test completed but the result could not be written to disk.
    /// The result is still held in memory and returned here for display.
    #[error("test result could not be persisted: {source}")]
    Persist {
        result: Box<TestResult>,
        #[source]
        source: StoreError,
    },
}

#[derive(Debug, Error, Clone)]
pub enum BuildError {
    #[error("missing result store")]
    MissingStore,
    #[error("invalid config: {0}")]
    InvalidConfig(&'static str),
}

pub type Result<T> = eyre::Result<T>;
pub use eyre::Report;
