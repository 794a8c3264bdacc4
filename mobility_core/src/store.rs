//! Append-only history of completed tests.
//!
//! The store owns the full result sequence in memory and writes the whole
//! sequence through to disk on every append; there is no buffering. On disk it
//! is a JSON array with one record per line:
//!
//! ```text
//! [
//!   {"test_identifier":"Left Ankle","timestamp":"2024-06-01T10:00:00Z","score":7.0,"max_difference":[3.0,4.0]},
//!   ...
//! ]
//! ```
//!
//! Older files stored each record as a bare 4-element array
//! `[test_identifier, timestamp, score, max_difference]`; those still load.

use crate::atomic::write_atomic;
use crate::error::StoreError;
use crate::joint::TestIdentifier;
use crate::types::TestResult;
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub struct ResultStore {
    path: Option<PathBuf>,
    results: Vec<TestResult>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StoredRecord {
    Record(TestResult),
    Legacy((String, String, f64, Vec<f64>)),
}

impl ResultStore {
    /// Open the store at `path`, loading its full history. A missing file is
    /// an empty history.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let results = load(&path)?;
        tracing::debug!(path = %path.display(), count = results.len(), "result store loaded");
        Ok(Self {
            path: Some(path),
            results,
        })
    }

    /// A store that never touches the filesystem.
    pub fn in_memory() -> Self {
        Self {
            path: None,
            results: Vec::new(),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Full history in insertion order.
    pub fn results(&self) -> &[TestResult] {
        &self.results
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Add a result and persist the whole history before returning.
    ///
    /// On a write failure the result stays in memory (it is still part of this
    /// run's history) and the error is returned so the caller can warn that it
    /// will be lost on restart.
    ///
    /// A result with a non-finite score or deviation is rejected up front and
    /// not added, so the file on disk always stays loadable.
    pub fn append(&mut self, result: TestResult) -> Result<(), StoreError> {
        check_finite(&result)?;
        self.results.push(result);
        self.persist()
    }

    pub fn results_for(&self, id: TestIdentifier) -> Vec<&TestResult> {
        self.results
            .iter()
            .filter(|r| r.test_identifier == id)
            .collect()
    }

    /// Highest-scoring result for `id`; the earliest one wins a tie.
    pub fn best_result_for(&self, id: TestIdentifier) -> Option<&TestResult> {
        let mut best: Option<&TestResult> = None;
        for r in self.results.iter().filter(|r| r.test_identifier == id) {
            match best {
                Some(b) if r.score > b.score => best = Some(r),
                None => best = Some(r),
                _ => {}
            }
        }
        best
    }

    fn persist(&self) -> Result<(), StoreError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let bytes = encode(&self.results)?;
        write_atomic(path, &bytes).map_err(|source| {
            tracing::error!(path = %path.display(), error = %source, "failed to persist results");
            StoreError::Io {
                path: path.display().to_string(),
                source,
            }
        })?;
        tracing::debug!(path = %path.display(), count = self.results.len(), "results persisted");
        Ok(())
    }
}

/// Read the full history from `path`; absent file means no history.
pub fn load(path: &Path) -> Result<Vec<TestResult>, StoreError> {
    let text = match std::fs::read_to_string(path) {
        Ok(t) => t,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(source) => {
            return Err(StoreError::Io {
                path: path.display().to_string(),
                source,
            });
        }
    };
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }
    let records: Vec<StoredRecord> =
        serde_json::from_str(&text).map_err(|source| StoreError::Corrupt {
            path: path.display().to_string(),
            source,
        })?;

    records
        .into_iter()
        .map(|rec| match rec {
            StoredRecord::Record(r) => Ok(r),
            StoredRecord::Legacy((name, timestamp, score, max_difference)) => {
                let test_identifier =
                    name.parse::<TestIdentifier>()
                        .map_err(|_| StoreError::UnknownTest {
                            path: path.display().to_string(),
                            name: name.clone(),
                        })?;
                Ok(TestResult {
                    test_identifier,
                    timestamp,
                    score,
                    max_difference,
                })
            }
        })
        .collect()
}

fn check_finite(result: &TestResult) -> Result<(), StoreError> {
    let field = if !result.score.is_finite() {
        "score"
    } else if !result.max_difference.iter().all(|v| v.is_finite()) {
        "max_difference"
    } else {
        return Ok(());
    };
    Err(StoreError::NonFinite {
        test: result.test_identifier.to_string(),
        field,
    })
}

fn encode(results: &[TestResult]) -> Result<Vec<u8>, StoreError> {
    for r in results {
        check_finite(r)?;
    }
    if results.is_empty() {
        return Ok(b"[]\n".to_vec());
    }
    let lines = results
        .iter()
        .map(serde_json::to_string)
        .collect::<Result<Vec<_>, _>>()?;
    let mut out = String::from("[\n  ");
    out.push_str(&lines.join(",\n  "));
    out.push_str("\n]\n");
    Ok(out.into_bytes())
}
