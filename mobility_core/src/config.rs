//! Runtime configuration for the engine.
//!
//! These are separate from the TOML-deserialized config in `mobility_config`;
//! see `conversions` for the mapping.

use std::path::PathBuf;
use std::time::Duration;

/// Session timing and channel layout.
#[derive(Debug, Clone)]
pub struct SessionCfg {
    /// Readings per device line; decoder and session both use this.
    pub channels: usize,
    /// Test window measured from `start`.
    pub duration: Duration,
}

impl Default for SessionCfg {
    fn default() -> Self {
        Self {
            channels: 6,
            duration: Duration::from_secs(10),
        }
    }
}

/// Live view buffering.
#[derive(Debug, Clone)]
pub struct PlotCfg {
    /// Moving window length per channel.
    pub max_points: usize,
    /// Legend labels; defaults to "Sensor N" when absent.
    pub labels: Option<Vec<String>>,
}

impl Default for PlotCfg {
    fn default() -> Self {
        Self {
            max_points: 200,
            labels: None,
        }
    }
}

/// Where results are persisted.
#[derive(Debug, Clone)]
pub struct StoreCfg {
    pub path: PathBuf,
}

impl Default for StoreCfg {
    fn default() -> Self {
        Self {
            path: PathBuf::from("data/test_results.json"),
        }
    }
}
