#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schema for the joint mobility tester.
//!
//! - `Config` and sub-structs are deserialized from TOML and validated.
//! - Every section is optional; an empty document yields the defaults used
//!   by the bench prototype (6 channels, 10 s tests, 115200 baud).
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Largest channel vector a device line may carry.
pub const MAX_CHANNELS: usize = 16;

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Device {
    /// Serial port path; only used when built with the `serial` feature.
    pub port: Option<String>,
    pub baud_rate: u32,
    /// Number of comma-separated readings per device line.
    pub channels: usize,
    /// How long a single transport read may block (ms).
    pub read_timeout_ms: u64,
}

impl Default for Device {
    fn default() -> Self {
        Self {
            port: None,
            baud_rate: 115_200,
            channels: 6,
            read_timeout_ms: 10,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SessionCfg {
    /// Length of one mobility test, measured from `start` (ms).
    pub duration_ms: u64,
}

impl Default for SessionCfg {
    fn default() -> Self {
        Self {
            duration_ms: 10_000,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct StoreCfg {
    /// JSON file holding every completed test result.
    pub path: PathBuf,
}

impl Default for StoreCfg {
    fn default() -> Self {
        Self {
            path: PathBuf::from("data/test_results.json"),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct PlotCfg {
    /// Moving window length per channel.
    pub max_points: usize,
    /// Minimum interval between live view refreshes (ms).
    pub refresh_ms: u64,
    /// Optional legend labels; must match `device.channels` when present.
    pub labels: Option<Vec<String>>,
}

impl Default for PlotCfg {
    fn default() -> Self {
        Self {
            max_points: 200,
            refresh_ms: 100,
            labels: None,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SimulatorCfg {
    /// Lines per second emitted by the simulated IMU.
    pub rate_hz: u32,
    /// Peak angular deviation of the simulated motion (degrees).
    pub amplitude: f64,
}

impl Default for SimulatorCfg {
    fn default() -> Self {
        Self {
            rate_hz: 100,
            amplitude: 30.0,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    pub rotation: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub device: Device,
    pub session: SessionCfg,
    pub store: StoreCfg,
    pub plot: PlotCfg,
    pub simulator: SimulatorCfg,
    pub logging: Logging,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

/// Read and parse a config file. A missing file yields the defaults.
pub fn load_file(path: &Path) -> eyre::Result<Config> {
    let text = match std::fs::read_to_string(path) {
        Ok(t) => t,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Config::default()),
        Err(e) => eyre::bail!("read config {}: {}", path.display(), e),
    };
    load_toml(&text).map_err(|e| eyre::eyre!("invalid configuration in {}: {}", path.display(), e))
}

impl Config {
    pub fn validate(&self) -> eyre::Result<()> {
        // Device
        if self.device.channels == 0 || self.device.channels > MAX_CHANNELS {
            eyre::bail!("device.channels must be in [1, {MAX_CHANNELS}]");
        }
        if self.device.baud_rate == 0 {
            eyre::bail!("device.baud_rate must be > 0");
        }
        if self.device.read_timeout_ms == 0 {
            eyre::bail!("device.read_timeout_ms must be >= 1");
        }
        if let Some(port) = &self.device.port
            && port.trim().is_empty()
        {
            eyre::bail!("device.port must not be empty when set");
        }

        // Session
        if self.session.duration_ms == 0 {
            eyre::bail!("session.duration_ms must be >= 1");
        }
        if self.session.duration_ms > 60 * 60 * 1000 {
            eyre::bail!("session.duration_ms is unreasonably large (>1h)");
        }

        // Store
        if self.store.path.as_os_str().is_empty() {
            eyre::bail!("store.path must not be empty");
        }

        // Plot
        if self.plot.max_points == 0 {
            eyre::bail!("plot.max_points must be >= 1");
        }
        if self.plot.refresh_ms == 0 {
            eyre::bail!("plot.refresh_ms must be >= 1");
        }
        if let Some(labels) = &self.plot.labels
            && labels.len() != self.device.channels
        {
            eyre::bail!(
                "plot.labels has {} entries but device.channels is {}",
                labels.len(),
                self.device.channels
            );
        }

        // Simulator
        if self.simulator.rate_hz == 0 {
            eyre::bail!("simulator.rate_hz must be > 0");
        }
        if !self.simulator.amplitude.is_finite() || self.simulator.amplitude < 0.0 {
            eyre::bail!("simulator.amplitude must be a finite value >= 0");
        }

        // Logging
        if let Some(rot) = self.logging.rotation.as_deref()
            && !matches!(rot, "never" | "daily" | "hourly")
        {
            eyre::bail!("logging.rotation must be one of never|daily|hourly, got {rot}");
        }

        Ok(())
    }
}
