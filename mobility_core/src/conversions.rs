//! `From` implementations bridging `mobility_config` types to `mobility_core` types.

use crate::config::{PlotCfg, SessionCfg, StoreCfg};
use std::time::Duration;

// ── SessionCfg ───────────────────────────────────────────────────────────────

impl From<&mobility_config::Config> for SessionCfg {
    fn from(c: &mobility_config::Config) -> Self {
        Self {
            channels: c.device.channels,
            duration: Duration::from_millis(c.session.duration_ms),
        }
    }
}

// ── PlotCfg ──────────────────────────────────────────────────────────────────

impl From<&mobility_config::PlotCfg> for PlotCfg {
    fn from(c: &mobility_config::PlotCfg) -> Self {
        Self {
            max_points: c.max_points,
            labels: c.labels.clone(),
        }
    }
}

// ── StoreCfg ─────────────────────────────────────────────────────────────────

impl From<&mobility_config::StoreCfg> for StoreCfg {
    fn from(c: &mobility_config::StoreCfg) -> Self {
        Self {
            path: c.path.clone(),
        }
    }
}
