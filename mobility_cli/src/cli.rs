//! CLI argument definitions.

use clap::{ArgAction, Parser, Subcommand};
use mobility_core::TestIdentifier;
use std::path::PathBuf;
use std::sync::OnceLock;

/// Whether the user asked for JSON output (controls structured error output).
pub static JSON_MODE: OnceLock<bool> = OnceLock::new();

#[derive(Parser, Debug)]
#[command(
    name = "mobility",
    version,
    about = "Joint mobility test monitor",
    after_help = "Exit codes: 0 ok, 1 error, 2 usage, 3 interrupted, 4 stream ended early, 5 result not saved, 6 corrupt results file"
)]
pub struct Cli {
    /// Path to config TOML; a missing file means built-in defaults
    #[arg(long, value_name = "FILE", default_value = "etc/mobility.toml")]
    pub config: PathBuf,

    /// Results file (overrides store.path from the config)
    #[arg(long, value_name = "FILE")]
    pub store: Option<PathBuf>,

    /// Print results and errors as JSON lines instead of text
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,

    /// Console log level (error|warn|info|debug|trace); RUST_LOG wins when set
    #[arg(long = "log-level", value_name = "LEVEL", default_value = "info")]
    pub log_level: String,

    /// Command to execute
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Stream device samples with a live view, optionally running one timed test
    Run {
        /// Joint to test, e.g. "left-ankle" or "Left Ankle"
        #[arg(long, value_name = "JOINT")]
        test: Option<TestIdentifier>,
        /// Replay a recorded capture instead of the simulated device
        #[arg(long, value_name = "FILE", conflicts_with = "port")]
        replay: Option<PathBuf>,
        /// Serial port of the sensor box (requires the `serial` feature)
        #[arg(long, value_name = "PORT")]
        port: Option<String>,
        /// Stop after this many device lines
        #[arg(long, value_name = "N")]
        max_lines: Option<u64>,
    },
    /// List stored results, oldest first
    History {
        #[arg(long, value_name = "JOINT")]
        joint: Option<TestIdentifier>,
    },
    /// Show the best stored result for a joint
    Best {
        #[arg(long, value_name = "JOINT")]
        joint: TestIdentifier,
    },
    /// List the supported joints and their instructions
    Joints,
    /// Write stored results to one CSV per joint
    Export {
        /// Output directory
        #[arg(long, value_name = "DIR")]
        dir: PathBuf,
        #[arg(long, value_name = "JOINT")]
        joint: Option<TestIdentifier>,
    },
    /// List serial ports
    Ports,
    /// Quick health check (config, results file, device stream)
    SelfCheck,
}

#[inline]
pub fn json_mode() -> bool {
    JSON_MODE.get().copied().unwrap_or(false)
}
