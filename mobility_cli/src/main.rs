mod cli;
mod error_fmt;
mod history;
mod logging;
mod monitor;

use clap::Parser;
use cli::{Cli, Commands, JSON_MODE};
use eyre::{Result, WrapErr};
use mobility_config::Config;
use mobility_core::{LineReader, ReaderEvent, ResultStore, SampleDecoder, TestResult};
use monitor::{RunParams, SourceKind};
use serde_json::json;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

fn main() {
    let cli = Cli::parse();
    let _ = JSON_MODE.set(cli.json);
    let _ = color_eyre::install();

    let code = match real_main(cli) {
        Ok(()) => 0,
        Err(e) => {
            if cli::json_mode() {
                eprintln!("{}", error_fmt::format_error_json(&e));
            } else {
                eprintln!("{}", error_fmt::humanize(&e));
            }
            error_fmt::exit_code_for_error(&e)
        }
    };
    std::process::exit(code);
}

fn real_main(cli: Cli) -> Result<()> {
    let cfg = mobility_config::load_file(&cli.config)?;
    // Keep the file sink flushing until we return.
    let _log_guard = logging::init_tracing(&cli.log_level, cli.json, &cfg.logging)?;
    cfg.validate()?;
    tracing::debug!(config = %cli.config.display(), "configuration loaded");

    let store_path = cli.store.clone().unwrap_or_else(|| cfg.store.path.clone());

    match cli.cmd {
        Commands::Run {
            test,
            replay,
            port,
            max_lines,
        } => {
            let source = match (replay, port.or_else(|| cfg.device.port.clone())) {
                (Some(path), _) => SourceKind::Replay(path),
                (None, Some(port)) => SourceKind::Serial(port),
                (None, None) => SourceKind::Simulated,
            };
            let store = open_store(&store_path)?;

            let shutdown = Arc::new(AtomicBool::new(false));
            let flag = shutdown.clone();
            ctrlc::set_handler(move || flag.store(true, Ordering::Relaxed))
                .wrap_err("install Ctrl-C handler")?;

            let summary = monitor::run_monitor(
                &cfg,
                store,
                RunParams {
                    test,
                    source,
                    max_lines,
                },
                shutdown,
            )?;

            match &summary.result {
                Some(result) => print_result(result, summary.best.as_ref()),
                None if cli.json => println!(
                    "{}",
                    json!({ "lines": summary.lines, "dropped": summary.dropped })
                ),
                None => println!(
                    "Stream stopped after {} lines ({} dropped).",
                    summary.lines, summary.dropped
                ),
            }
            Ok(())
        }
        Commands::History { joint } => {
            let store = open_store(&store_path)?;
            history::print_history(&store, joint, cli.json);
            Ok(())
        }
        Commands::Best { joint } => {
            let store = open_store(&store_path)?;
            history::print_best(&store, joint, cli.json);
            Ok(())
        }
        Commands::Joints => {
            history::print_joints(cli.json);
            Ok(())
        }
        Commands::Export { dir, joint } => {
            let store = open_store(&store_path)?;
            let written = history::export_csv(&store, &dir, joint)?;
            for path in &written {
                if cli.json {
                    println!("{}", json!({ "exported": path.display().to_string() }));
                } else {
                    println!("Wrote {}", path.display());
                }
            }
            if written.is_empty() && !cli.json {
                println!("No results to export.");
            }
            Ok(())
        }
        Commands::Ports => list_ports(cli.json),
        Commands::SelfCheck => self_check(&cfg, &store_path),
    }
}

fn open_store(path: &Path) -> Result<ResultStore> {
    ResultStore::open(path).wrap_err_with(|| format!("open result store {}", path.display()))
}

/// Print a completed test, with the best score for that joint when known.
pub(crate) fn print_result(result: &TestResult, best: Option<&TestResult>) {
    if cli::json_mode() {
        println!(
            "{}",
            json!({
                "test_identifier": result.test_identifier,
                "timestamp": result.timestamp,
                "score": result.score,
                "max_difference": result.max_difference,
                "best_score": best.map(|b| b.score),
            })
        );
        return;
    }
    println!("{} test complete", result.test_identifier);
    println!("  score:          {:.1}", result.score);
    println!(
        "  max difference: {}",
        history::format_values(&result.max_difference)
    );
    if let Some(b) = best {
        println!("  best score:     {:.1} ({})", b.score, b.timestamp);
    }
}

#[cfg(feature = "serial")]
fn list_ports(json: bool) -> Result<()> {
    let ports = mobility_hardware::list_ports()?;
    if json {
        println!("{}", json!({ "ports": ports }));
    } else if ports.is_empty() {
        println!("No serial ports found.");
    } else {
        for p in ports {
            println!("{p}");
        }
    }
    Ok(())
}

#[cfg(not(feature = "serial"))]
fn list_ports(_json: bool) -> Result<()> {
    eyre::bail!("cannot list ports: this build has no serial support (enable the `serial` feature)")
}

/// Config is already validated by the time we get here; check the results
/// file loads and that the simulated device decodes cleanly.
fn self_check(cfg: &Config, store_path: &Path) -> Result<()> {
    let store = open_store(store_path)?;
    tracing::info!(results = store.len(), "results file ok");

    let reader = LineReader::spawn(
        monitor::open_source(cfg, &SourceKind::Simulated)?,
        Duration::from_millis(cfg.device.read_timeout_ms),
    );
    let decoder = SampleDecoder::new(cfg.device.channels);
    let deadline = Instant::now() + Duration::from_secs(2);
    let mut decoded = 0;
    while decoded < 5 {
        if Instant::now() >= deadline {
            eyre::bail!("simulated device produced {decoded} lines in 2s");
        }
        match reader.recv_timeout(Duration::from_millis(100)) {
            ReaderEvent::Line(line) => {
                decoder.decode(&line)?;
                decoded += 1;
            }
            ReaderEvent::Idle => {}
            ReaderEvent::Closed => eyre::bail!("simulated device stream closed"),
        }
    }
    println!("OK");
    Ok(())
}
