//! Read-only commands over the result store: history, best, joints, export.

use std::path::{Path, PathBuf};

use eyre::{Result, WrapErr};
use mobility_core::{ResultStore, TestIdentifier, TestResult};
use serde_json::json;

pub fn print_history(store: &ResultStore, joint: Option<TestIdentifier>, json: bool) {
    let rows: Vec<&TestResult> = match joint {
        Some(id) => store.results_for(id),
        None => store.results().iter().collect(),
    };
    if json {
        for r in rows {
            println!("{}", json!(r));
        }
        return;
    }
    if rows.is_empty() {
        println!("No results recorded yet.");
        return;
    }
    println!("{:<22} {:<12} {:>7}  max difference", "timestamp", "joint", "score");
    for r in rows {
        println!(
            "{:<22} {:<12} {:>7.1}  {}",
            r.timestamp,
            r.test_identifier.label(),
            r.score,
            format_values(&r.max_difference)
        );
    }
}

pub fn print_best(store: &ResultStore, joint: TestIdentifier, json: bool) {
    let best = store.best_result_for(joint);
    if json {
        println!("{}", json!({ "test_identifier": joint, "best": best }));
        return;
    }
    match best {
        Some(r) => println!(
            "Best {} score: {:.1} (recorded {})",
            joint.label(),
            r.score,
            r.timestamp
        ),
        None => println!("No results recorded for {}.", joint.label()),
    }
}

pub fn print_joints(json: bool) {
    for id in TestIdentifier::ALL {
        if json {
            println!(
                "{}",
                json!({ "name": id.label(), "slug": id.slug(), "description": id.description() })
            );
        } else {
            println!("{:<12} ({})\n    {}", id.label(), id.slug(), id.description());
        }
    }
}

/// Export file name for one joint.
pub fn export_file_name(joint: TestIdentifier) -> String {
    format!("previous_results_{}.csv", joint.slug())
}

/// Write `previous_results_<slug>.csv` files into `dir`.
///
/// With `joint` set, exactly that joint's file is written (possibly header
/// only). Otherwise one file per joint that has results.
pub fn export_csv(
    store: &ResultStore,
    dir: &Path,
    joint: Option<TestIdentifier>,
) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)
        .wrap_err_with(|| format!("create export directory {}", dir.display()))?;

    let joints: Vec<TestIdentifier> = match joint {
        Some(id) => vec![id],
        None => TestIdentifier::ALL
            .into_iter()
            .filter(|id| !store.results_for(*id).is_empty())
            .collect(),
    };

    let mut written = Vec::with_capacity(joints.len());
    for id in joints {
        let path = dir.join(export_file_name(id));
        write_joint_csv(&path, &store.results_for(id))
            .wrap_err_with(|| format!("write {}", path.display()))?;
        tracing::info!(path = %path.display(), joint = %id, "exported results");
        written.push(path);
    }
    Ok(written)
}

fn write_joint_csv(path: &Path, rows: &[&TestResult]) -> Result<()> {
    let channels = rows.iter().map(|r| r.max_difference.len()).max().unwrap_or(0);
    let mut w = csv::Writer::from_path(path)?;

    let mut header = vec!["timestamp".to_string(), "score".to_string()];
    header.extend((1..=channels).map(|i| format!("ch{i}")));
    w.write_record(&header)?;

    for r in rows {
        let mut rec = Vec::with_capacity(2 + channels);
        rec.push(r.timestamp.clone());
        rec.push(format!("{:.1}", r.score));
        for i in 0..channels {
            rec.push(
                r.max_difference
                    .get(i)
                    .map(|v| format!("{v:.1}"))
                    .unwrap_or_default(),
            );
        }
        w.write_record(&rec)?;
    }
    w.flush()?;
    Ok(())
}

pub fn format_values(values: &[f64]) -> String {
    let cells: Vec<String> = values.iter().map(|v| format!("{v:.1}")).collect();
    format!("[{}]", cells.join(", "))
}
