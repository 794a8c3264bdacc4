//! Human-readable error descriptions and structured JSON error formatting.

use crate::monitor::RunError;
use mobility_core::error::{BuildError, EngineError, SessionError, StoreError};
use mobility_hardware::HwError;
use serde_json::json;

/// Map an eyre::Report to a human-readable explanation with likely causes and fix hints.
pub fn humanize(err: &eyre::Report) -> String {
    // Typed matches first
    if let Some(re) = err.downcast_ref::<RunError>() {
        return match re {
            RunError::Interrupted => "What happened: The test was interrupted before its window elapsed.\nLikely causes: Ctrl-C was pressed during the test.\nHow to fix: Nothing was saved; start the test again and let it run to completion.".to_string(),
            RunError::SourceClosed => "What happened: The device stream ended before the test completed.\nLikely causes: The replay file is shorter than session.duration_ms, or the sensor box was unplugged.\nHow to fix: Use a longer capture, lower session.duration_ms, or check the USB connection.".to_string(),
            RunError::LineLimit(n) => format!(
                "What happened: Stopped after {n} lines with the test still running.\nLikely causes: --max-lines is too small for the configured test window.\nHow to fix: Raise --max-lines or drop it when running a test."
            ),
        };
    }

    if let Some(EngineError::Persist { result, source }) = err.downcast_ref::<EngineError>() {
        return format!(
            "What happened: The {} test finished with score {:.1}, but saving it failed ({source}).\nLikely causes: The results directory is not writable or the disk is full.\nHow to fix: Fix permissions on store.path and rerun; this result may be lost.",
            result.test_identifier, result.score
        );
    }

    if let Some(se) = err.downcast_ref::<StoreError>() {
        return match se {
            StoreError::Corrupt { path, .. } | StoreError::UnknownTest { path, .. } => format!(
                "What happened: The results file {path} could not be read.\nLikely causes: The file was edited by hand or truncated by a crash.\nHow to fix: Repair the JSON or move the file aside; new results are not saved until then."
            ),
            StoreError::Io { path, source } => format!(
                "What happened: Could not access the results file {path} ({source}).\nLikely causes: Missing permissions or a read-only filesystem.\nHow to fix: Point store.path (or --store) at a writable location."
            ),
            StoreError::NonFinite { test, field } => format!(
                "What happened: The {test} result has a non-finite {field} and was not saved.\nLikely causes: Corrupted device output with out-of-range readings.\nHow to fix: Check the sensor wiring and rerun the test; earlier results are untouched."
            ),
            StoreError::Encode(e) => format!(
                "What happened: Results could not be encoded ({e}).\nLikely causes: An internal serialization failure.\nHow to fix: Re-run with --log-level=debug and report the device output."
            ),
        };
    }

    if let Some(be) = err.downcast_ref::<BuildError>() {
        return match be {
            BuildError::MissingStore => {
                "What happened: No result store was provided to the engine.\nLikely causes: Internal wiring error.\nHow to fix: Report this with the command line used.".to_string()
            }
            BuildError::InvalidConfig(msg) => format!(
                "What happened: Invalid configuration ({msg}).\nLikely causes: Missing or out-of-range values in the TOML.\nHow to fix: Edit the config file, then rerun."
            ),
        };
    }

    if let Some(SessionError::ChannelCountMismatch { decoder, session }) =
        err.downcast_ref::<SessionError>()
    {
        return format!(
            "What happened: The decoder expects {decoder} channels but the session expects {session}.\nLikely causes: Inconsistent channel settings.\nHow to fix: Set device.channels to the number of readings per device line."
        );
    }

    if let Some(HwError::Serial(msg)) = err.downcast_ref::<HwError>() {
        return format!(
            "What happened: Serial port failure ({msg}).\nLikely causes: Wrong port name, device unplugged, or missing permissions.\nHow to fix: Run `mobility ports`, check device.port, and make sure your user may open the port."
        );
    }

    // String-based heuristics for errors coming from init or config
    let msg = err.to_string();
    let lower = msg.to_ascii_lowercase();

    if lower.contains("invalid configuration") || lower.contains("must be") {
        return format!(
            "What happened: Configuration is invalid ({msg}).\nLikely causes: A typo or an out-of-range value in the TOML.\nHow to fix: Edit the config file and try again."
        );
    }

    if lower.contains("no serial support") {
        return format!(
            "What happened: {msg}.\nLikely causes: The binary was built without serial support.\nHow to fix: Rebuild with `--features serial`, or use --replay / the simulator."
        );
    }

    // Generic fallback
    let mut cause = String::new();
    if let Some(src) = err.source() {
        cause = format!(" Cause: {src}");
    }
    format!(
        "Something went wrong.{cause}\nHow to fix: Re-run with --log-level=debug for details. Original: {msg}"
    )
}

/// Stable exit codes; anything unrecognized is 1.
pub fn exit_code_for_error(err: &eyre::Report) -> i32 {
    if let Some(re) = err.downcast_ref::<RunError>() {
        return match re {
            RunError::Interrupted => 3,
            RunError::SourceClosed | RunError::LineLimit(_) => 4,
        };
    }
    if let Some(EngineError::Persist { .. }) = err.downcast_ref::<EngineError>() {
        return 5;
    }
    if let Some(StoreError::Corrupt { .. } | StoreError::UnknownTest { .. }) =
        err.downcast_ref::<StoreError>()
    {
        return 6;
    }
    1
}

fn reason_name(err: &eyre::Report) -> &'static str {
    if let Some(re) = err.downcast_ref::<RunError>() {
        return match re {
            RunError::Interrupted => "Interrupted",
            RunError::SourceClosed => "SourceClosed",
            RunError::LineLimit(_) => "LineLimit",
        };
    }
    if let Some(EngineError::Persist { .. }) = err.downcast_ref::<EngineError>() {
        return "PersistFailed";
    }
    if let Some(StoreError::Corrupt { .. } | StoreError::UnknownTest { .. }) =
        err.downcast_ref::<StoreError>()
    {
        return "StoreCorrupt";
    }
    "Error"
}

/// Structured JSON for errors when --json is enabled.
pub fn format_error_json(err: &eyre::Report) -> String {
    let msg = humanize(err);
    let reason = reason_name(err);
    if let Some(EngineError::Persist { result, .. }) = err.downcast_ref::<EngineError>() {
        return json!({ "reason": reason, "result": result, "message": msg }).to_string();
    }
    json!({ "reason": reason, "message": msg }).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_errors_map_to_stable_codes() {
        assert_eq!(exit_code_for_error(&RunError::Interrupted.into()), 3);
        assert_eq!(exit_code_for_error(&RunError::SourceClosed.into()), 4);
        assert_eq!(exit_code_for_error(&RunError::LineLimit(5).into()), 4);
        assert_eq!(exit_code_for_error(&eyre::eyre!("boom")), 1);
    }

    #[test]
    fn wrapped_store_errors_are_still_recognized() {
        use eyre::WrapErr;
        let source = serde_json::from_str::<u8>("nope").unwrap_err();
        let res: Result<(), StoreError> = Err(StoreError::Corrupt {
            path: "x.json".into(),
            source,
        });
        let report = res.wrap_err("open result store").unwrap_err();
        assert_eq!(exit_code_for_error(&report), 6);
        assert!(humanize(&report).contains("x.json"));
        let v: serde_json::Value = serde_json::from_str(&format_error_json(&report)).unwrap();
        assert_eq!(v["reason"], "StoreCorrupt");
    }

    #[test]
    fn config_messages_get_config_hint() {
        let report = eyre::eyre!("device.channels must be in [1, 16]");
        assert!(humanize(&report).contains("Configuration is invalid"));
    }
}
