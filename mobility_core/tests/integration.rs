use chrono::{DateTime, TimeDelta, Utc};
use mobility_core::error::BuildError;
use mobility_core::{
    EngineError, LineOutcome, MobilityEngine, PlotBuffer, PlotCfg, ResultStore, SessionCfg,
    SessionError, SessionPhase, SessionStatus, TestIdentifier,
};
use mobility_traits::{Clock, ManualClock};
use std::time::Duration;
use tempfile::tempdir;

fn at(ms: i64) -> DateTime<Utc> {
    DateTime::<Utc>::UNIX_EPOCH + TimeDelta::milliseconds(ms)
}

fn two_channel() -> SessionCfg {
    SessionCfg {
        channels: 2,
        duration: Duration::from_secs(10),
    }
}

#[test]
fn end_to_end_scores_and_persists() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("results.json");
    let mut engine = MobilityEngine::builder()
        .with_session(two_channel())
        .with_store(ResultStore::open(&path).unwrap())
        .build()
        .unwrap();

    engine.start(TestIdentifier::LeftAnkle, at(0)).unwrap();
    assert_eq!(
        engine.handle_line("0.0,0.0", at(50)).unwrap(),
        LineOutcome::Accepted(SessionStatus::BaselineCaptured)
    );
    engine.handle_line("3.0,-4.0", at(4_000)).unwrap();
    let outcome = engine.handle_line("1.0,1.0", at(10_000)).unwrap();
    let result = match outcome {
        LineOutcome::Accepted(SessionStatus::Completed(r)) => r,
        other => panic!("expected completion, got {other:?}"),
    };
    assert_eq!(result.max_difference, vec![3.0, 4.0]);
    assert_eq!(result.score, 7.0);
    assert_eq!(engine.phase(), SessionPhase::Idle);

    assert_eq!(
        engine.best_result_for(TestIdentifier::LeftAnkle),
        Some(&result)
    );
    let reloaded = ResultStore::open(&path).unwrap();
    assert_eq!(reloaded.results(), &[result][..]);
}

#[test]
fn malformed_lines_are_dropped_without_state_change() {
    let mut engine = MobilityEngine::builder()
        .with_session(two_channel())
        .with_store(ResultStore::in_memory())
        .build()
        .unwrap();
    engine.start(TestIdentifier::RightAnkle, at(0)).unwrap();

    for bad in ["garbage", "1.0", "1.0,2.0,3.0", "1.0,x"] {
        assert_eq!(engine.handle_line(bad, at(1)).unwrap(), LineOutcome::Dropped);
    }
    assert_eq!(engine.dropped_lines(), 4);
    // Still waiting for the first valid sample to become the baseline.
    assert_eq!(engine.phase(), SessionPhase::AwaitingBaseline);
    assert!(engine.session().baseline().is_none());
}

#[test]
fn samples_reach_plot_feed_with_or_without_session() {
    let feed = PlotBuffer::new(2, &PlotCfg::default());
    let mut engine = MobilityEngine::builder()
        .with_session(two_channel())
        .with_store(ResultStore::in_memory())
        .build_with_feed(feed)
        .unwrap();

    assert_eq!(
        engine.handle_line("1.04,2.0", at(0)).unwrap(),
        LineOutcome::Accepted(SessionStatus::Idle)
    );
    engine.handle_line("bad", at(1)).unwrap();
    engine.start(TestIdentifier::LeftElbow, at(2)).unwrap();
    engine.handle_line("5.0,6.0", at(3)).unwrap();

    assert_eq!(engine.feed().pushed(), 2);
    assert_eq!(engine.feed().latest(), Some(vec![5.0, 6.0]));
    assert_eq!(engine.feed().channel(0).unwrap()[0], 1.0);
}

#[test]
fn second_start_is_rejected_through_engine() {
    let mut engine = MobilityEngine::builder()
        .with_session(two_channel())
        .with_store(ResultStore::in_memory())
        .build()
        .unwrap();
    engine.start(TestIdentifier::LeftAnkle, at(0)).unwrap();
    engine.handle_line("1.0,1.0", at(1)).unwrap();
    assert_eq!(
        engine.start(TestIdentifier::RightAnkle, at(2)),
        Err(SessionError::AlreadyActive)
    );
    assert_eq!(
        engine.session().baseline().map(|s| s.values().to_vec()),
        Some(vec![1.0, 1.0])
    );
}

#[test]
fn abort_discards_session_without_result() {
    let mut engine = MobilityEngine::builder()
        .with_session(two_channel())
        .with_store(ResultStore::in_memory())
        .build()
        .unwrap();
    engine.start(TestIdentifier::LeftAnkle, at(0)).unwrap();
    engine.handle_line("0,0", at(1)).unwrap();
    engine.handle_line("5,5", at(2)).unwrap();
    assert!(engine.abort());
    assert_eq!(
        engine.handle_line("9,9", at(20_000)).unwrap(),
        LineOutcome::Accepted(SessionStatus::Idle)
    );
    assert!(engine.store().is_empty());
}

#[test]
fn persist_failure_still_returns_result() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("results.json");
    std::fs::create_dir(dir.path().join("results.new")).unwrap();

    let mut engine = MobilityEngine::builder()
        .with_session(SessionCfg {
            channels: 1,
            duration: Duration::from_millis(100),
        })
        .with_store(ResultStore::open(&path).unwrap())
        .build()
        .unwrap();
    engine.start(TestIdentifier::RightElbow, at(0)).unwrap();
    engine.handle_line("0", at(0)).unwrap();
    match engine.handle_line("2.5", at(100)) {
        Err(EngineError::Persist { result, .. }) => {
            assert_eq!(result.score, 2.5);
        }
        other => panic!("expected persist failure, got {other:?}"),
    }
    // Session finished regardless, and the run's in-memory history has it.
    assert_eq!(engine.phase(), SessionPhase::Idle);
    assert_eq!(engine.store().len(), 1);
}

#[test]
fn manual_clock_drives_session_timing() {
    let clock = ManualClock::new();
    let mut engine = MobilityEngine::builder()
        .with_session(two_channel())
        .with_store(ResultStore::in_memory())
        .build()
        .unwrap();

    engine.start(TestIdentifier::LeftAnkle, clock.now()).unwrap();
    let mut completed = None;
    for i in 0..200 {
        clock.advance(Duration::from_millis(100));
        let v = (i % 7) as f64;
        let line = format!("{v},{}", -v);
        if let LineOutcome::Accepted(SessionStatus::Completed(r)) =
            engine.handle_line(&line, clock.now()).unwrap()
        {
            completed = Some((i, r));
            break;
        }
    }
    let (i, r) = completed.expect("session should complete");
    // 100 samples at 100 ms reach the 10 s mark.
    assert_eq!(i, 99);
    assert_eq!(r.max_difference, vec![6.0, 6.0]);
    assert_eq!(r.score, 12.0);
}

#[test]
fn builder_rejects_missing_store_and_channel_mismatch() {
    let err = MobilityEngine::builder()
        .with_session(two_channel())
        .build()
        .expect_err("store is required");
    assert!(matches!(
        err.downcast_ref::<BuildError>(),
        Some(BuildError::MissingStore)
    ));

    let err = MobilityEngine::builder()
        .with_session(two_channel())
        .with_decoder_channels(6)
        .with_store(ResultStore::in_memory())
        .build()
        .expect_err("channel mismatch is fatal");
    assert_eq!(
        err.downcast_ref::<SessionError>(),
        Some(&SessionError::ChannelCountMismatch {
            decoder: 6,
            session: 2
        })
    );

    let err = MobilityEngine::builder()
        .with_session(SessionCfg {
            channels: 0,
            duration: Duration::from_secs(1),
        })
        .with_store(ResultStore::in_memory())
        .build()
        .expect_err("zero channels");
    assert!(matches!(
        err.downcast_ref::<BuildError>(),
        Some(BuildError::InvalidConfig(_))
    ));
}

#[test]
fn out_of_range_readings_are_dropped_and_history_stays_loadable() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("results.json");
    let mut engine = MobilityEngine::builder()
        .with_session(SessionCfg {
            channels: 1,
            duration: Duration::from_secs(1),
        })
        .with_store(ResultStore::open(&path).unwrap())
        .build()
        .unwrap();

    let mut huge = String::from("1");
    huge.push_str(&"0".repeat(307));
    let negated = format!("-{huge}");

    engine.start(TestIdentifier::RightAnkle, at(0)).unwrap();
    assert_eq!(engine.handle_line(&huge, at(100)).unwrap(), LineOutcome::Dropped);
    assert_eq!(
        engine.handle_line(&negated, at(200)).unwrap(),
        LineOutcome::Dropped
    );
    assert_eq!(engine.phase(), SessionPhase::AwaitingBaseline);

    // The largest accepted readings still give a finite, reloadable result.
    assert_eq!(
        engine.handle_line("1000000000000000", at(300)).unwrap(),
        LineOutcome::Accepted(SessionStatus::BaselineCaptured)
    );
    let result = match engine.handle_line("-1000000000000000", at(1_000)).unwrap() {
        LineOutcome::Accepted(SessionStatus::Completed(r)) => r,
        other => panic!("expected completion, got {other:?}"),
    };
    assert_eq!(result.max_difference, vec![2.0e15]);
    assert_eq!(result.score, 2.0e15);

    let reloaded = ResultStore::open(&path).unwrap();
    assert_eq!(reloaded.results(), &[result][..]);
}
