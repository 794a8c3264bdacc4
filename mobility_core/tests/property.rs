use chrono::{DateTime, TimeDelta, Utc};
use mobility_core::{Sample, SessionStatus, TestIdentifier, TestSession, decode, score};
use proptest::prelude::*;
use std::time::Duration;

fn at(ms: i64) -> DateTime<Utc> {
    DateTime::<Utc>::UNIX_EPOCH + TimeDelta::milliseconds(ms)
}

prop_compose! {
    // Readings on a one-decimal grid, like decoded device values.
    fn tenth_grid()(raw in -3600i32..=3600) -> f64 {
        f64::from(raw) / 10.0
    }
}

prop_compose! {
    fn sample_seq(channels: usize)(
        seq in prop::collection::vec(prop::collection::vec(tenth_grid(), channels), 1..60)
    ) -> Vec<Vec<f64>> {
        seq
    }
}

proptest! {
    #[test]
    fn max_difference_is_monotone_and_dominates_each_step(seq in sample_seq(3)) {
        let mut sess = TestSession::new(3, Duration::from_secs(3600));
        sess.start(TestIdentifier::LeftAnkle, at(0)).unwrap();

        let baseline = seq[0].clone();
        let mut prev = vec![0.0; 3];
        for (i, values) in seq.iter().enumerate() {
            let status = sess.process_sample(&Sample::from_values(values.clone()), at(i as i64));
            prop_assert!(!matches!(status, SessionStatus::Completed(_)));
            let cur = sess.max_difference().unwrap().to_vec();
            for ch in 0..3 {
                prop_assert!(cur[ch] >= prev[ch], "channel {} decreased", ch);
                let diff = (values[ch] - baseline[ch]).abs();
                prop_assert!(cur[ch] >= diff);
            }
            if i == 0 {
                prop_assert_eq!(&cur, &vec![0.0; 3]);
            }
            prev = cur;
        }
    }

    #[test]
    fn completed_score_matches_scoring_function(seq in sample_seq(2)) {
        let mut sess = TestSession::new(2, Duration::from_millis(1000));
        sess.start(TestIdentifier::RightElbow, at(0)).unwrap();
        for (i, values) in seq.iter().enumerate() {
            sess.process_sample(&Sample::from_values(values.clone()), at(i as i64));
        }
        let last = seq.last().unwrap().clone();
        match sess.process_sample(&Sample::from_values(last), at(1000)) {
            SessionStatus::Completed(r) => {
                prop_assert_eq!(r.score, score(&r.max_difference));
                prop_assert!(r.max_difference.iter().all(|v| *v >= 0.0));
            }
            other => prop_assert!(false, "expected completion, got {:?}", other),
        }
    }

    #[test]
    fn decode_returns_values_rounded_to_tenths(values in prop::collection::vec(-1000.0f64..1000.0, 1..8)) {
        let line = values.iter().map(|v| format!("{v:.3}")).collect::<Vec<_>>().join(",");
        let sample = decode(&line, values.len()).unwrap();
        for (got, text) in sample.values().iter().zip(line.split(',')) {
            let parsed: f64 = text.parse().unwrap();
            prop_assert_eq!(*got, (parsed * 10.0).round() / 10.0);
        }
    }

    #[test]
    fn decode_rejects_wrong_field_counts(n in 1usize..8, extra in 1usize..3) {
        let line = vec!["1.0"; n + extra].join(",");
        prop_assert!(decode(&line, n).is_err());
    }

    #[test]
    fn score_is_rounded_sum_of_magnitudes(values in prop::collection::vec(tenth_grid(), 0..10)) {
        let want = (values.iter().map(|v| v.abs()).sum::<f64>() * 10.0).round() / 10.0;
        prop_assert_eq!(score(&values), want);
    }
}
