//! The simulated device drives the full reader → decoder path.

use std::time::Duration;

use mobility_core::{LineReader, ReaderEvent, SampleDecoder};
use mobility_hardware::{ReplaySource, SimulatedImu};
use mobility_traits::ManualClock;
use rstest::rstest;

#[rstest]
#[case(1)]
#[case(3)]
#[case(6)]
fn simulated_lines_decode_with_matching_channel_count(#[case] channels: usize) {
    let sim = SimulatedImu::with_clock(channels, 200.0, 30.0, ManualClock::new()).unwrap();
    let reader = LineReader::spawn(sim, Duration::from_millis(10));
    let decoder = SampleDecoder::new(channels);

    let mut decoded = 0;
    while decoded < 20 {
        match reader.recv_timeout(Duration::from_secs(2)) {
            ReaderEvent::Line(line) => {
                let sample = decoder.decode(&line).unwrap();
                assert_eq!(sample.len(), channels);
                decoded += 1;
            }
            ReaderEvent::Idle => continue,
            ReaderEvent::Closed => panic!("simulator stream closed"),
        }
    }
}

#[test]
fn replay_file_closes_reader_at_end() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("capture.csv");
    std::fs::write(&path, "1.0,2.0\nnoise\n3.0,4.0\n").unwrap();

    let reader = LineReader::spawn(
        ReplaySource::open(&path).unwrap(),
        Duration::from_millis(10),
    );
    let mut lines = Vec::new();
    loop {
        match reader.recv_timeout(Duration::from_secs(2)) {
            ReaderEvent::Line(l) => lines.push(l),
            ReaderEvent::Idle => continue,
            ReaderEvent::Closed => break,
        }
    }
    assert_eq!(lines, vec!["1.0,2.0", "noise", "3.0,4.0"]);
}
