#![no_main]
use libfuzzer_sys::fuzz_target;
use mobility_core::decode;
use mobility_core::lines::LineSplitter;

fuzz_target!(|data: &[u8]| {
    // Arbitrary device bytes: split into lines, decode each against a few
    // channel counts. Accepted samples must have the requested width and
    // finite values rounded to one decimal.
    let mut splitter = LineSplitter::default();
    for line in splitter.push(data) {
        for channels in [1usize, 2, 6] {
            if let Ok(sample) = decode(&line, channels) {
                assert_eq!(sample.len(), channels);
                for v in sample.values() {
                    assert!(v.is_finite());
                    assert_eq!(*v, (v * 10.0).round() / 10.0);
                }
            }
        }
    }
});
