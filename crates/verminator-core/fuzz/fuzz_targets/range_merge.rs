//! Fuzzing target for range merging
//!
//! Builds ranges from pairs of fuzzed numbers and checks that a hard merge
//! covers every input and a soft merge never returns overlapping ranges.

#![no_main]

use libfuzzer_sys::fuzz_target;
use verminator_core::{merge_ranges, MergeMode, VersionIdentifier, VersionRange};

fn version(minor: u8, maint: u8) -> VersionIdentifier {
    VersionIdentifier::parse(&format!("tool-1.{}.{}-final", minor % 8, maint % 8))
        .expect("generated version must parse")
}

fuzz_target!(|data: &[u8]| {
    let ranges: Vec<VersionRange> = data
        .chunks_exact(4)
        .filter_map(|c| VersionRange::new(version(c[0], c[1]), version(c[2], c[3])).ok())
        .collect();
    if ranges.is_empty() {
        return;
    }

    let hard = merge_ranges(ranges.clone(), MergeMode::Hard);
    assert_eq!(hard.len(), 1);
    for range in &ranges {
        assert!(hard[0].min() <= range.min() && range.max() <= hard[0].max());
    }

    let soft = merge_ranges(ranges, MergeMode::Soft);
    for pair in soft.windows(2) {
        assert!(pair[0].max() < pair[1].min());
    }
});
