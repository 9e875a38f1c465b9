//! Benchmarks for version parsing, range merging and compatibility lookups

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use verminator_core::document::parse_release_matrix;
use verminator_core::{
    filter_range, merge_ranges, MergeMode, ReleaseCompatibilityMeta, Settings, VersionIdentifier,
    VersionRange,
};
use std::path::Path;

fn v(s: &str) -> VersionIdentifier {
    VersionIdentifier::parse(s).unwrap()
}

/// Overlapping tool ranges, one per maintenance line
fn create_ranges(count: u32) -> Vec<VersionRange> {
    (0..count)
        .map(|i| {
            let minor = i / 10;
            let maint = i % 10;
            VersionRange::new(
                v(&format!("tool-1.{}.{}-final", minor, maint)),
                v(&format!("tool-1.{}.{}-final", minor, maint + 2)),
            )
            .unwrap()
        })
        .rev()
        .collect()
}

/// A release matrix with `count` self releases each declaring three products
fn create_matrix(count: u32) -> String {
    let mut yaml = String::from("Releases:\n");
    for i in 0..count {
        yaml.push_str(&format!(
            "  - release_name: tdc-1.{}.0-final\n    products:\n      - {{min: tool-1.{}.0-final, max: tool-1.{}.9-final}}\n      - {{min: app-2.{}.0-final, max: app-2.{}.0-final}}\n      - {{min: db-3.0.0-final, max: db-3.{}.0-final}}\n",
            i, i, i, i, i, i
        ));
    }
    yaml
}

fn bench_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("parsing");

    let inputs = vec![
        "tdc-1.0",
        "tool-1.3.2-final",
        "tool-1.3.2.4-rc2",
        "app-2.0.0.1-final-sv3",
        "1.8",
        "not a version",
    ];

    for input in inputs {
        group.bench_with_input(BenchmarkId::new("parse", input), input, |b, input| {
            b.iter(|| black_box(VersionIdentifier::parse(black_box(input))))
        });
    }

    group.finish();
}

fn bench_merging(c: &mut Criterion) {
    let mut group = c.benchmark_group("merging");

    for count in [10u32, 100, 1000] {
        let ranges = create_ranges(count);
        group.bench_with_input(BenchmarkId::new("soft", count), &ranges, |b, ranges| {
            b.iter(|| black_box(merge_ranges(ranges.iter().cloned(), MergeMode::Soft)))
        });
        group.bench_with_input(BenchmarkId::new("hard", count), &ranges, |b, ranges| {
            b.iter(|| black_box(merge_ranges(ranges.iter().cloned(), MergeMode::Hard)))
        });
    }

    group.finish();
}

fn bench_filtering(c: &mut Criterion) {
    let mut group = c.benchmark_group("filtering");
    let bound = VersionRange::new(v("tool-1.3.0-final"), v("tool-1.6.9-final")).unwrap();
    let ranges = create_ranges(100);

    group.bench_function("filter_100", |b| {
        b.iter(|| {
            let filtered: Vec<_> = ranges
                .iter()
                .filter_map(|range| filter_range(black_box(range), &bound))
                .collect();
            black_box(filtered)
        })
    });

    group.finish();
}

fn bench_compatibility(c: &mut Criterion) {
    let mut group = c.benchmark_group("compatibility");

    for count in [10u32, 50] {
        let document = parse_release_matrix(&create_matrix(count), Path::new("bench.yml")).unwrap();
        let meta = ReleaseCompatibilityMeta::from_document(&document, Settings::default()).unwrap();
        let query = v(&format!("tool-1.{}.5-final", count / 2));

        group.bench_with_input(BenchmarkId::new("build", count), &document, |b, document| {
            b.iter(|| black_box(ReleaseCompatibilityMeta::from_document(document, Settings::default())))
        });
        group.bench_with_input(BenchmarkId::new("query", count), &query, |b, query| {
            b.iter(|| black_box(meta.get_compatible_versions(black_box(query))))
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_parsing,
    bench_merging,
    bench_filtering,
    bench_compatibility
);

criterion_main!(benches);
