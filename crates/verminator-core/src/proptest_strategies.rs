//! Property-based testing strategies for generating test data
//!
//! Strategies produce valid versions and ranges of a small set of products
//! so that generated values collide often enough to exercise the ordering
//! and merge rules.

#![cfg(test)]

use crate::range::VersionRange;
use crate::version::{Suffix, VersionIdentifier};
use proptest::collection::vec;
use proptest::option;
use proptest::prelude::*;

/// Strategy for generating product prefixes, including third-party (none)
pub fn prefix_strategy() -> impl Strategy<Value = Option<String>> {
    option::of(prop_oneof![
        Just("tdc".to_string()),
        Just("tool".to_string()),
        Just("transwarp-ops".to_string()),
    ])
}

/// Strategy for generating suffixes
pub fn suffix_strategy() -> impl Strategy<Value = Option<Suffix>> {
    option::of(prop_oneof![Just(Suffix::Rc), Just(Suffix::Final)])
}

/// Strategy for a numeric segment: mostly small, occasionally at the parser's limit
pub fn segment_strategy(low: u32, high: u32) -> impl Strategy<Value = u32> {
    prop_oneof![
        8 => low..high,
        1 => Just(u32::MAX),
        1 => Just(u32::MAX - 1),
    ]
}

/// Strategy for generating full versions of one product
pub fn version_of(prefix: Option<String>) -> impl Strategy<Value = VersionIdentifier> {
    (
        0u32..4,                            // major
        segment_strategy(0, 4),             // minor
        option::of(segment_strategy(0, 4)), // maintenance
        option::of(segment_strategy(0, 3)), // build
        suffix_strategy(),
        option::of(segment_strategy(1, 4)), // suffix version
    )
        .prop_map(move |(major, minor, maintenance, build, suffix, suffix_version)| {
            VersionIdentifier {
                prefix: prefix.clone(),
                major,
                minor,
                // a build number is only printable after a maintenance segment
                maintenance: if build.is_some() { Some(maintenance.unwrap_or(0)) } else { maintenance },
                build,
                suffix,
                suffix_version: suffix.and(suffix_version),
            }
        })
}

/// Strategy for generating any valid version
pub fn version_strategy() -> impl Strategy<Value = VersionIdentifier> {
    prefix_strategy().prop_flat_map(version_of)
}

/// Strategy for generating minor-only versions of one product
pub fn minor_version_of(prefix: Option<String>) -> impl Strategy<Value = VersionIdentifier> {
    (0u32..6, 0u32..6).prop_map(move |(major, minor)| {
        VersionIdentifier::new(prefix.as_deref(), major, minor)
    })
}

/// Strategy for generating a range from two generated versions of one product
pub fn range_of<S>(low: S, high: S) -> impl Strategy<Value = VersionRange>
where
    S: Strategy<Value = VersionIdentifier>,
{
    (low, high).prop_map(|(a, b)| {
        let (min, max) = if a <= b { (a, b) } else { (b, a) };
        VersionRange::new(min, max).expect("bounds are ordered and share a prefix")
    })
}

/// Strategy for generating `tool` ranges at full precision
pub fn tool_range_strategy() -> impl Strategy<Value = VersionRange> {
    let tool = || version_of(Some("tool".to_string()));
    range_of(tool(), tool())
}

/// Strategy for generating lists of `tool` ranges at full precision
pub fn full_ranges_strategy() -> impl Strategy<Value = Vec<VersionRange>> {
    vec(tool_range_strategy(), 0..8)
}

/// Strategy for generating lists of `tool` ranges at minor precision
pub fn minor_ranges_strategy() -> impl Strategy<Value = Vec<VersionRange>> {
    vec(
        range_of(
            minor_version_of(Some("tool".to_string())),
            minor_version_of(Some("tool".to_string())),
        ),
        1..8,
    )
}
