//! Closed version ranges and the range algebra
//!
//! Two merge policies exist. Soft merging keeps disjoint compatibility
//! windows apart and only joins ranges that overlap or are adjacent
//! (next build number, `rc` to `final` of the same release point, or a
//! `final` carrying forward). Hard merging is used for minor-only ranges,
//! where gaps between sub-versions are not tracked, and always collapses
//! its input into one span.
//!
//! Copyright (c) 2025 Verminator Team
//! Licensed under the Apache-2.0 license

use crate::error::{Error, Result};
use crate::version::{Suffix, VersionDelta, VersionIdentifier};
use serde::Serialize;
use std::fmt;

/// A closed interval `[min, max]` of versions of one product
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct VersionRange {
    min: VersionIdentifier,
    max: VersionIdentifier,
}

/// Range merging policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MergeMode {
    /// Merge only overlapping or adjacent ranges
    #[default]
    Soft,
    /// Collapse everything into one span
    Hard,
}

impl MergeMode {
    /// Hard for minor-only precision, soft otherwise
    pub fn for_precision(minor_only: bool) -> Self {
        if minor_only {
            MergeMode::Hard
        } else {
            MergeMode::Soft
        }
    }
}

impl VersionRange {
    /// Create a range, checking `min <= max` and a shared prefix
    pub fn new(min: VersionIdentifier, max: VersionIdentifier) -> Result<Self> {
        if !min.same_product(&max) {
            return Err(Error::range(
                format!("range {} .. {}", min, max),
                "min and max must carry the same product prefix",
            ));
        }
        if min > max {
            return Err(Error::range(
                format!("range {} .. {}", min, max),
                "min is greater than max",
            ));
        }
        Ok(Self { min, max })
    }

    /// The range `[version, version]`
    pub fn singleton(version: VersionIdentifier) -> Self {
        Self {
            min: version.clone(),
            max: version,
        }
    }

    /// Parse both bounds and build the range
    pub fn parse(min: &str, max: &str) -> Result<Self> {
        Self::new(VersionIdentifier::parse(min)?, VersionIdentifier::parse(max)?)
    }

    pub fn min(&self) -> &VersionIdentifier {
        &self.min
    }

    pub fn max(&self) -> &VersionIdentifier {
        &self.max
    }

    /// Product shared by both bounds
    pub fn product(&self) -> Option<&str> {
        self.min.product()
    }

    /// Both bounds are minor-only
    pub fn is_minor_only(&self) -> bool {
        self.min.is_minor_only() && self.max.is_minor_only()
    }

    /// One bound is minor-only and the other is not
    pub fn has_mixed_precision(&self) -> bool {
        self.min.is_minor_only() != self.max.is_minor_only()
    }

    /// Range with both bounds truncated to minor precision
    pub fn truncate_to_minor(&self) -> Self {
        Self {
            min: self.min.truncate_to_minor(),
            max: self.max.truncate_to_minor(),
        }
    }

    /// Whether `version` lies in the range.
    ///
    /// A minor-only range compares `version` at minor precision.
    pub fn contains(&self, version: &VersionIdentifier) -> bool {
        if !self.min.same_product(version) {
            return false;
        }
        if self.is_minor_only() {
            let version = version.truncate_to_minor();
            self.min <= version && version <= self.max
        } else {
            &self.min <= version && version <= &self.max
        }
    }

    /// Split into owned bounds
    pub fn into_bounds(self) -> (VersionIdentifier, VersionIdentifier) {
        (self.min, self.max)
    }
}

impl fmt::Display for VersionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.min, self.max)
    }
}

/// Whether `version` lies in `range`
pub fn containment(version: &VersionIdentifier, range: &VersionRange) -> bool {
    range.contains(version)
}

/// Intersect `candidate` with `bound`.
///
/// A bound of a different product leaves the candidate untouched. A
/// minor-only candidate is intersected with the bound projected to minor
/// precision. Returns `None` when the intersection is empty.
pub fn filter_range(candidate: &VersionRange, bound: &VersionRange) -> Option<VersionRange> {
    if candidate.product() != bound.product() {
        return Some(candidate.clone());
    }

    let bound = if candidate.is_minor_only() {
        bound.truncate_to_minor()
    } else {
        bound.clone()
    };

    let min = std::cmp::max(&candidate.min, &bound.min);
    let max = std::cmp::min(&candidate.max, &bound.max);
    if min > max {
        return None;
    }
    Some(VersionRange {
        min: min.clone(),
        max: max.clone(),
    })
}

fn should_join(previous: &VersionRange, next: &VersionRange) -> bool {
    let (pmin, pmax) = (&previous.min, &previous.max);
    let cmin = &next.min;

    // Overlapping, or adjacent build numbers
    if (pmin <= cmin && cmin <= pmax) || pmax.step_build().as_ref() == Some(cmin) {
        return true;
    }

    // rc followed by the final of the same release point
    if pmax.coordinate_delta(cmin, true).is_zero()
        && pmax.suffix == Some(Suffix::Rc)
        && cmin.suffix == Some(Suffix::Final)
    {
        return true;
    }

    // a final keeps absorbing anything at or after it
    cmin.coordinate_delta(pmax, true) >= VersionDelta::ZERO && pmax.suffix == Some(Suffix::Final)
}

/// Sort `ranges` by lower bound and merge them under `mode`.
///
/// Ranges of different products are never joined. The result is sorted
/// and, for soft mode, pairwise disjoint.
pub fn merge_ranges<I>(ranges: I, mode: MergeMode) -> Vec<VersionRange>
where
    I: IntoIterator<Item = VersionRange>,
{
    let mut sorted: Vec<VersionRange> = ranges.into_iter().collect();
    sorted.sort_by(|a, b| a.min.cmp(&b.min));

    let mut merged: Vec<VersionRange> = Vec::with_capacity(sorted.len());
    for range in sorted {
        if let Some(previous) = merged.last_mut() {
            let joinable = previous.product() == range.product()
                && (mode == MergeMode::Hard || should_join(previous, &range));
            if joinable {
                if range.max > previous.max {
                    previous.max = range.max;
                }
                continue;
            }
        }
        merged.push(range);
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn r(min: &str, max: &str) -> VersionRange {
        VersionRange::parse(min, max).unwrap()
    }

    fn v(s: &str) -> VersionIdentifier {
        VersionIdentifier::parse(s).unwrap()
    }

    #[test]
    fn test_new_rejects_inverted_and_cross_product() {
        let err = VersionRange::parse("tool-1.2.0-final", "tool-1.1.0-final").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Range);
        let err = VersionRange::parse("tool-1.0.0-final", "app-1.1.0-final").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Range);
    }

    #[test]
    fn test_containment() {
        let range = r("tool-1.3.0-final", "tool-1.3.5-final");
        assert!(containment(&v("tool-1.3.2-final"), &range));
        assert!(range.contains(&v("tool-1.3.0-final")));
        assert!(range.contains(&v("tool-1.3.5-final")));
        assert!(!range.contains(&v("tool-1.3.0-rc1")));
        assert!(!range.contains(&v("tool-1.3.5")));
        assert!(!range.contains(&v("app-1.3.2-final")));
    }

    #[test]
    fn test_minor_only_containment() {
        let range = r("x-1.0", "x-1.0");
        assert!(range.contains(&v("x-1.0.3-final")));
        assert!(range.contains(&v("x-1.0.0-rc1")));
        assert!(!range.contains(&v("x-1.1.0-final")));
    }

    #[test]
    fn test_filter_range() {
        let candidate = r("sophonweb-1.3.0-final", "sophonweb-2.2.1-final");
        let bound = r("sophonweb-2.2.0-final", "sophonweb-2.2.0-final");
        assert_eq!(filter_range(&candidate, &bound), Some(bound.clone()));

        let candidate = r("sophonweb-2.2.0-final", "sophonweb-2.2.0-final");
        let bound = r("sophonweb-1.3.0-final", "sophonweb-1.3.0-final");
        assert_eq!(filter_range(&candidate, &bound), None);

        let candidate = r("sophonweb-2.0.0-final", "sophonweb-2.0.0-final");
        let bound = r("sophonweb-1.3.0-final", "sophonweb-2.2.0-final");
        assert_eq!(filter_range(&candidate, &bound), Some(candidate.clone()));

        let candidate = r("transwarp-5.2.1-final", "transwarp-6.0.2-final");
        let bound = r("transwarp-5.2.1-final", "transwarp-5.2.1-final");
        assert_eq!(filter_range(&candidate, &bound), Some(bound));
    }

    #[test]
    fn test_filter_range_ignores_other_products() {
        let candidate = r("tool-1.0.0-final", "tool-2.0.0-final");
        let bound = r("tdc-1.0.0-final", "tdc-1.0.0-final");
        assert_eq!(filter_range(&candidate, &bound), Some(candidate));
    }

    #[test]
    fn test_filter_minor_only_candidate() {
        let candidate = r("tdc-1.0", "tdc-2.1");
        let bound = r("tdc-1.2.0-rc1", "tdc-1.3.4-final");
        assert_eq!(filter_range(&candidate, &bound), Some(r("tdc-1.2", "tdc-1.3")));
    }

    #[test]
    fn test_soft_merge_overlap_and_adjacent_builds() {
        let merged = merge_ranges(
            vec![
                r("tool-1.0.0.3-rc1", "tool-1.0.0.5-rc1"),
                r("tool-1.0.0.1-rc1", "tool-1.0.0.4-rc1"),
                r("tool-1.0.0.6-rc1", "tool-1.0.0.6-rc1"),
            ],
            MergeMode::Soft,
        );
        assert_eq!(merged, vec![r("tool-1.0.0.1-rc1", "tool-1.0.0.6-rc1")]);

        // 1.0.0.2 -> 1.0.0.3 is a gap in coordinates but adjacent in builds
        let merged = merge_ranges(
            vec![
                r("tool-1.0.0.3-rc1", "tool-1.0.0.4-rc1"),
                r("tool-1.0.0.1-rc1", "tool-1.0.0.2-rc1"),
                r("tool-1.0.0.6-rc1", "tool-1.0.0.7-rc1"),
            ],
            MergeMode::Soft,
        );
        assert_eq!(
            merged,
            vec![r("tool-1.0.0.1-rc1", "tool-1.0.0.4-rc1"), r("tool-1.0.0.6-rc1", "tool-1.0.0.7-rc1")]
        );
    }

    #[test]
    fn test_soft_merge_at_build_limit() {
        let merged = merge_ranges(
            vec![
                r("tool-1.0.0.4294967295-rc1", "tool-1.0.0.4294967295-rc1"),
                r("tool-1.0.1-rc1", "tool-1.0.1-rc1"),
            ],
            MergeMode::Soft,
        );
        assert_eq!(
            merged,
            vec![
                r("tool-1.0.0.4294967295-rc1", "tool-1.0.0.4294967295-rc1"),
                r("tool-1.0.1-rc1", "tool-1.0.1-rc1"),
            ]
        );
    }

    #[test]
    fn test_soft_merge_never_shrinks() {
        let merged = merge_ranges(
            vec![r("tool-1.0.0-rc1", "tool-1.9.0-rc1"), r("tool-1.2.0-rc1", "tool-1.3.0-rc1")],
            MergeMode::Soft,
        );
        assert_eq!(merged, vec![r("tool-1.0.0-rc1", "tool-1.9.0-rc1")]);
    }

    #[test]
    fn test_soft_merge_rc_to_final() {
        let merged = merge_ranges(
            vec![r("tool-1.0.0-rc1", "tool-1.3.0-rc2"), r("tool-1.3.0-final", "tool-1.3.0-final")],
            MergeMode::Soft,
        );
        assert_eq!(merged, vec![r("tool-1.0.0-rc1", "tool-1.3.0-final")]);
    }

    #[test]
    fn test_soft_merge_final_carries_forward() {
        let merged = merge_ranges(
            vec![r("tool-1.0.0-final", "tool-1.0.0-final"), r("tool-1.2.0-rc1", "tool-1.2.0-rc1")],
            MergeMode::Soft,
        );
        assert_eq!(merged, vec![r("tool-1.0.0-final", "tool-1.2.0-rc1")]);
    }

    #[test]
    fn test_soft_merge_keeps_gaps() {
        let merged = merge_ranges(
            vec![r("tool-1.5.0-rc1", "tool-1.6.0-rc1"), r("tool-1.0.0-rc1", "tool-1.1.0-rc1")],
            MergeMode::Soft,
        );
        assert_eq!(
            merged,
            vec![r("tool-1.0.0-rc1", "tool-1.1.0-rc1"), r("tool-1.5.0-rc1", "tool-1.6.0-rc1")]
        );
    }

    #[test]
    fn test_hard_merge_collapses() {
        let merged = merge_ranges(
            vec![r("tool-1.5", "tool-1.6"), r("tool-1.0", "tool-1.9"), r("tool-2.0", "tool-2.1")],
            MergeMode::Hard,
        );
        assert_eq!(merged, vec![r("tool-1.0", "tool-2.1")]);
    }

    #[test]
    fn test_hard_merge_keeps_products_apart() {
        let merged = merge_ranges(
            vec![r("tool-1.0", "tool-1.1"), r("app-2.0", "app-2.0"), r("tool-1.4", "tool-1.5")],
            MergeMode::Hard,
        );
        assert_eq!(merged, vec![r("app-2.0", "app-2.0"), r("tool-1.0", "tool-1.5")]);
    }

    #[test]
    fn test_merge_empty() {
        assert!(merge_ranges(Vec::new(), MergeMode::Soft).is_empty());
        assert!(merge_ranges(Vec::new(), MergeMode::Hard).is_empty());
    }

    #[test]
    fn test_mode_for_precision() {
        assert_eq!(MergeMode::for_precision(true), MergeMode::Hard);
        assert_eq!(MergeMode::for_precision(false), MergeMode::Soft);
    }
}
