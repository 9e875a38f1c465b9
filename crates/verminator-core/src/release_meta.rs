//! The global release matrix and compatibility queries
//!
//! The matrix is loaded once into two tables: one at full precision and
//! one with every identifier truncated to minor precision. Queries pick the
//! table matching the precision of the version asked about.

use crate::document::{self, ReleaseMatrixDocument};
use crate::error::{Error, Result};
use crate::range::{merge_ranges, MergeMode, VersionRange};
use crate::settings::Settings;
use crate::version::VersionIdentifier;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info};

/// Declared range per product for one platform release
pub type ProductRanges = BTreeMap<String, VersionRange>;

/// Platform release -> declared product ranges
pub type ReleaseTable = BTreeMap<VersionIdentifier, ProductRanges>;

/// Product -> sorted, merged compatible ranges
pub type CompatibleVersions = BTreeMap<String, Vec<VersionRange>>;

/// Read-only view of the release matrix
#[derive(Debug, Clone)]
pub struct ReleaseCompatibilityMeta {
    settings: Settings,
    releases: ReleaseTable,
    minor_releases: ReleaseTable,
}

impl ReleaseCompatibilityMeta {
    /// Build both precision tables from a parsed matrix document
    pub fn from_document(document: &ReleaseMatrixDocument, settings: Settings) -> Result<Self> {
        let releases = build_table(document, false)?;
        let minor_releases = build_table(document, true)?;
        info!(
            releases = releases.len(),
            minor_releases = minor_releases.len(),
            oem = %settings.oem_name,
            "Release matrix loaded"
        );
        Ok(Self {
            settings,
            releases,
            minor_releases,
        })
    }

    /// Load the matrix from a YAML file
    pub fn load(path: &Path, settings: Settings) -> Result<Self> {
        let document = document::load_release_matrix(path)?;
        Self::from_document(&document, settings)
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Full-precision table
    pub fn releases(&self) -> &ReleaseTable {
        &self.releases
    }

    /// Minor-precision table
    pub fn minor_releases(&self) -> &ReleaseTable {
        &self.minor_releases
    }

    /// Declared platform releases in ascending order
    pub fn release_names(&self) -> impl Iterator<Item = &VersionIdentifier> {
        self.releases.keys()
    }

    /// Compatible ranges of every product for `version`.
    ///
    /// For a self-product version this is the declared row of that release.
    /// For any other product it is the union over every release whose
    /// declared range for that product contains `version`, with the matching
    /// releases collected under the self product. The queried product always
    /// maps to `[version, version]`.
    pub fn get_compatible_versions(&self, version: &VersionIdentifier) -> Result<CompatibleVersions> {
        let product = version.product().ok_or_else(|| {
            Error::not_found(format!(
                "version {} carries no product prefix and is not in the release matrix",
                version
            ))
        })?;

        let minor_only = version.is_minor_only();
        let table = if minor_only {
            &self.minor_releases
        } else {
            &self.releases
        };
        let mode = MergeMode::for_precision(minor_only);
        let oem = self.settings.oem_name.as_str();

        let mut result = CompatibleVersions::new();
        if self.settings.is_self_product(Some(product)) {
            let products = table.get(version).ok_or_else(|| {
                Error::not_found(format!(
                    "version {} should be declared in the release matrix",
                    version
                ))
            })?;
            for (name, range) in products {
                result.insert(name.clone(), vec![range.clone()]);
            }
        } else {
            result.insert(oem.to_string(), Vec::new());
            for (release, products) in table {
                let Some(declared) = products.get(product) else {
                    continue;
                };
                if !declared.contains(version) {
                    continue;
                }
                accumulate(&mut result, oem, VersionRange::singleton(release.clone()), mode);
                for (name, range) in products {
                    if name != product {
                        accumulate(&mut result, name, range.clone(), mode);
                    }
                }
            }
        }

        result.insert(
            product.to_string(),
            vec![VersionRange::singleton(version.clone())],
        );
        debug!(version = %version, products = result.len(), "Computed compatible versions");
        Ok(result)
    }

    /// Span of platform releases compatible with `version`.
    ///
    /// Without a version this is the first and last declared release. A
    /// minor-only platform range is widened to the first and last full
    /// release of its line. Returns `None` when nothing is compatible.
    pub fn self_version_range(&self, version: Option<&VersionIdentifier>) -> Result<Option<VersionRange>> {
        let Some(version) = version else {
            return Ok(first_and_last(self.releases.keys()));
        };

        let compatible = self.get_compatible_versions(version)?;
        let Some(ranges) = compatible.get(&self.settings.oem_name) else {
            return Ok(None);
        };

        let mut spans = Vec::with_capacity(ranges.len());
        for range in ranges {
            if range.is_minor_only() {
                let first = self.line_releases(range.min()).next().cloned();
                let last = self.line_releases(range.max()).next_back().cloned();
                match (first, last) {
                    (Some(min), Some(max)) => spans.push(VersionRange::new(min, max)?),
                    _ => {
                        return Err(Error::not_found(format!(
                            "no platform release of line {} for {}",
                            range, version
                        )))
                    }
                }
            } else {
                spans.push(range.clone());
            }
        }

        Ok(first_and_last(spans.iter().flat_map(|r| [r.min(), r.max()])))
    }

    fn line_releases<'a>(
        &'a self,
        anchor: &'a VersionIdentifier,
    ) -> impl DoubleEndedIterator<Item = &'a VersionIdentifier> + 'a {
        self.releases
            .keys()
            .filter(move |release| release.anchor() == *anchor)
    }
}

fn first_and_last<'a, I>(versions: I) -> Option<VersionRange>
where
    I: IntoIterator<Item = &'a VersionIdentifier>,
{
    let mut iter = versions.into_iter();
    let first = iter.next()?;
    let (min, max) = iter.fold((first, first), |(min, max), v| {
        (std::cmp::min(min, v), std::cmp::max(max, v))
    });
    VersionRange::new(min.clone(), max.clone()).ok()
}

fn accumulate(result: &mut CompatibleVersions, product: &str, range: VersionRange, mode: MergeMode) {
    let ranges = result.entry(product.to_string()).or_default();
    let mut pending = std::mem::take(ranges);
    pending.push(range);
    *ranges = merge_ranges(pending, mode);
}

fn build_table(document: &ReleaseMatrixDocument, minor_only: bool) -> Result<ReleaseTable> {
    let project = |version: VersionIdentifier| {
        if minor_only {
            version.truncate_to_minor()
        } else {
            version
        }
    };
    let mode = MergeMode::for_precision(minor_only);

    let mut table = ReleaseTable::new();
    for entry in &document.releases {
        let release = project(VersionIdentifier::parse(&entry.release_name)?);
        let products = table.entry(release.clone()).or_default();

        for bounds in &entry.products {
            let min = project(VersionIdentifier::parse(&bounds.min)?);
            let max = project(VersionIdentifier::parse(&bounds.max)?);
            if !min.same_product(&max) {
                return Err(Error::range(
                    format!("release {}", release),
                    format!(
                        "product version should have the same prefix name: {} vs. {}",
                        bounds.min, bounds.max
                    ),
                ));
            }
            let name = min
                .product()
                .ok_or_else(|| {
                    Error::validation(
                        format!("release {}", release),
                        format!("product version {} carries no product prefix", bounds.min),
                    )
                })?
                .to_string();
            let range = VersionRange::new(min, max)?;

            let merged = match products.remove(&name) {
                None => range,
                Some(existing) => {
                    let mut merged = merge_ranges([existing, range], mode);
                    if merged.len() != 1 {
                        return Err(Error::duplicate(
                            "product",
                            name,
                            format!("release {} (declarations are disjoint)", release),
                        ));
                    }
                    merged.remove(0)
                }
            };
            products.insert(name, merged);
        }
    }
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{BoundsDocument, ReleaseEntryDocument};
    use crate::error::ErrorKind;

    fn v(s: &str) -> VersionIdentifier {
        VersionIdentifier::parse(s).unwrap()
    }

    fn r(min: &str, max: &str) -> VersionRange {
        VersionRange::parse(min, max).unwrap()
    }

    fn entry(name: &str, products: &[(&str, &str)]) -> ReleaseEntryDocument {
        ReleaseEntryDocument {
            release_name: name.to_string(),
            products: products
                .iter()
                .map(|(min, max)| BoundsDocument {
                    min: min.to_string(),
                    max: max.to_string(),
                })
                .collect(),
        }
    }

    fn meta(entries: Vec<ReleaseEntryDocument>) -> ReleaseCompatibilityMeta {
        ReleaseCompatibilityMeta::from_document(
            &ReleaseMatrixDocument { releases: entries },
            Settings::default(),
        )
        .unwrap()
    }

    fn sample() -> ReleaseCompatibilityMeta {
        meta(vec![
            entry(
                "tdc-1.0.0-rc1",
                &[("tool-1.2.0-final", "tool-1.2.0-final"), ("app-1.0.0-rc1", "app-1.0.0-rc1")],
            ),
            entry(
                "tdc-1.0.0-final",
                &[("tool-1.3.0-final", "tool-1.3.5-final"), ("app-1.0.0-final", "app-1.0.0-final")],
            ),
            entry(
                "tdc-1.1.0-final",
                &[("tool-1.3.4-final", "tool-1.4.0-final"), ("app-1.1.0-final", "app-1.1.0-final")],
            ),
        ])
    }

    #[test]
    fn test_query_by_dependency_product() {
        let meta = meta(vec![entry(
            "tdc-1.0.0-final",
            &[("tool-1.3.0-final", "tool-1.3.5-final")],
        )]);
        let compatible = meta.get_compatible_versions(&v("tool-1.3.2-final")).unwrap();

        let mut expected = CompatibleVersions::new();
        expected.insert("tdc".to_string(), vec![r("tdc-1.0.0-final", "tdc-1.0.0-final")]);
        expected.insert("tool".to_string(), vec![r("tool-1.3.2-final", "tool-1.3.2-final")]);
        assert_eq!(compatible, expected);
    }

    #[test]
    fn test_query_merges_across_releases() {
        let compatible = sample().get_compatible_versions(&v("tool-1.3.4-final")).unwrap();
        assert_eq!(
            compatible["tdc"],
            vec![r("tdc-1.0.0-final", "tdc-1.1.0-final")]
        );
        assert_eq!(
            compatible["app"],
            vec![r("app-1.0.0-final", "app-1.1.0-final")]
        );
    }

    #[test]
    fn test_query_by_self_product() {
        let compatible = sample().get_compatible_versions(&v("tdc-1.0.0-final")).unwrap();
        assert_eq!(compatible["tool"], vec![r("tool-1.3.0-final", "tool-1.3.5-final")]);
        assert_eq!(compatible["tdc"], vec![r("tdc-1.0.0-final", "tdc-1.0.0-final")]);

        let err = sample().get_compatible_versions(&v("tdc-9.0.0-final")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_query_minor_precision() {
        let meta = sample();
        assert_eq!(meta.minor_releases().len(), 2);
        let compatible = meta.get_compatible_versions(&v("tool-1.3")).unwrap();
        assert_eq!(compatible["tdc"], vec![r("tdc-1.0", "tdc-1.1")]);
        assert_eq!(compatible["tool"], vec![r("tool-1.3", "tool-1.3")]);
    }

    #[test]
    fn test_query_is_idempotent() {
        let meta = sample();
        let first = meta.get_compatible_versions(&v("app-1.0.0-final")).unwrap();
        let second = meta.get_compatible_versions(&v("app-1.0.0-final")).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_duplicate_products_are_merged() {
        let meta = meta(vec![entry(
            "tdc-1.0.0-final",
            &[("tool-1.3.0-final", "tool-1.3.2-final"), ("tool-1.3.1-final", "tool-1.3.5-final")],
        )]);
        let row = &meta.releases()[&v("tdc-1.0.0-final")];
        assert_eq!(row["tool"], r("tool-1.3.0-final", "tool-1.3.5-final"));
    }

    #[test]
    fn test_disjoint_duplicate_products_fail() {
        let err = ReleaseCompatibilityMeta::from_document(
            &ReleaseMatrixDocument {
                releases: vec![entry(
                    "tdc-1.0.0-final",
                    &[("tool-1.0.0-rc1", "tool-1.0.0-rc1"), ("tool-2.0.0-rc1", "tool-2.0.0-rc1")],
                )],
            },
            Settings::default(),
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Duplicate);
    }

    #[test]
    fn test_prefix_mismatch_fails() {
        let err = ReleaseCompatibilityMeta::from_document(
            &ReleaseMatrixDocument {
                releases: vec![entry("tdc-1.0.0-final", &[("tool-1.0.0-final", "app-1.0.0-final")])],
            },
            Settings::default(),
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Range);
    }

    #[test]
    fn test_self_version_range() {
        let meta = sample();
        assert_eq!(
            meta.self_version_range(None).unwrap(),
            Some(r("tdc-1.0.0-rc1", "tdc-1.1.0-final"))
        );
        assert_eq!(
            meta.self_version_range(Some(&v("tool-1.3.4-final"))).unwrap(),
            Some(r("tdc-1.0.0-final", "tdc-1.1.0-final"))
        );
        assert_eq!(
            meta.self_version_range(Some(&v("tool-1.3"))).unwrap(),
            Some(r("tdc-1.0.0-rc1", "tdc-1.1.0-final"))
        );
        assert_eq!(meta.self_version_range(Some(&v("tool-9.0.0-final"))).unwrap(), None);
    }
}
