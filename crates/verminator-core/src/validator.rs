//! Validate-and-repair pass over one product instance
//!
//! [`InstanceValidator::validate`] takes ownership of an instance, runs the
//! pipeline below in order and hands back the repaired instance together
//! with the warnings raised along the way:
//!
//! 1. every `final` release carries a suffix;
//! 2. hot-fix ranges are normalized and each release falls in exactly one;
//! 3. self-product releases depending on other product lines are flagged;
//! 4. declared dependencies are tightened to the compatible ranges found in
//!    the release matrix, clipped by the instance's tdc bound.
//!
//! Releases without a product prefix are third-party and skip steps 3-4.

use crate::error::{Error, Result};
use crate::instance::ProductInstance;
use crate::range::{filter_range, merge_ranges, MergeMode, VersionRange};
use crate::release_meta::{CompatibleVersions, ReleaseCompatibilityMeta};
use crate::settings::Settings;
use crate::version::VersionIdentifier;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use tracing::{debug, info, warn};

/// Policy switches for a validation run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidatorOptions {
    /// Accept minor-only and full-precision hot-fix ranges side by side
    pub allow_mixed_precision: bool,
    /// Warn when a self-product release depends on another product line
    pub warn_cross_product: bool,
}

impl Default for ValidatorOptions {
    fn default() -> Self {
        Self {
            allow_mixed_precision: false,
            warn_cross_product: true,
        }
    }
}

/// A non-fatal finding
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValidationWarning {
    /// A self-product release depends on another product line
    CrossProductDependency {
        release: VersionIdentifier,
        instance_type: String,
        product: Option<String>,
    },
    /// A declared dependency was rewritten to the compatible range
    DependencyRepaired {
        release: VersionIdentifier,
        instance_type: String,
        declared: VersionRange,
        repaired: VersionRange,
    },
}

impl fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationWarning::CrossProductDependency {
                release,
                instance_type,
                product,
            } => write!(
                f,
                "{} depends on {} of product {}, outside its own product line",
                release,
                instance_type,
                product.as_deref().unwrap_or("<third-party>")
            ),
            ValidationWarning::DependencyRepaired {
                release,
                instance_type,
                declared,
                repaired,
            } => write!(
                f,
                "{} dependency {} repaired from {} to {}",
                release, instance_type, declared, repaired
            ),
        }
    }
}

/// The repaired instance and the warnings found while validating it
#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    pub instance: ProductInstance,
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationReport {
    /// Whether any dependency bound was rewritten
    pub fn is_repaired(&self) -> bool {
        self.warnings
            .iter()
            .any(|w| matches!(w, ValidationWarning::DependencyRepaired { .. }))
    }
}

/// Validates instances against a release matrix
#[derive(Debug, Clone)]
pub struct InstanceValidator<'a> {
    meta: &'a ReleaseCompatibilityMeta,
    settings: Settings,
    options: ValidatorOptions,
}

impl<'a> InstanceValidator<'a> {
    pub fn new(
        meta: &'a ReleaseCompatibilityMeta,
        settings: Settings,
        options: ValidatorOptions,
    ) -> Self {
        Self {
            meta,
            settings,
            options,
        }
    }

    pub fn options(&self) -> &ValidatorOptions {
        &self.options
    }

    /// Run the full pipeline, returning the repaired instance and warnings
    pub fn validate(&self, mut instance: ProductInstance) -> Result<ValidationReport> {
        let label = instance.label();
        info!(instance = %label, releases = instance.releases().len(), "Validating instance");

        check_final_flags(&instance)?;
        self.normalize_hot_fix_ranges(&mut instance)?;

        let mut warnings = Vec::new();
        self.check_cross_product(&instance, &mut warnings);
        self.tighten_dependencies(&mut instance, &mut warnings)?;

        info!(instance = %label, warnings = warnings.len(), "Instance validated");
        Ok(ValidationReport { instance, warnings })
    }

    fn normalize_hot_fix_ranges(&self, instance: &mut ProductInstance) -> Result<()> {
        let label = instance.label();
        if let Some(range) = instance.hot_fix_ranges.iter().find(|r| r.has_mixed_precision()) {
            return Err(Error::range(
                format!("hot-fix range {} of {}", range, label),
                "min and max must have the same precision",
            ));
        }

        let (minor, full): (Vec<VersionRange>, Vec<VersionRange>) = instance
            .hot_fix_ranges
            .drain(..)
            .partition(VersionRange::is_minor_only);
        if !minor.is_empty() && !full.is_empty() && !self.options.allow_mixed_precision {
            return Err(Error::range(
                format!("hot-fix ranges of {}", label),
                "minor-only and full-precision ranges cannot be mixed",
            ));
        }

        let mut normalized = merge_ranges(minor, MergeMode::Hard);
        normalized.extend(merge_ranges(full, MergeMode::Soft));
        debug!(instance = %label, ranges = normalized.len(), "Normalized hot-fix ranges");
        instance.hot_fix_ranges = normalized;

        for version in instance.releases.keys() {
            let hits = instance
                .hot_fix_ranges
                .iter()
                .filter(|range| range.contains(version))
                .count();
            if hits != 1 {
                return Err(Error::validation(
                    label,
                    format!(
                        "release version {} should be located in exactly one hot-fix range, found {}",
                        version, hits
                    ),
                ));
            }
        }
        Ok(())
    }

    fn check_cross_product(&self, instance: &ProductInstance, warnings: &mut Vec<ValidationWarning>) {
        if !self.options.warn_cross_product {
            return;
        }
        for release in instance.releases.values() {
            if !self.settings.is_self_product(release.version().product()) {
                continue;
            }
            for dep in release.dependencies() {
                if self.settings.is_self_product(dep.product()) {
                    continue;
                }
                let warning = ValidationWarning::CrossProductDependency {
                    release: release.version().clone(),
                    instance_type: dep.instance_type.clone(),
                    product: dep.product().map(str::to_string),
                };
                warn!(instance = %instance.label(), "{}", warning);
                warnings.push(warning);
            }
        }
    }

    fn tighten_dependencies(
        &self,
        instance: &mut ProductInstance,
        warnings: &mut Vec<ValidationWarning>,
    ) -> Result<()> {
        let label = instance.label();
        let bound = instance.tdc_range().clone();

        for release in instance.releases.values_mut() {
            let version = release.version().clone();
            if version.product().is_none() {
                debug!(release = %version, "Third-party release, skipping dependency checks");
                continue;
            }

            let (compatible, emptied) = filter_compatible(self.meta.get_compatible_versions(&version)?, &bound);

            for dep in release.dependencies.iter_mut() {
                let Some(product) = dep.product() else {
                    debug!(release = %version, dependency = %dep.instance_type, "Third-party dependency left unchanged");
                    continue;
                };
                if emptied.contains(product) {
                    return Err(Error::validation(
                        format!("{} release {}", label, version),
                        format!(
                            "no valid version range after filtering for dependency {} ({}) within {}",
                            dep.instance_type, product, bound
                        ),
                    ));
                }
                let Some(repaired) = compatible.get(product).and_then(|ranges| ranges.first()) else {
                    debug!(release = %version, dependency = %dep.instance_type, "No compatibility data, left unchanged");
                    continue;
                };
                if *repaired != dep.range {
                    let warning = ValidationWarning::DependencyRepaired {
                        release: version.clone(),
                        instance_type: dep.instance_type.clone(),
                        declared: dep.range.clone(),
                        repaired: repaired.clone(),
                    };
                    warn!(instance = %label, "{}", warning);
                    warnings.push(warning);
                    dep.range = repaired.clone();
                }
            }
        }
        Ok(())
    }
}

/// Every `final` release must carry a suffix
fn check_final_flags(instance: &ProductInstance) -> Result<()> {
    for release in instance.releases.values() {
        if release.is_final() && release.version().suffix.is_none() {
            return Err(Error::validation(
                instance.label(),
                format!("the final version {} is illegal: it carries no suffix", release.version()),
            ));
        }
    }
    Ok(())
}

/// Clip every compatible range by `bound`, dropping products left empty.
///
/// Returns the filtered result and the products that had ranges before
/// filtering and none after.
fn filter_compatible(
    compatible: CompatibleVersions,
    bound: &VersionRange,
) -> (CompatibleVersions, BTreeSet<String>) {
    let mut filtered = CompatibleVersions::new();
    let mut emptied = BTreeSet::new();
    for (product, ranges) in compatible {
        let had_ranges = !ranges.is_empty();
        let kept: Vec<VersionRange> = ranges
            .iter()
            .filter_map(|range| filter_range(range, bound))
            .collect();
        if kept.is_empty() {
            if had_ranges {
                emptied.insert(product);
            }
        } else {
            filtered.insert(product, kept);
        }
    }
    (filtered, emptied)
}
