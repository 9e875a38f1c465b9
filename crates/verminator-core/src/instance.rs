//! Product instances and their releases
//!
//! A [`ProductInstance`] is built from an [`InstanceDocument`] through
//! [`ProductInstance::from_document`], which checks every insertion rule up
//! front: ranges are ordered, image variables and dependency targets are
//! unique, image versions name declared images and every release falls in a
//! hot-fix range. Once built, an instance only changes through the
//! validator (hot-fix normalization and dependency repair) or
//! [`ProductInstance::create_release`].

use crate::document::{
    self, BoundsDocument, DependencyDocument, ImageDocument, InstanceDocument, ReleaseDocument,
};
use crate::error::{Error, Result};
use crate::range::VersionRange;
use crate::version::VersionIdentifier;
use serde::Serialize;
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info};

/// A declared image variable
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Image {
    pub variable: String,
    pub name: String,
}

/// A dependency of a release on another instance type
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dependency {
    pub instance_type: String,
    pub range: VersionRange,
}

impl Dependency {
    /// Product the dependency points at, taken from its lower bound
    pub fn product(&self) -> Option<&str> {
        self.range.product()
    }
}

/// One release of an instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Release {
    version: VersionIdentifier,
    pub(crate) is_final: bool,
    pub(crate) image_version: BTreeMap<String, VersionIdentifier>,
    pub(crate) dependencies: Vec<Dependency>,
}

impl Release {
    fn from_document(context: &str, doc: &ReleaseDocument) -> Result<Self> {
        let version = VersionIdentifier::parse(&doc.release_version)?;

        let mut image_version = BTreeMap::new();
        for (variable, value) in &doc.image_version {
            image_version.insert(variable.clone(), VersionIdentifier::parse(value)?);
        }

        let mut dependencies: Vec<Dependency> = Vec::with_capacity(doc.dependencies.len());
        for dep in &doc.dependencies {
            if dependencies.iter().any(|d| d.instance_type == dep.instance_type) {
                return Err(Error::duplicate(
                    "dependency",
                    &dep.instance_type,
                    format!("{} {}", context, version),
                ));
            }
            let range = VersionRange::parse(&dep.min_version, &dep.max_version).map_err(|e| match e {
                Error::Range { message, .. } => Error::range(
                    format!("dependency {} of {} {}", dep.instance_type, context, version),
                    message,
                ),
                other => other,
            })?;
            dependencies.push(Dependency {
                instance_type: dep.instance_type.clone(),
                range,
            });
        }

        Ok(Self {
            version,
            is_final: doc.is_final,
            image_version,
            dependencies,
        })
    }

    fn to_document(&self) -> ReleaseDocument {
        ReleaseDocument {
            release_version: self.version.to_string(),
            image_version: self
                .image_version
                .iter()
                .map(|(variable, version)| (variable.clone(), version.to_string()))
                .collect(),
            dependencies: self
                .dependencies
                .iter()
                .map(|dep| DependencyDocument {
                    instance_type: dep.instance_type.clone(),
                    min_version: dep.range.min().to_string(),
                    max_version: dep.range.max().to_string(),
                })
                .collect(),
            is_final: self.is_final,
        }
    }

    pub fn version(&self) -> &VersionIdentifier {
        &self.version
    }

    pub fn is_final(&self) -> bool {
        self.is_final
    }

    /// Image variable -> pinned image version
    pub fn image_version(&self) -> &BTreeMap<String, VersionIdentifier> {
        &self.image_version
    }

    pub fn dependencies(&self) -> &[Dependency] {
        &self.dependencies
    }

    /// Dependency on `instance_type`, if declared
    pub fn dependency(&self, instance_type: &str) -> Option<&Dependency> {
        self.dependencies
            .iter()
            .find(|dep| dep.instance_type == instance_type)
    }

    /// The release line, e.g. `transwarp-5.2` for `transwarp-5.2.0-final`
    pub fn anchor_version(&self) -> VersionIdentifier {
        self.version.anchor()
    }

    /// Copy of this release re-targeted at `target`.
    ///
    /// Values of the release's own product follow `target` exactly; other
    /// values are truncated to minor precision when `target` is minor-only.
    fn derive(&self, target: &VersionIdentifier) -> Self {
        let own = self.version.product();
        let minor_only = target.is_minor_only();

        let image_version = self
            .image_version
            .iter()
            .map(|(variable, version)| {
                let version = if version.product() == own {
                    target.clone()
                } else if minor_only {
                    version.truncate_to_minor()
                } else {
                    version.clone()
                };
                (variable.clone(), version)
            })
            .collect();

        let dependencies = self
            .dependencies
            .iter()
            .map(|dep| {
                let range = if dep.product() == own {
                    VersionRange::singleton(target.clone())
                } else if minor_only {
                    dep.range.truncate_to_minor()
                } else {
                    dep.range.clone()
                };
                Dependency {
                    instance_type: dep.instance_type.clone(),
                    range,
                }
            })
            .collect();

        Self {
            version: target.clone(),
            is_final: self.is_final && target.suffix.is_some(),
            image_version,
            dependencies,
        }
    }
}

/// A deployable component and its releases
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductInstance {
    pub instance_type: String,
    pub major_version: String,
    tdc_range: VersionRange,
    pub(crate) hot_fix_ranges: Vec<VersionRange>,
    images: Vec<Image>,
    pub(crate) releases: BTreeMap<VersionIdentifier, Release>,
}

impl ProductInstance {
    /// Build an instance, checking every insertion rule
    pub fn from_document(doc: &InstanceDocument) -> Result<Self> {
        let context = format!("{} {}", doc.instance_type, doc.major_version);

        let tdc_range = VersionRange::parse(&doc.min_tdc_version, &doc.max_tdc_version)
            .map_err(|e| match e {
                Error::Range { message, .. } => {
                    Error::range(format!("min-max tdc version of {}", context), message)
                }
                other => other,
            })?;

        let mut instance = Self {
            instance_type: doc.instance_type.clone(),
            major_version: doc.major_version.clone(),
            tdc_range,
            hot_fix_ranges: Vec::with_capacity(doc.hot_fix_ranges.len()),
            images: Vec::with_capacity(doc.images.len()),
            releases: BTreeMap::new(),
        };

        for bounds in &doc.hot_fix_ranges {
            instance.add_hot_fix_range(&bounds.min, &bounds.max)?;
        }
        for image in &doc.images {
            instance.add_image(&image.variable, &image.name)?;
        }
        for release in &doc.releases {
            let release = Release::from_document(&context, release)?;
            instance.add_release(release)?;
        }

        debug!(
            instance = %context,
            hot_fix_ranges = instance.hot_fix_ranges.len(),
            releases = instance.releases.len(),
            "Loaded product instance"
        );
        Ok(instance)
    }

    /// Load and build an instance from a YAML file
    pub fn load(path: &Path) -> Result<Self> {
        let doc = document::load_instance(path)?;
        Self::from_document(&doc)
    }

    /// Re-emit the instance, releases in ascending version order
    pub fn to_document(&self) -> InstanceDocument {
        InstanceDocument {
            instance_type: self.instance_type.clone(),
            major_version: self.major_version.clone(),
            min_tdc_version: self.tdc_range.min().to_string(),
            max_tdc_version: self.tdc_range.max().to_string(),
            hot_fix_ranges: self
                .hot_fix_ranges
                .iter()
                .map(|range| BoundsDocument {
                    min: range.min().to_string(),
                    max: range.max().to_string(),
                })
                .collect(),
            images: self
                .images
                .iter()
                .map(|image| ImageDocument {
                    variable: image.variable.clone(),
                    name: image.name.clone(),
                })
                .collect(),
            releases: self.releases.values().map(Release::to_document).collect(),
        }
    }

    /// `instance-type major-version`, used in messages
    pub fn label(&self) -> String {
        format!("{} {}", self.instance_type, self.major_version)
    }

    pub fn min_tdc_version(&self) -> &VersionIdentifier {
        self.tdc_range.min()
    }

    pub fn max_tdc_version(&self) -> &VersionIdentifier {
        self.tdc_range.max()
    }

    /// The `(min-tdc-version, max-tdc-version)` bound
    pub fn tdc_range(&self) -> &VersionRange {
        &self.tdc_range
    }

    pub fn hot_fix_ranges(&self) -> &[VersionRange] {
        &self.hot_fix_ranges
    }

    pub fn images(&self) -> &[Image] {
        &self.images
    }

    /// Releases keyed by version, ascending
    pub fn releases(&self) -> &BTreeMap<VersionIdentifier, Release> {
        &self.releases
    }

    /// Append a hot-fix range
    pub fn add_hot_fix_range(&mut self, min: &str, max: &str) -> Result<()> {
        let range = VersionRange::parse(min, max).map_err(|e| match e {
            Error::Range { message, .. } => {
                Error::range(format!("hot-fix range of {}", self.label()), message)
            }
            other => other,
        })?;
        self.hot_fix_ranges.push(range);
        Ok(())
    }

    /// Declare an image variable
    pub fn add_image(&mut self, variable: &str, name: &str) -> Result<()> {
        if self.images.iter().any(|image| image.variable == variable) {
            return Err(Error::duplicate("image variable", variable, self.label()));
        }
        self.images.push(Image {
            variable: variable.to_string(),
            name: name.to_string(),
        });
        Ok(())
    }

    /// Insert a release after checking images, hot-fix containment and uniqueness
    pub fn add_release(&mut self, release: Release) -> Result<&Release> {
        for variable in release.image_version.keys() {
            if !self.images.iter().any(|image| &image.variable == variable) {
                return Err(Error::validation(
                    format!("release {} of {}", release.version, self.label()),
                    format!("image variable {} should be declared first", variable),
                ));
            }
        }

        if !self
            .hot_fix_ranges
            .iter()
            .any(|range| range.contains(&release.version))
        {
            return Err(Error::validation(
                self.label(),
                format!(
                    "release version {} should be located in a specific hot-fix range",
                    release.version
                ),
            ));
        }

        let label = self.label();
        match self.releases.entry(release.version.clone()) {
            Entry::Occupied(entry) => Err(Error::duplicate(
                "release",
                entry.key().to_string(),
                label,
            )),
            Entry::Vacant(entry) => Ok(entry.insert(release)),
        }
    }

    /// Release with exactly `version`, if any
    pub fn get_release(&self, version: &VersionIdentifier) -> Option<&Release> {
        self.releases.get(version)
    }

    /// Releases sorted by version, descending when `reverse` is set
    pub fn ordered_releases(&self, reverse: bool) -> Vec<&Release> {
        if reverse {
            self.releases.values().rev().collect()
        } else {
            self.releases.values().collect()
        }
    }

    /// Latest final release of the given product
    pub fn latest_final_release(&self, product: Option<&str>) -> Option<&Release> {
        self.releases
            .values()
            .rev()
            .find(|release| release.is_final && release.version.product() == product)
    }

    /// Derive a release for `target` from `from`, or from the latest final
    /// release of `target`'s product, and insert it.
    pub fn create_release(
        &mut self,
        target: &VersionIdentifier,
        from: Option<&VersionIdentifier>,
    ) -> Result<&Release> {
        let reference = match from {
            Some(version) => self.get_release(version).ok_or_else(|| {
                Error::not_found(format!(
                    "reference release {} is not declared in {}",
                    version,
                    self.label()
                ))
            })?,
            None => self.latest_final_release(target.product()).ok_or_else(|| {
                Error::not_found(format!(
                    "no final release of {} in {} to derive {} from",
                    target.product().unwrap_or("<third-party>"),
                    self.label(),
                    target
                ))
            })?,
        };

        info!(
            instance = %self.label(),
            from = %reference.version,
            target = %target,
            "Creating release"
        );
        let derived = reference.derive(target);
        self.add_release(derived)
    }
}
