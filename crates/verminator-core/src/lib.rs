//! Verminator Core - version algebra and compatibility validation
//!
//! This crate parses structured product versions, merges and intersects
//! version ranges, answers compatibility queries against a release matrix
//! and validates (and repairs) per-instance release declarations.
//!
//! # Main Components
//!
//! - **Versions**: [`VersionIdentifier`] with its domain-specific ordering (`rc < final < none`)
//! - **Range algebra**: [`VersionRange`], [`filter_range`] and [`merge_ranges`] in soft or hard mode
//! - **Release matrix**: [`ReleaseCompatibilityMeta`] and its compatibility queries
//! - **Instances**: [`ProductInstance`] built from documents, plus release cloning
//! - **Validation**: [`InstanceValidator`] returning a [`ValidationReport`]
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use verminator_core::{
//!     InstanceValidator, ProductInstance, ReleaseCompatibilityMeta, Result, Settings,
//!     ValidatorOptions,
//! };
//!
//! fn example() -> Result<()> {
//!     let settings = Settings::from_env();
//!     let meta = ReleaseCompatibilityMeta::load(Path::new("releases_meta.yml"), settings.clone())?;
//!     let instance = ProductInstance::load(Path::new("tool/1.0/tool.yml"))?;
//!     let report = InstanceValidator::new(&meta, settings, ValidatorOptions::default())
//!         .validate(instance)?;
//!     for warning in &report.warnings {
//!         println!("{}", warning);
//!     }
//!     Ok(())
//! }
//! ```

pub mod document;
pub mod error;
pub mod instance;
pub mod range;
pub mod release_meta;
pub mod settings;
pub mod validator;
pub mod version;

mod proptest_strategies;

// Re-export main types for convenience
pub use error::{Error, ErrorKind, Result};
pub use instance::{Dependency, Image, ProductInstance, Release};
pub use range::{containment, filter_range, merge_ranges, MergeMode, VersionRange};
pub use release_meta::{CompatibleVersions, ReleaseCompatibilityMeta};
pub use settings::{Settings, DEFAULT_OEM_NAME};
pub use validator::{InstanceValidator, ValidationReport, ValidationWarning, ValidatorOptions};
pub use version::{Suffix, VersionDelta, VersionIdentifier};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
