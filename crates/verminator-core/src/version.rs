//! Product version identifiers and their ordering
//!
//! A version string looks like `tdc-2.1.0.3-rc2`: an optional product
//! prefix, two to four numeric segments and an optional `rc`/`final`
//! suffix with an optional suffix number. Ordering is numeric per segment
//! and ranks suffixes `rc < final < none`, so an unsuffixed anchor version
//! sorts after every concrete release sharing its numbers.
//!
//! Copyright (c) 2025 Verminator Team
//! Licensed under the Apache-2.0 license

use crate::error::{Error, Result};
use regex::Regex;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use std::sync::OnceLock;

static VERSION_REGEX: OnceLock<Regex> = OnceLock::new();

fn version_regex() -> &'static Regex {
    VERSION_REGEX.get_or_init(|| {
        Regex::new(
            r"^(?:(?P<prefix>.+?)-)?(?P<numbers>[0-9]+(?:\.[0-9]+)*)(?:-(?P<suffix>[A-Za-z]+)(?P<suffix_version>[0-9]+)?)?$",
        )
        .expect("version pattern is a valid regex")
    })
}

/// Release suffix of a version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Suffix {
    /// Release candidate
    Rc,
    /// Final release
    Final,
}

impl Suffix {
    /// Rank of an optional suffix: `rc < final < none`
    pub fn rank(suffix: Option<Suffix>) -> u8 {
        match suffix {
            Some(Suffix::Rc) => 0,
            Some(Suffix::Final) => 1,
            None => 2,
        }
    }
}

impl fmt::Display for Suffix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Suffix::Rc => write!(f, "rc"),
            Suffix::Final => write!(f, "final"),
        }
    }
}

impl FromStr for Suffix {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "rc" => Ok(Suffix::Rc),
            "final" => Ok(Suffix::Final),
            other => Err(Error::parse(
                other,
                "unrecognized suffix, expected 'rc' or 'final'",
            )),
        }
    }
}

/// A structured product version
#[derive(Debug, Clone)]
pub struct VersionIdentifier {
    /// Product name; absent for third-party artifacts
    pub prefix: Option<String>,
    pub major: u32,
    pub minor: u32,
    pub maintenance: Option<u32>,
    pub build: Option<u32>,
    pub suffix: Option<Suffix>,
    pub suffix_version: Option<u32>,
}

/// Coordinate-wise difference of two versions
///
/// Compares lexicographically, so `delta >= VersionDelta::ZERO` means the
/// left operand was not smaller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct VersionDelta {
    pub major: i64,
    pub minor: i64,
    pub maintenance: i64,
    pub build: i64,
    pub suffix_rank: i64,
    pub suffix_version: i64,
}

impl VersionDelta {
    pub const ZERO: VersionDelta = VersionDelta {
        major: 0,
        minor: 0,
        maintenance: 0,
        build: 0,
        suffix_rank: 0,
        suffix_version: 0,
    };

    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }
}

impl VersionIdentifier {
    /// Create a minor-only version
    pub fn new(prefix: Option<&str>, major: u32, minor: u32) -> Self {
        Self {
            prefix: prefix.map(str::to_string),
            major,
            minor,
            maintenance: None,
            build: None,
            suffix: None,
            suffix_version: None,
        }
    }

    /// Parse a version string
    pub fn parse(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        let captures = version_regex()
            .captures(trimmed)
            .ok_or_else(|| Error::parse(input, "expected <prefix>-<major>.<minor>[.<maintenance>[.<build>]][-<suffix>]"))?;

        let numbers = captures
            .name("numbers")
            .map(|m| m.as_str())
            .unwrap_or_default();
        let segments = numbers
            .split('.')
            .map(|segment| {
                segment
                    .parse::<u32>()
                    .map_err(|e| Error::parse(input, format!("invalid numeric segment '{}': {}", segment, e)))
            })
            .collect::<Result<Vec<u32>>>()?;

        if segments.len() < 2 || segments.len() > 4 {
            return Err(Error::parse(
                input,
                format!("expected 2 to 4 numeric segments, found {}", segments.len()),
            ));
        }

        let suffix = captures
            .name("suffix")
            .map(|m| m.as_str().parse::<Suffix>())
            .transpose()
            .map_err(|_| Error::parse(input, "unrecognized suffix, expected 'rc' or 'final'"))?;

        let suffix_version = captures
            .name("suffix_version")
            .map(|m| {
                m.as_str()
                    .parse::<u32>()
                    .map_err(|e| Error::parse(input, format!("invalid suffix number: {}", e)))
            })
            .transpose()?;

        Ok(Self {
            prefix: captures.name("prefix").map(|m| m.as_str().to_string()),
            major: segments[0],
            minor: segments[1],
            maintenance: segments.get(2).copied(),
            build: segments.get(3).copied(),
            suffix,
            suffix_version,
        })
    }

    /// Product name embedded in the version
    pub fn product(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    /// Whether both versions belong to the same product
    pub fn same_product(&self, other: &VersionIdentifier) -> bool {
        self.prefix == other.prefix
    }

    /// True iff maintenance, build, suffix and suffix version are all absent
    pub fn is_minor_only(&self) -> bool {
        self.maintenance.is_none()
            && self.build.is_none()
            && self.suffix.is_none()
            && self.suffix_version.is_none()
    }

    /// Copy with maintenance, build and suffix cleared
    pub fn truncate_to_minor(&self) -> Self {
        Self::new(self.product(), self.major, self.minor)
    }

    /// The release line this version belongs to, e.g. `transwarp-5.2` for `transwarp-5.2.0-final`
    pub fn anchor(&self) -> Self {
        self.truncate_to_minor()
    }

    /// Copy with the build number incremented by one, `None` at `u32::MAX`
    pub fn step_build(&self) -> Option<Self> {
        let build = self.build.unwrap_or(0).checked_add(1)?;
        Some(Self {
            maintenance: Some(self.maintenance.unwrap_or(0)),
            build: Some(build),
            ..self.clone()
        })
    }

    /// Coordinate-wise `self - other`, optionally ignoring the suffix fields
    pub fn coordinate_delta(&self, other: &VersionIdentifier, ignore_suffix: bool) -> VersionDelta {
        let diff = |a: u32, b: u32| i64::from(a) - i64::from(b);
        let mut delta = VersionDelta {
            major: diff(self.major, other.major),
            minor: diff(self.minor, other.minor),
            maintenance: diff(self.maintenance.unwrap_or(0), other.maintenance.unwrap_or(0)),
            build: diff(self.build.unwrap_or(0), other.build.unwrap_or(0)),
            ..VersionDelta::ZERO
        };
        if !ignore_suffix {
            delta.suffix_rank = diff(
                u32::from(Suffix::rank(self.suffix)),
                u32::from(Suffix::rank(other.suffix)),
            );
            delta.suffix_version = diff(
                self.suffix_version.unwrap_or(0),
                other.suffix_version.unwrap_or(0),
            );
        }
        delta
    }

    /// Copy carrying `prefix` instead of the current one
    pub fn with_prefix(&self, prefix: Option<&str>) -> Self {
        Self {
            prefix: prefix.map(str::to_string),
            ..self.clone()
        }
    }

    fn sort_key(&self) -> (Option<&str>, u32, u32, u32, u32, u8, u32) {
        (
            self.prefix.as_deref(),
            self.major,
            self.minor,
            self.maintenance.unwrap_or(0),
            self.build.unwrap_or(0),
            Suffix::rank(self.suffix),
            self.suffix_version.unwrap_or(0),
        )
    }
}

impl fmt::Display for VersionIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref prefix) = self.prefix {
            write!(f, "{}-", prefix)?;
        }
        write!(f, "{}.{}", self.major, self.minor)?;
        if self.maintenance.is_some() || self.build.is_some() {
            write!(f, ".{}", self.maintenance.unwrap_or(0))?;
        }
        if let Some(build) = self.build {
            write!(f, ".{}", build)?;
        }
        if let Some(suffix) = self.suffix {
            write!(f, "-{}", suffix)?;
            if let Some(number) = self.suffix_version {
                write!(f, "{}", number)?;
            }
        }
        Ok(())
    }
}

impl FromStr for VersionIdentifier {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl PartialEq for VersionIdentifier {
    fn eq(&self, other: &Self) -> bool {
        self.sort_key() == other.sort_key()
    }
}

impl Eq for VersionIdentifier {}

impl Hash for VersionIdentifier {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.sort_key().hash(state);
    }
}

impl PartialOrd for VersionIdentifier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for VersionIdentifier {
    fn cmp(&self, other: &Self) -> Ordering {
        self.sort_key().cmp(&other.sort_key())
    }
}

impl Serialize for VersionIdentifier {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

struct VersionVisitor;

impl<'de> Visitor<'de> for VersionVisitor {
    type Value = VersionIdentifier;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "a version string such as 'tdc-1.0.0-final'")
    }

    fn visit_str<E: de::Error>(self, value: &str) -> std::result::Result<Self::Value, E> {
        VersionIdentifier::parse(value).map_err(E::custom)
    }

    // Unquoted `1.10` in YAML arrives as the float 1.1; the digits are gone
    fn visit_f64<E: de::Error>(self, value: f64) -> std::result::Result<Self::Value, E> {
        Err(E::custom(format!(
            "unquoted number {} is not a version; quote it",
            value
        )))
    }
}

impl<'de> Deserialize<'de> for VersionIdentifier {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_any(VersionVisitor)
    }
}
