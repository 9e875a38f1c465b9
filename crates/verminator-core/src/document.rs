//! YAML document shapes for the release matrix and instance files
//!
//! The structs here mirror the documents field for field, with versions
//! kept as raw strings. Typed construction and validation happen in
//! [`crate::release_meta`] and [`crate::instance`], so a malformed version
//! surfaces as a typed [`Error`] rather than a serde message.
//!
//! Copyright (c) 2025 Verminator Team
//! Licensed under the Apache-2.0 license

use crate::error::{Error, Result};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// File names of the release matrix, skipped when discovering instances
pub const META_FILE_NAMES: &[&str] = &["releases_meta.yml", "releases_meta.yaml"];

/// The global release matrix
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseMatrixDocument {
    #[serde(rename = "Releases", default)]
    pub releases: Vec<ReleaseEntryDocument>,
}

/// One platform release and the product ranges it certifies
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseEntryDocument {
    #[serde(deserialize_with = "scalar_string")]
    pub release_name: String,
    #[serde(default)]
    pub products: Vec<BoundsDocument>,
}

/// A `{min, max}` pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundsDocument {
    #[serde(deserialize_with = "scalar_string")]
    pub min: String,
    #[serde(deserialize_with = "scalar_string")]
    pub max: String,
}

/// A per-instance document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct InstanceDocument {
    pub instance_type: String,
    #[serde(deserialize_with = "scalar_string")]
    pub major_version: String,
    #[serde(deserialize_with = "scalar_string")]
    pub min_tdc_version: String,
    #[serde(deserialize_with = "scalar_string")]
    pub max_tdc_version: String,
    #[serde(default)]
    pub hot_fix_ranges: Vec<BoundsDocument>,
    #[serde(default)]
    pub images: Vec<ImageDocument>,
    #[serde(default)]
    pub releases: Vec<ReleaseDocument>,
}

/// An image variable and the image it names
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageDocument {
    pub variable: String,
    pub name: String,
}

/// One release of an instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ReleaseDocument {
    #[serde(deserialize_with = "scalar_string")]
    pub release_version: String,
    #[serde(default, deserialize_with = "scalar_map")]
    pub image_version: BTreeMap<String, String>,
    #[serde(default)]
    pub dependencies: Vec<DependencyDocument>,
    #[serde(rename = "final", default)]
    pub is_final: bool,
}

/// A dependency on another instance type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct DependencyDocument {
    #[serde(rename = "type")]
    pub instance_type: String,
    #[serde(deserialize_with = "scalar_string")]
    pub min_version: String,
    #[serde(deserialize_with = "scalar_string")]
    pub max_version: String,
}

/// Marks the deserialization error raised for an unquoted float version
const UNQUOTED_NUMBER: &str = "unquoted number";

fn scalar_to_string<E: serde::de::Error>(value: serde_yaml::Value) -> std::result::Result<String, E> {
    match value {
        serde_yaml::Value::String(s) => Ok(s),
        // `1.10` would come back as `1.1`
        serde_yaml::Value::Number(n) if n.is_f64() => Err(E::custom(format!(
            "{} {} cannot be read as a version without losing digits; quote it",
            UNQUOTED_NUMBER, n
        ))),
        serde_yaml::Value::Number(n) => Ok(n.to_string()),
        serde_yaml::Value::Bool(b) => Ok(b.to_string()),
        other => Err(E::custom(format!("expected a scalar, found {:?}", other))),
    }
}

// Unquoted integers in YAML are numbers; versions and major versions are text
fn scalar_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    scalar_to_string(serde_yaml::Value::deserialize(deserializer)?)
}

fn scalar_map<'de, D>(deserializer: D) -> std::result::Result<BTreeMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = BTreeMap::<String, serde_yaml::Value>::deserialize(deserializer)?;
    raw.into_iter()
        .map(|(key, value)| Ok((key, scalar_to_string(value)?)))
        .collect()
}

/// Parse a release matrix from YAML text; `path` is used for error context
pub fn parse_release_matrix(content: &str, path: &Path) -> Result<ReleaseMatrixDocument> {
    serde_yaml::from_str(content).map_err(|e| document_error(path, e))
}

/// Parse an instance document from YAML text; `path` is used for error context
pub fn parse_instance(content: &str, path: &Path) -> Result<InstanceDocument> {
    serde_yaml::from_str(content).map_err(|e| document_error(path, e))
}

/// An unquoted float version is a parse error, anything else a YAML error
fn document_error(path: &Path, error: serde_yaml::Error) -> Error {
    let message = error.to_string();
    match message.find(UNQUOTED_NUMBER) {
        Some(at) => {
            let number = message[at + UNQUOTED_NUMBER.len()..]
                .split_whitespace()
                .next()
                .unwrap_or_default()
                .to_string();
            Error::parse(number, format!("{} in {}", message, path.display()))
        }
        None => Error::yaml(path, error),
    }
}

/// Read and parse a release matrix file
pub fn load_release_matrix(path: &Path) -> Result<ReleaseMatrixDocument> {
    debug!(path = %path.display(), "Loading release matrix");
    let content = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    parse_release_matrix(&content, path)
}

/// Read and parse an instance file
pub fn load_instance(path: &Path) -> Result<InstanceDocument> {
    debug!(path = %path.display(), "Loading instance document");
    let content = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    parse_instance(&content, path)
}

/// Render an instance document as YAML
pub fn instance_to_yaml(document: &InstanceDocument) -> Result<String> {
    serde_yaml::to_string(document).map_err(|e| Error::yaml("<instance>", e))
}

/// Write an instance document to `path`
pub fn save_instance(path: &Path, document: &InstanceDocument) -> Result<()> {
    let content = serde_yaml::to_string(document).map_err(|e| Error::yaml(path, e))?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }
    fs::write(path, content).map_err(|e| Error::io(path, e))
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(|name| name.starts_with('.') && name != "." && name != "..")
        .unwrap_or(false)
}

fn is_instance_file(path: &Path) -> bool {
    let is_yaml = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| matches!(ext.to_lowercase().as_str(), "yml" | "yaml"))
        .unwrap_or(false);
    let is_meta = path
        .file_name()
        .and_then(|name| name.to_str())
        .map(|name| META_FILE_NAMES.contains(&name))
        .unwrap_or(false);
    is_yaml && !is_meta
}

/// Find instance files under `root`.
///
/// A file argument is returned as is. Directories are walked recursively,
/// skipping hidden entries and the release matrix; results are sorted.
pub fn discover_instance_files(root: &Path) -> Result<Vec<PathBuf>> {
    if root.is_file() {
        return Ok(vec![root.to_path_buf()]);
    }
    if !root.exists() {
        return Err(Error::io(
            root,
            std::io::Error::new(std::io::ErrorKind::NotFound, "no such file or directory"),
        ));
    }

    let mut files = Vec::new();
    let walker = WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || !is_hidden(entry.path()));
    for entry in walker {
        let entry = entry.map_err(|e| {
            let path = e.path().map(Path::to_path_buf).unwrap_or_else(|| root.to_path_buf());
            Error::io(path, std::io::Error::from(e))
        })?;
        let path = entry.path();
        if entry.file_type().is_file() && is_instance_file(path) {
            files.push(path.to_path_buf());
        }
    }
    files.sort();
    debug!(root = %root.display(), count = files.len(), "Discovered instance files");
    Ok(files)
}
