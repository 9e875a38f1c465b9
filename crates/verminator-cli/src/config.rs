//! Configuration management for the CLI
//!
//! This module handles loading and merging configuration from:
//! - Default values
//! - Configuration files (YAML/JSON)
//! - Environment variables
//! - Command-line arguments

use crate::error::{Error, Result};
use crate::logging::LoggingConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use verminator_core::{Settings, ValidatorOptions, DEFAULT_OEM_NAME};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Product prefix of the distribution itself
    pub oem_name: String,

    /// Release matrix used when `--meta` is not given
    pub meta_file: Option<PathBuf>,

    /// Accept minor-only and full-precision hot-fix ranges in one instance
    pub allow_mixed_precision: bool,

    /// Warn when a self-product release depends on another product line
    pub warn_cross_product: bool,

    /// Output settings
    pub output: OutputConfig,

    /// Logging settings
    pub logging: LoggingConfig,
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Use colored output by default
    pub color: bool,

    /// Show progress indicators
    pub progress: bool,
}

impl Default for Config {
    fn default() -> Self {
        let options = ValidatorOptions::default();
        Self {
            oem_name: DEFAULT_OEM_NAME.to_string(),
            meta_file: None,
            allow_mixed_precision: options.allow_mixed_precision,
            warn_cross_product: options.warn_cross_product,
            output: OutputConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            color: true,
            progress: true,
        }
    }
}

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|s| s.to_str()),
        Some("yaml") | Some("yml")
    )
}

impl Config {
    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path)?;

        let config: Config = if is_yaml(path) {
            serde_yaml::from_str(&content)?
        } else {
            serde_json::from_str(&content)?
        };

        if config.oem_name.trim().is_empty() {
            return Err(Error::config(format!(
                "oem_name must not be empty in {}",
                path.display()
            )));
        }
        Ok(config)
    }

    /// Load configuration from default locations
    pub fn load() -> Result<Self> {
        for path in &Self::default_config_paths() {
            if path.exists() {
                match Self::from_file(path) {
                    Ok(config) => {
                        tracing::debug!(path = %path.display(), "Loaded configuration");
                        return Ok(config);
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {}: {}", path.display(), e);
                    }
                }
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file or default locations,
    /// then apply environment overrides
    pub fn load_with_file(file: Option<&Path>) -> Result<Self> {
        let mut config = if let Some(path) = file {
            Self::from_file(path)?
        } else {
            Self::load()?
        };
        config.apply_env();
        Ok(config)
    }

    /// `OEM_NAME` overrides `oem_name` when set and non-empty
    pub fn apply_env(&mut self) {
        if let Ok(name) = std::env::var("OEM_NAME") {
            if !name.trim().is_empty() {
                self.oem_name = name.trim().to_string();
            }
        }
    }

    /// Get default configuration file paths to check
    fn default_config_paths() -> Vec<PathBuf> {
        let mut paths = vec![
            PathBuf::from(".verminator.yaml"),
            PathBuf::from(".verminator.json"),
        ];

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("verminator").join("config.yaml"));
        }

        if let Some(home_dir) = dirs::home_dir() {
            paths.push(home_dir.join(".verminator.yaml"));
        }

        paths
    }

    /// Settings handed to the core library
    pub fn settings(&self) -> Settings {
        Settings::new(self.oem_name.clone())
    }

    /// Validator options from the configured policy switches
    pub fn validator_options(&self) -> ValidatorOptions {
        ValidatorOptions {
            allow_mixed_precision: self.allow_mixed_precision,
            warn_cross_product: self.warn_cross_product,
        }
    }

    /// Release matrix path: the explicit one, else the configured one
    pub fn resolve_meta_file(&self, explicit: Option<&Path>) -> Result<PathBuf> {
        explicit
            .map(Path::to_path_buf)
            .or_else(|| self.meta_file.clone())
            .ok_or_else(|| {
                Error::invalid_args("no release matrix given; pass --meta or set meta_file in the config")
            })
    }
}
