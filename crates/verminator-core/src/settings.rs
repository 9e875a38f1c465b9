//! Process-wide settings passed explicitly to the matrix and validator

use serde::{Deserialize, Serialize};

/// Name of the platform product when nothing else is configured
pub const DEFAULT_OEM_NAME: &str = "tdc";

/// Explicit context for a validation run.
///
/// The self product is the distribution identifier against which every
/// other product declares compatibility.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Product prefix of the distribution itself
    pub oem_name: String,
}

impl Settings {
    /// Create settings for the given self product
    pub fn new(oem_name: impl Into<String>) -> Self {
        Self {
            oem_name: oem_name.into(),
        }
    }

    /// Build settings from `OEM_NAME`, falling back to the default when unset or empty
    pub fn from_env() -> Self {
        match std::env::var("OEM_NAME") {
            Ok(name) if !name.trim().is_empty() => Self::new(name.trim()),
            _ => Self::default(),
        }
    }

    /// Whether `product` is the self product
    pub fn is_self_product(&self, product: Option<&str>) -> bool {
        product == Some(self.oem_name.as_str())
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::new(DEFAULT_OEM_NAME)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_self_product() {
        let settings = Settings::default();
        assert!(settings.is_self_product(Some("tdc")));
        assert!(!settings.is_self_product(Some("tool")));
        assert!(!settings.is_self_product(None));
    }
}
