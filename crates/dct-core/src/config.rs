use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{DctError, DctResult};

/// Configuration for the mapping normalizer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizeConfig {
    /// String used to join nested keys into compound keys.
    pub separator: String,
    /// Omit entries whose value is `null`.
    pub drop_none: bool,
}

impl Default for NormalizeConfig {
    fn default() -> Self {
        Self {
            separator: ".".into(),
            drop_none: false,
        }
    }
}

impl NormalizeConfig {
    /// Default configuration with a custom separator.
    pub fn with_separator(separator: impl Into<String>) -> Self {
        Self {
            separator: separator.into(),
            ..Default::default()
        }
    }

    /// Parse and validate a TOML document. Missing fields take their defaults.
    ///
    /// ```
    /// use dct_core::NormalizeConfig;
    ///
    /// let config = NormalizeConfig::from_toml_str("separator = \"__\"").unwrap();
    /// assert_eq!(config.separator, "__");
    /// assert!(!config.drop_none);
    /// ```
    pub fn from_toml_str(source: &str) -> DctResult<Self> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn from_path(path: impl AsRef<Path>) -> DctResult<Self> {
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }

    /// Reject values the normalizer cannot work with.
    pub fn validate(&self) -> DctResult<()> {
        if self.separator.is_empty() {
            return Err(DctError::InvalidConfig(
                "separator must not be empty".into(),
            ));
        }
        Ok(())
    }
}
