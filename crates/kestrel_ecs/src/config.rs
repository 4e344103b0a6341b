//! # Registry Configuration
//!
//! Sizing hints read from TOML:
//!
//! ```toml
//! expected_entities = 4096
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{EcsError, EcsResult};

fn default_expected_entities() -> usize {
    1024
}

/// Registry sizing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegistryConfig {
    /// Entity count every table and pool is pre-sized for.
    #[serde(default = "default_expected_entities")]
    pub expected_entities: usize,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            expected_entities: default_expected_entities(),
        }
    }
}

impl RegistryConfig {
    /// Parses a config from TOML text. Missing keys take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::InvalidConfig`] if the text is not valid TOML or
    /// has unknown or mistyped keys.
    pub fn from_toml_str(text: &str) -> EcsResult<Self> {
        toml::from_str(text).map_err(|e| EcsError::InvalidConfig(e.to_string()))
    }

    /// Reads and parses a config file.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::InvalidConfig`] if the file cannot be read or
    /// parsed.
    pub fn load(path: impl AsRef<Path>) -> EcsResult<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .map_err(|e| EcsError::InvalidConfig(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }
}
