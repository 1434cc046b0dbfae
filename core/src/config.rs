//! Client configuration loaded from TOML.
//!
//! ```toml
//! base = "http://localhost:9090"
//! blacklist = ["/blocked"]
//!
//! [headers]
//! authorization = "Bearer token"
//! ```
//!
//! Interceptors are code-only; the file seeds the base URL, default headers
//! and blacklist entries.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::ConfigError;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL joined onto relative targets. Empty disables joining.
    pub base: String,
    /// Default headers, filled into every dispatch the caller leaves unset.
    pub headers: BTreeMap<String, String>,
    /// Targets whose dispatch is cancelled before reaching the network.
    pub blacklist: Vec<String>,
}

impl ClientConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: ClientConfig = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&raw)
    }

    /// A non-empty base must parse as an absolute URL.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.base.is_empty() {
            Url::parse(&self.base)?;
        }
        Ok(())
    }
}
