//! Comparer configuration, loaded from TOML.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ExprError;
use crate::infrastructure::cache::DEFAULT_PURGE_THRESHOLD;

/// Settings of an [`ExpressionEqualityComparer`](crate::application::ExpressionEqualityComparer).
///
/// ```toml
/// cache_hash_codes = true
/// purge_threshold = 4096
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComparerConfig {
    /// Remember root hashes by identity.
    pub cache_hash_codes: bool,
    /// Cache inserts between sweeps of dead entries.
    pub purge_threshold: usize,
}

impl Default for ComparerConfig {
    fn default() -> Self {
        Self {
            cache_hash_codes: true,
            purge_threshold: DEFAULT_PURGE_THRESHOLD,
        }
    }
}

impl ComparerConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ExprError> {
        Ok(toml::from_str(content)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ExprError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ExprError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&content)?;
        debug!(path = %path.display(), ?config, "loaded comparer configuration");
        Ok(config)
    }
}
