//! TOML run configuration.
//!
//! Every field is optional; missing sections and keys fall back to defaults,
//! so a partial file such as
//!
//! ```toml
//! [network]
//! proxy = "http://127.0.0.1:7890"
//! ```
//!
//! is a valid configuration.

use crate::{RankError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::warn;

/// On-disk configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub network: NetworkConfig,
    pub data: DataConfig,
    pub cache: CacheConfig,
    pub dedupe: DedupeConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Per-request timeout
    pub timeout_secs: u64,
    /// Pause before every network attempt
    pub sleep_interval_secs: u64,
    /// Proxy URL; requests fall back to a direct connection if it fails
    pub proxy: Option<String>,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 120,
            sleep_interval_secs: 3,
            proxy: None,
        }
    }
}

/// Catalog file locations. A missing file leaves that catalog unavailable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    pub ccf_file: Option<PathBuf>,
    pub cas_file: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub path: PathBuf,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("cache/dblp_cache.json"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DedupeConfig {
    /// Journal name that marks a preprint
    pub preprint_marker: String,
}

impl Default for DedupeConfig {
    fn default() -> Self {
        Self {
            preprint_marker: "CoRR".to_string(),
        }
    }
}

impl Config {
    /// Parses a configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads a configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid TOML.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    /// Loads a configuration file, falling back to defaults on any failure.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            return Self::default();
        }
        Self::from_path(path).unwrap_or_else(|e| {
            warn!(path = %path.display(), error = %e, "ignoring unusable config file");
            Self::default()
        })
    }

    fn validate(&self) -> Result<()> {
        if self.network.timeout_secs == 0 {
            return Err(RankError::Config("network.timeout_secs must be positive".to_string()));
        }
        if self.dedupe.preprint_marker.trim().is_empty() {
            return Err(RankError::Config("dedupe.preprint_marker must not be empty".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.network.timeout_secs, 120);
        assert_eq!(config.network.sleep_interval_secs, 3);
        assert_eq!(config.network.proxy, None);
        assert_eq!(config.cache.path, PathBuf::from("cache/dblp_cache.json"));
        assert_eq!(config.dedupe.preprint_marker, "CoRR");
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let config = Config::from_toml_str(
            r#"
[network]
proxy = "http://127.0.0.1:7890"

[data]
ccf_file = "data/ccf.csv"
"#,
        )
        .unwrap();

        assert_eq!(config.network.proxy.as_deref(), Some("http://127.0.0.1:7890"));
        assert_eq!(config.network.timeout_secs, 120);
        assert_eq!(config.data.ccf_file, Some(PathBuf::from("data/ccf.csv")));
        assert_eq!(config.data.cas_file, None);
        assert_eq!(config.dedupe, DedupeConfig::default());
    }

    #[test]
    fn test_empty_config() {
        assert_eq!(Config::from_toml_str("").unwrap(), Config::default());
    }

    #[test]
    fn test_invalid_values_rejected() {
        let result = Config::from_toml_str("[network]\ntimeout_secs = 0\n");
        assert!(matches!(result, Err(RankError::Config(_))));

        let result = Config::from_toml_str("[network]\ntimeout_secs = \"soon\"\n");
        assert!(matches!(result, Err(RankError::Config(_))));
    }

    #[test]
    fn test_from_path_and_fallback() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[cache]\npath = \"/tmp/venues.json\"").unwrap();
        let config = Config::from_path(file.path()).unwrap();
        assert_eq!(config.cache.path, PathBuf::from("/tmp/venues.json"));

        let mut broken = NamedTempFile::new().unwrap();
        writeln!(broken, "[cache\npath = ").unwrap();
        assert!(Config::from_path(broken.path()).is_err());
        assert_eq!(Config::load_or_default(broken.path()), Config::default());
        assert_eq!(Config::load_or_default("/nonexistent/venuerank.toml"), Config::default());
    }
}
