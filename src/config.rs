//! Application configuration
//!
//! Resolution order: built-in defaults, then `~/.countrypop/config.json`
//! (or an explicit `--config` path), then CLI flags / environment.

use crate::types::{CountryError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_COUNTRIESNOW_URL: &str = "https://countriesnow.space/api/v0.1";
pub const DEFAULT_RESTCOUNTRIES_URL: &str = "https://restcountries.com/v3.1";
pub const DEFAULT_POPULATION_URL: &str = "https://countriesnow.space/api/v0.1/countries/population";

/// HTTP request timeout in seconds
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

/// Cache TTL in seconds (1 hour)
const DEFAULT_CACHE_TTL_SECS: u64 = 3600;

/// Which upstream line-up to aggregate from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Profile {
    /// Capitals + flags
    Basic,
    /// Capitals + flags + population summed from city counts
    #[default]
    Standard,
    /// REST Countries (capitals fallback) + UN population + region info
    Extended,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub profile: Profile,
    pub countriesnow_url: String,
    pub restcountries_url: String,
    pub population_url: String,
    pub request_timeout_secs: u64,
    /// `None` keeps cache entries for the process lifetime
    pub cache_ttl_secs: Option<u64>,
    /// Drop countries no source could give a population for
    pub require_population: bool,
    /// Fetch supplements concurrently before merging
    pub parallel_fanout: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            profile: Profile::default(),
            countriesnow_url: DEFAULT_COUNTRIESNOW_URL.to_string(),
            restcountries_url: DEFAULT_RESTCOUNTRIES_URL.to_string(),
            population_url: DEFAULT_POPULATION_URL.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            cache_ttl_secs: Some(DEFAULT_CACHE_TTL_SECS),
            require_population: false,
            parallel_fanout: true,
        }
    }
}

impl AppConfig {
    /// Load from an explicit path, or from the default path when it exists.
    ///
    /// An explicit path that does not exist is an error; a missing default
    /// file just means defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let config = match explicit {
            Some(path) => Self::load_file(path)?,
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::load_file(&path)?,
                _ => Self::default(),
            },
        };
        config.validate()?;
        Ok(config)
    }

    /// Default config path (~/.countrypop/config.json)
    pub fn default_path() -> Option<PathBuf> {
        let home = directories::BaseDirs::new()?.home_dir().to_path_buf();
        Some(home.join(".countrypop").join("config.json"))
    }

    fn load_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| CountryError::Parse(format!("Invalid config {}: {}", path.display(), e)))
    }

    pub fn validate(&self) -> Result<()> {
        if self.request_timeout_secs == 0 {
            return Err(CountryError::Config(
                "request_timeout_secs must be greater than 0".into(),
            ));
        }
        for (key, url) in [
            ("countriesnow_url", &self.countriesnow_url),
            ("restcountries_url", &self.restcountries_url),
            ("population_url", &self.population_url),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(CountryError::Config(format!(
                    "{} must be an http(s) URL, got {:?}",
                    key, url
                )));
            }
        }
        Ok(())
    }

    pub fn cache_ttl(&self) -> Option<Duration> {
        self.cache_ttl_secs.map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_config(dir: &TempDir, content: &str) -> PathBuf {
        let path = dir.path().join("config.json");
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.profile, Profile::Standard);
        assert_eq!(config.request_timeout_secs, 10);
        assert_eq!(config.cache_ttl(), Some(Duration::from_secs(3600)));
        assert!(config.parallel_fanout);
        assert!(!config.require_population);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_partial_file_keeps_defaults() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, r#"{"profile":"extended","request_timeout_secs":3}"#);

        let config = AppConfig::load(Some(&path)).unwrap();
        assert_eq!(config.profile, Profile::Extended);
        assert_eq!(config.request_timeout_secs, 3);
        assert_eq!(config.countriesnow_url, DEFAULT_COUNTRIESNOW_URL);
    }

    #[test]
    fn test_load_null_ttl_means_no_expiry() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, r#"{"cache_ttl_secs":null}"#);

        let config = AppConfig::load(Some(&path)).unwrap();
        assert_eq!(config.cache_ttl(), None);
    }

    #[test]
    fn test_load_missing_explicit_file_is_error() {
        let dir = TempDir::new().unwrap();
        let result = AppConfig::load(Some(&dir.path().join("nope.json")));
        assert!(matches!(result, Err(CountryError::Io(_))));
    }

    #[test]
    fn test_load_corrupt_file_is_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "not valid json{{{");
        let result = AppConfig::load(Some(&path));
        assert!(matches!(result, Err(CountryError::Parse(_))));
    }

    #[test]
    fn test_unknown_profile_rejected() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, r#"{"profile":"maximal"}"#);
        assert!(AppConfig::load(Some(&path)).is_err());
    }

    #[test]
    fn test_zero_timeout_invalid() {
        let config = AppConfig {
            request_timeout_secs: 0,
            ..AppConfig::default()
        };
        assert!(matches!(config.validate(), Err(CountryError::Config(_))));
    }

    #[test]
    fn test_non_http_url_invalid() {
        let config = AppConfig {
            population_url: "ftp://example.com/pop".into(),
            ..AppConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("population_url"));
    }
}
