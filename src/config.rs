use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

use crate::client::DEFAULT_ENDPOINT;

const APP_DIR: &str = "scenario-tui";
const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_file: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ping_on_start: Option<bool>,
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let config_content = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&config_content)
            .map_err(|e| anyhow!("Invalid config file {}: {}", path.display(), e))?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Create config directory if it doesn't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let config_content = serde_json::to_string_pretty(self)?;
        fs::write(path, config_content)?;
        Ok(())
    }

    /// Command-line values win over the file.
    pub fn with_overrides(
        mut self,
        endpoint: Option<String>,
        log_file: Option<PathBuf>,
        log_level: Option<String>,
        no_ping: bool,
    ) -> Self {
        if endpoint.is_some() {
            self.endpoint = endpoint;
        }
        if log_file.is_some() {
            self.log_file = log_file;
        }
        if log_level.is_some() {
            self.log_level = log_level;
        }
        if no_ping {
            self.ping_on_start = Some(false);
        }
        self
    }

    pub fn endpoint(&self) -> &str {
        self.endpoint.as_deref().unwrap_or(DEFAULT_ENDPOINT)
    }

    pub fn log_level(&self) -> &str {
        self.log_level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL)
    }

    pub fn ping_on_start(&self) -> bool {
        self.ping_on_start.unwrap_or(true)
    }

    pub fn log_file(&self) -> Result<PathBuf> {
        if let Some(path) = &self.log_file {
            return Ok(path.clone());
        }
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow!("Could not determine cache directory"))?;

        Ok(cache_dir.join(APP_DIR).join("scenario.log"))
    }

    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join(APP_DIR).join("config.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("config.json")).unwrap();

        assert_eq!(config, Config::default());
        assert_eq!(config.endpoint(), DEFAULT_ENDPOINT);
        assert_eq!(config.log_level(), "info");
        assert!(config.ping_on_start());
    }

    #[test]
    fn test_partial_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{ "endpoint": "http://example.test:9000/generate" }"#).unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.endpoint(), "http://example.test:9000/generate");
        assert!(config.log_file.is_none());
        assert!(config.ping_on_start());
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();

        assert!(Config::load_from(&path).is_err());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let config = Config {
            endpoint: Some("http://10.0.0.2:8080/generate".to_string()),
            log_file: Some(PathBuf::from("/tmp/scenario.log")),
            log_level: Some("debug".to_string()),
            ping_on_start: Some(false),
        };

        config.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_overrides_take_precedence() {
        let file = Config {
            endpoint: Some("http://from-file/generate".to_string()),
            log_level: Some("warn".to_string()),
            ..Config::default()
        };

        let config = file.clone().with_overrides(
            Some("http://from-cli/generate".to_string()),
            None,
            None,
            true,
        );
        assert_eq!(config.endpoint(), "http://from-cli/generate");
        assert_eq!(config.log_level(), "warn");
        assert!(!config.ping_on_start());

        let untouched = file.clone().with_overrides(None, None, None, false);
        assert_eq!(untouched, file);
    }

    #[test]
    fn test_explicit_log_file() {
        let config = Config {
            log_file: Some(PathBuf::from("/var/tmp/s.log")),
            ..Config::default()
        };
        assert_eq!(config.log_file().unwrap(), PathBuf::from("/var/tmp/s.log"));
    }
}
