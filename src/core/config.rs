//! Configuration file handling.
//!
//! One small TOML file in the platform config directory. Its only setting
//! today is the tutoring server's base address, which the CLI flag and the
//! `CHIPI_BASE_URL` environment variable can override at runtime.

use crate::core::constants::DEFAULT_BASE_URL;
use crate::utils::url::normalize_base_url;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::error::Error as StdError;
use std::fmt;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

#[derive(Debug, Serialize, Deserialize, Default, Clone)]
pub struct Config {
    /// Base URL of the tutoring API, e.g. `http://127.0.0.1:8000/api`.
    pub base_url: Option<String>,
}

/// Errors that can occur when loading configuration from disk.
#[derive(Debug)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Failed to parse the configuration file as valid TOML.
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Read { path, source } => {
                write!(f, "Failed to read config at {}: {}", path.display(), source)
            }
            ConfigError::Parse { path, source } => {
                write!(f, "Failed to parse config at {}: {}", path.display(), source)
            }
        }
    }
}

impl StdError for ConfigError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            ConfigError::Read { source, .. } => Some(source),
            ConfigError::Parse { source, .. } => Some(source),
        }
    }
}

pub fn config_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "chipi").map(|dirs| dirs.config_dir().join("config.toml"))
}

impl Config {
    pub fn load() -> Result<Config, Box<dyn StdError>> {
        match config_path() {
            Some(path) => Self::load_from_path(&path),
            None => Ok(Config::default()),
        }
    }

    pub fn load_from_path(config_path: &Path) -> Result<Config, Box<dyn StdError>> {
        if config_path.exists() {
            let contents = fs::read_to_string(config_path).map_err(|source| ConfigError::Read {
                path: config_path.to_path_buf(),
                source,
            })?;
            let config: Config =
                toml::from_str(&contents).map_err(|source| ConfigError::Parse {
                    path: config_path.to_path_buf(),
                    source,
                })?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self) -> Result<(), Box<dyn StdError>> {
        let Some(path) = config_path() else {
            return Err("could not determine the configuration directory".into());
        };
        self.save_to_path(&path)
    }

    pub(crate) fn save_to_path(&self, config_path: &Path) -> Result<(), Box<dyn StdError>> {
        let parent = config_path
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty());

        if let Some(dir) = parent {
            fs::create_dir_all(dir)?;
        }

        let contents = toml::to_string_pretty(self)?;
        let mut temp_file = match parent {
            Some(dir) => NamedTempFile::new_in(dir)?,
            None => NamedTempFile::new()?,
        };
        temp_file.write_all(contents.as_bytes())?;
        temp_file.persist(config_path)?;
        Ok(())
    }

    /// Resolve the server base URL: `--server` flag, then `CHIPI_BASE_URL`,
    /// then the config file, then the built-in default.
    pub fn resolve_base_url(&self, flag: Option<&str>) -> String {
        let raw = flag
            .map(str::to_string)
            .or_else(|| std::env::var("CHIPI_BASE_URL").ok())
            .or_else(|| self.base_url.clone())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        normalize_base_url(&raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from_path(&dir.path().join("config.toml")).unwrap();
        assert!(config.base_url.is_none());
    }

    #[test]
    fn config_round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let config = Config {
            base_url: Some("https://tutor.example.com/api".to_string()),
        };
        config.save_to_path(&path).unwrap();
        let loaded = Config::load_from_path(&path).unwrap();
        assert_eq!(loaded.base_url.as_deref(), Some("https://tutor.example.com/api"));
    }

    #[test]
    fn invalid_toml_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "base_url = [not toml").unwrap();
        let err = Config::load_from_path(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config"));
    }

    #[test]
    fn flag_wins_over_config_value() {
        let config = Config {
            base_url: Some("https://configured.example.com/api".to_string()),
        };
        assert_eq!(
            config.resolve_base_url(Some("https://flag.example.com/api/")),
            "https://flag.example.com/api"
        );
    }

    #[test]
    fn default_base_url_applies_when_nothing_is_set() {
        // Scoped read of the env override so the fallback chain is visible.
        if std::env::var("CHIPI_BASE_URL").is_err() {
            let config = Config::default();
            assert_eq!(config.resolve_base_url(None), DEFAULT_BASE_URL);
        }
    }
}
