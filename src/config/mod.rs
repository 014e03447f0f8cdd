//! Application configuration stored as JSON in the base directory.

use std::{
    env,
    path::{Path, PathBuf},
    time::Duration,
};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::errors::LedgerError;
use crate::utils::persistence::{ensure_dir, read_optional, write_atomic};

pub const HOME_ENV: &str = "BEIGE_LEDGER_HOME";
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";
pub const FALLBACK_API_KEY_ENV: &str = "API_KEY";

pub const DEFAULT_ADVISOR_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_ADVISOR_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_PAGE_SIZE: usize = 10;

const DEFAULT_DIR_NAME: &str = ".beige_ledger";
const CONFIG_FILE: &str = "config.json";
const DATA_DIR: &str = "data";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
    pub advisor_model: String,
    pub advisor_endpoint: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub advisor_timeout_secs: Option<u64>,
    pub page_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: None,
            advisor_model: DEFAULT_ADVISOR_MODEL.into(),
            advisor_endpoint: DEFAULT_ADVISOR_ENDPOINT.into(),
            advisor_timeout_secs: None,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl Config {
    pub fn advisor_timeout(&self) -> Option<Duration> {
        self.advisor_timeout_secs.map(Duration::from_secs)
    }

    /// Page size used by the transaction list; never zero.
    pub fn effective_page_size(&self) -> usize {
        self.page_size.max(1)
    }
}

/// Resolves the directories the application reads and writes.
pub struct PathResolver;

impl PathResolver {
    /// `$BEIGE_LEDGER_HOME`, else `~/.beige_ledger`.
    pub fn base_dir() -> PathBuf {
        if let Some(custom) = env::var_os(HOME_ENV) {
            return PathBuf::from(custom);
        }
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(DEFAULT_DIR_NAME)
    }

    pub fn config_file_in(base: &Path) -> PathBuf {
        base.join(CONFIG_FILE)
    }

    pub fn default_data_dir_in(base: &Path) -> PathBuf {
        base.join(DATA_DIR)
    }
}

/// Advisor credential from the environment, if any.
pub fn advisor_api_key() -> Option<String> {
    [API_KEY_ENV, FALLBACK_API_KEY_ENV]
        .iter()
        .filter_map(|name| env::var(name).ok())
        .map(|value| value.trim().to_string())
        .find(|value| !value.is_empty())
}

pub struct ConfigManager {
    base: PathBuf,
    path: PathBuf,
}

impl ConfigManager {
    pub fn new() -> Result<Self, LedgerError> {
        Self::with_base_dir(PathResolver::base_dir())
    }

    pub fn with_base_dir(base: PathBuf) -> Result<Self, LedgerError> {
        ensure_dir(&base)?;
        Ok(Self {
            path: PathResolver::config_file_in(&base),
            base,
        })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the config, writing defaults when the file does not exist yet.
    /// An unreadable file is reported and replaced by defaults in memory only.
    pub fn load(&self) -> Result<Config, LedgerError> {
        match read_optional(&self.path)? {
            Some(data) => match serde_json::from_slice(&data) {
                Ok(config) => Ok(config),
                Err(err) => {
                    warn!(path = %self.path.display(), error = %err, "config is unreadable; using defaults");
                    Ok(Config::default())
                }
            },
            None => {
                let config = Config::default();
                self.save(&config)?;
                Ok(config)
            }
        }
    }

    pub fn save(&self, config: &Config) -> Result<(), LedgerError> {
        let json = serde_json::to_string_pretty(config)?;
        write_atomic(&self.path, &json)
    }

    /// Directory holding the ledger store for `config`. Relative paths are
    /// taken relative to the base directory.
    pub fn data_dir(&self, config: &Config) -> PathBuf {
        match &config.data_dir {
            Some(dir) if dir.is_absolute() => dir.clone(),
            Some(dir) => self.base.join(dir),
            None => PathResolver::default_data_dir_in(&self.base),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn first_load_writes_defaults() {
        let temp = TempDir::new().unwrap();
        let manager = ConfigManager::with_base_dir(temp.path().to_path_buf()).unwrap();
        let config = manager.load().unwrap();
        assert_eq!(config, Config::default());
        assert!(manager.path().exists());
        assert_eq!(manager.data_dir(&config), temp.path().join("data"));
    }

    #[test]
    fn partial_files_fill_missing_fields() {
        let temp = TempDir::new().unwrap();
        let manager = ConfigManager::with_base_dir(temp.path().to_path_buf()).unwrap();
        std::fs::write(manager.path(), r#"{"page_size": 25, "data_dir": "ledger"}"#).unwrap();
        let config = manager.load().unwrap();
        assert_eq!(config.page_size, 25);
        assert_eq!(config.advisor_model, DEFAULT_ADVISOR_MODEL);
        assert_eq!(manager.data_dir(&config), temp.path().join("ledger"));
    }

    #[test]
    fn corrupt_config_falls_back_to_defaults() {
        let temp = TempDir::new().unwrap();
        let manager = ConfigManager::with_base_dir(temp.path().to_path_buf()).unwrap();
        std::fs::write(manager.path(), "{{{").unwrap();
        assert_eq!(manager.load().unwrap(), Config::default());
    }

    #[test]
    fn non_utf8_config_falls_back_to_defaults() {
        let temp = TempDir::new().unwrap();
        let manager = ConfigManager::with_base_dir(temp.path().to_path_buf()).unwrap();
        std::fs::write(manager.path(), [0xff, 0xfe, b'{', b'}']).unwrap();
        assert_eq!(manager.load().unwrap(), Config::default());
    }

    #[test]
    fn zero_page_size_is_clamped() {
        let config = Config {
            page_size: 0,
            ..Config::default()
        };
        assert_eq!(config.effective_page_size(), 1);
        assert_eq!(config.advisor_timeout(), None);
    }
}
