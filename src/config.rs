//! Persisted configuration: the remote-service credential and a few defaults.
//!
//! Stored as a single JSON record in `~/.git-auto-commit/config.json`.

use std::env;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::error::ConfigError;
use crate::i18n::Language;

/// Directory under the user's home that holds the config file.
const CONFIG_DIR_NAME: &str = ".git-auto-commit";

const CONFIG_FILE_NAME: &str = "config.json";

/// Environment variable that overrides the stored API key.
pub const API_KEY_ENV_VAR: &str = "SILICONFLOW_API_KEY";

pub const DEFAULT_BASE_URL: &str = "https://api.siliconflow.cn/v1";

pub const DEFAULT_MODEL: &str = "deepseek-ai/DeepSeek-V3";

/// The on-disk configuration record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<Language>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

impl Config {
    /// Resolve the credential: a non-empty `SILICONFLOW_API_KEY` wins over the
    /// stored key. Blank values count as unset; others are used verbatim.
    pub fn resolve_api_key(&self) -> Option<String> {
        match env::var(API_KEY_ENV_VAR) {
            Ok(v) if !v.trim().is_empty() => Some(v),
            _ => self
                .api_key
                .as_ref()
                .filter(|k| !k.trim().is_empty())
                .cloned(),
        }
    }

    pub fn model(&self) -> &str {
        self.model.as_deref().unwrap_or(DEFAULT_MODEL)
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL)
    }
}

/// Reads and writes the [`Config`] record as a whole.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    /// Store at the user-scoped default location.
    pub fn user_default() -> Result<Self, ConfigError> {
        let home = dirs::home_dir().ok_or(ConfigError::NoHomeDirectory)?;
        Ok(Self::at(home.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME)))
    }

    /// Store at an explicit file path.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the record. A missing file is an empty record.
    pub fn load(&self) -> Result<Config, ConfigError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No config file at {}, using defaults", self.path.display());
                return Ok(Config::default());
            }
            Err(source) => {
                return Err(ConfigError::ReadFailed {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        if content.trim().is_empty() {
            return Ok(Config::default());
        }

        serde_json::from_str(&content).map_err(|source| ConfigError::ParseFailed {
            path: self.path.clone(),
            source,
        })
    }

    /// Replace the record on disk atomically.
    pub fn save(&self, config: &Config) -> Result<(), ConfigError> {
        let dir = self
            .path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        let write_err = |source| ConfigError::WriteFailed {
            path: self.path.clone(),
            source,
        };

        fs::create_dir_all(&dir).map_err(write_err)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if let Err(e) = fs::set_permissions(&dir, fs::Permissions::from_mode(0o700)) {
                debug!("Failed to restrict config directory permissions: {e}");
            }
        }

        let content = serde_json::to_string_pretty(config).map_err(ConfigError::SerializeFailed)?;

        let mut tmp = NamedTempFile::new_in(&dir).map_err(write_err)?;
        tmp.write_all(content.as_bytes()).map_err(write_err)?;
        tmp.write_all(b"\n").map_err(write_err)?;
        tmp.persist(&self.path).map_err(|e| write_err(e.error))?;

        Ok(())
    }

    /// Stored API key, ignoring the environment override.
    pub fn get_api_key(&self) -> Result<Option<String>, ConfigError> {
        Ok(self.load()?.api_key)
    }

    /// Update only the API key, keeping the rest of the record.
    ///
    /// A corrupt record is replaced by one holding just the key, so the
    /// credential can always be repaired.
    pub fn set_api_key(&self, api_key: &str) -> Result<(), ConfigError> {
        let mut config = match self.load() {
            Ok(config) => config,
            Err(ConfigError::ParseFailed { path, source }) => {
                warn!("Replacing unreadable config file {}: {}", path.display(), source);
                Config::default()
            }
            Err(e) => return Err(e),
        };
        config.api_key = Some(api_key.to_string());
        self.save(&config)
    }
}
