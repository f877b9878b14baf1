//! Configuration management for tabledit.
//!
//! Settings come from a TOML file discovered next to the working directory
//! or under the user config directory, with the server URL overridable from
//! the command line or the `TABLEDIT_SERVER` environment variable. A missing
//! config file just means defaults; a malformed one is an error.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Default backend address (the Flask development server).
pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:5000";
/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Config file basename searched for in the working directory.
const LOCAL_CONFIG_NAME: &str = "tabledit.toml";

/// Errors from loading settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Cannot read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),
}

/// Client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Base URL of the review backend.
    pub server_url: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// Delay between requests in milliseconds (0 = none).
    pub request_delay_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            request_delay_ms: 0,
        }
    }
}

/// Options for loading settings.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Explicit config file path (overrides auto-discovery). `~` expands.
    pub config_path: Option<PathBuf>,
    /// Server URL from the command line or environment; wins over the file.
    pub server_override: Option<String>,
}

impl Settings {
    /// Load settings according to the given options.
    pub fn load(options: &LoadOptions) -> Result<Self, ConfigError> {
        let mut settings = match &options.config_path {
            Some(path) => {
                let expanded = expand_path(path);
                if !expanded.exists() {
                    return Err(ConfigError::NotFound(expanded));
                }
                Self::from_file(&expanded)?
            }
            None => match discover_config_file() {
                Some(path) => Self::from_file(&path)?,
                None => Self::default(),
            },
        };

        if let Some(server) = &options.server_override {
            settings.server_url = server.clone();
        }
        Ok(settings)
    }

    /// Parse settings from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        debug!("Loading settings from {}", path.display());
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Expand `~` in user-supplied paths.
fn expand_path(path: &Path) -> PathBuf {
    PathBuf::from(shellexpand::tilde(&path.to_string_lossy()).into_owned())
}

/// Look for a config file: `./tabledit.toml`, then
/// `{config_dir}/tabledit/config.toml`.
fn discover_config_file() -> Option<PathBuf> {
    let local = PathBuf::from(LOCAL_CONFIG_NAME);
    if local.exists() {
        return Some(local);
    }
    let user = dirs::config_dir()?.join("tabledit").join("config.toml");
    if user.exists() {
        return Some(user);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_apply_without_config_file() {
        let settings = Settings::default();
        assert_eq!(settings.server_url, DEFAULT_SERVER_URL);
        assert_eq!(settings.timeout_secs, DEFAULT_TIMEOUT_SECS);
        assert_eq!(settings.request_delay_ms, 0);
    }

    #[test]
    fn partial_file_keeps_defaults_for_missing_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tabledit.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "server_url = \"http://ocr.internal:8080\"").unwrap();

        let settings = Settings::from_file(&path).unwrap();
        assert_eq!(settings.server_url, "http://ocr.internal:8080");
        assert_eq!(settings.timeout_secs, DEFAULT_TIMEOUT_SECS);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tabledit.toml");
        std::fs::write(&path, "server_url = [not toml").unwrap();

        assert!(matches!(
            Settings::from_file(&path),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn cli_override_wins_over_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tabledit.toml");
        std::fs::write(&path, "server_url = \"http://from-file:5000\"\n").unwrap();

        let settings = Settings::load(&LoadOptions {
            config_path: Some(path),
            server_override: Some("http://from-flag:5000".to_string()),
        })
        .unwrap();
        assert_eq!(settings.server_url, "http://from-flag:5000");
    }

    #[test]
    fn explicit_missing_config_is_an_error() {
        let err = Settings::load(&LoadOptions {
            config_path: Some(PathBuf::from("/nonexistent/tabledit.toml")),
            server_override: None,
        })
        .unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }
}
