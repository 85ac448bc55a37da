//! Client configuration
//!
//! Defaults, optionally overlaid by `<config_dir>/chanchito/config.toml`.
//! Command-line flags are applied on top by the binary.

use crate::error::CoreError;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_BASE_URL: &str = "http://localhost:5016";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_LOW_STOCK_THRESHOLD: i64 = 5;

/// `~/.config/chanchito` (platform equivalent)
pub fn default_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("chanchito"))
}

/// Runtime configuration for the API client and front ends
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Base URL of the REST API, without the `/api` suffix
    pub base_url: String,
    /// Per-request timeout
    pub request_timeout: Duration,
    /// Where the session record is persisted
    pub session_path: PathBuf,
    /// Products at or below this quantity count as low stock
    pub low_stock_threshold: i64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        let dir = default_config_dir().unwrap_or_else(|| PathBuf::from(".chanchito"));
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            session_path: dir.join("session.json"),
            low_stock_threshold: DEFAULT_LOW_STOCK_THRESHOLD,
        }
    }
}

/// On-disk form; every field optional
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    base_url: Option<String>,
    request_timeout_secs: Option<u64>,
    session_path: Option<PathBuf>,
    low_stock_threshold: Option<i64>,
}

impl ClientConfig {
    /// Load `path`, falling back to defaults when the file does not exist
    pub fn load(path: &Path) -> Result<Self, CoreError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "No config file, using defaults");
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(CoreError::FileRead {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        Self::from_toml(&content, path)
    }

    /// Load from the default location
    pub fn load_default() -> Result<Self, CoreError> {
        let dir = default_config_dir().ok_or(CoreError::ConfigDirNotFound)?;
        Self::load(&dir.join("config.toml"))
    }

    fn from_toml(content: &str, path: &Path) -> Result<Self, CoreError> {
        let file: ConfigFile = toml::from_str(content).map_err(|source| CoreError::TomlParse {
            path: path.to_path_buf(),
            source,
        })?;

        let mut config = Self::default();
        if let Some(base_url) = file.base_url {
            config = config.with_base_url(base_url)?;
        }
        if let Some(secs) = file.request_timeout_secs {
            if secs == 0 {
                return Err(CoreError::InvalidConfig {
                    message: "request_timeout_secs must be greater than zero".to_string(),
                });
            }
            config.request_timeout = Duration::from_secs(secs);
        }
        if let Some(session_path) = file.session_path {
            config.session_path = session_path;
        }
        if let Some(threshold) = file.low_stock_threshold {
            config.low_stock_threshold = threshold;
        }
        Ok(config)
    }

    /// Override the API base URL. Must be http(s); a trailing slash is dropped.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Result<Self, CoreError> {
        let base_url = base_url.into();
        let trimmed = base_url.trim().trim_end_matches('/');
        if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
            return Err(CoreError::InvalidConfig {
                message: format!("base_url must start with http:// or https:// (got '{}')", base_url),
            });
        }
        self.base_url = trimmed.to_string();
        Ok(self)
    }

    pub fn with_session_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.session_path = path.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let config = ClientConfig::load(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.low_stock_threshold, DEFAULT_LOW_STOCK_THRESHOLD);
    }

    #[test]
    fn test_file_overrides() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
base_url = "https://inventario.example.com/"
request_timeout_secs = 5
low_stock_threshold = 10
"#,
        )
        .unwrap();

        let config = ClientConfig::load(&path).unwrap();
        assert_eq!(config.base_url, "https://inventario.example.com");
        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert_eq!(config.low_stock_threshold, 10);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let path = Path::new("config.toml");
        assert!(matches!(
            ClientConfig::from_toml("base_url = \"ftp://x\"", path),
            Err(CoreError::InvalidConfig { .. })
        ));
        assert!(matches!(
            ClientConfig::from_toml("request_timeout_secs = 0", path),
            Err(CoreError::InvalidConfig { .. })
        ));
        assert!(matches!(
            ClientConfig::from_toml("unknown = 1", path),
            Err(CoreError::TomlParse { .. })
        ));
    }
}
