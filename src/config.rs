use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::sync::DEFAULT_IMAGE_PREFIX;

/// Source of a configuration value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigSource {
    Default,
    File,
    Environment,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSource::Default => write!(f, "default"),
            ConfigSource::File => write!(f, "file"),
            ConfigSource::Environment => write!(f, "environment"),
        }
    }
}

/// A configuration value with its source
#[derive(Debug, Clone, Serialize)]
pub struct ConfigValue<T> {
    pub value: T,
    pub source: ConfigSource,
}

impl<T> ConfigValue<T> {
    pub fn new(value: T, source: ConfigSource) -> Self {
        Self { value, source }
    }
}

/// Backend connection settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ServerConfig {
    /// Base URL of a bookit-server (e.g. "http://localhost:8080")
    pub url: Option<String>,
    /// API key sent as a Bearer token
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
}

impl ServerConfig {
    /// Returns true if a remote backend is configured
    pub fn is_configured(&self) -> bool {
        self.url.is_some()
    }
}

/// Blob storage settings
#[derive(Debug, Clone, Serialize)]
pub struct StorageConfig {
    /// Blob path prefix for service images
    pub image_prefix: ConfigValue<String>,
}

/// Application configuration with source tracking
#[derive(Debug, Clone, Serialize)]
pub struct Config {
    /// Directory holding the local database, blobs and credentials
    pub data_dir: ConfigValue<PathBuf>,
    /// Config file path used (if any)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_file: Option<PathBuf>,
    pub server: ServerConfig,
    pub storage: StorageConfig,
}

/// Internal struct for deserializing config file
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ConfigFile {
    data_dir: Option<PathBuf>,
    server: Option<ServerConfig>,
    storage: Option<StorageFile>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct StorageFile {
    image_prefix: Option<String>,
}

impl Config {
    /// Load configuration with priority: env vars > config file > defaults
    pub fn load(config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let mut data_dir = ConfigValue::new(Self::default_data_dir(), ConfigSource::Default);
        let mut image_prefix =
            ConfigValue::new(DEFAULT_IMAGE_PREFIX.to_string(), ConfigSource::Default);
        let mut config_file = None;
        let mut server = ServerConfig::default();

        let path = config_path.unwrap_or_else(Self::default_config_path);
        if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .map_err(|e| ConfigError::ReadError(path.clone(), e))?;
            let file_config: ConfigFile = serde_yaml::from_str(&contents)
                .map_err(|e| ConfigError::ParseError(path.clone(), e))?;

            config_file = Some(path.clone());

            if let Some(dir) = file_config.data_dir {
                data_dir = ConfigValue::new(resolve_relative(&path, dir), ConfigSource::File);
            }
            if let Some(server_config) = file_config.server {
                server = server_config;
            }
            if let Some(prefix) = file_config.storage.and_then(|s| s.image_prefix) {
                image_prefix = ConfigValue::new(prefix, ConfigSource::File);
            }
        }

        // Apply environment variable overrides
        if let Ok(dir) = std::env::var("BOOKIT_DATA_DIR") {
            data_dir = ConfigValue::new(PathBuf::from(dir), ConfigSource::Environment);
        }
        if let Ok(prefix) = std::env::var("BOOKIT_IMAGE_PREFIX") {
            image_prefix = ConfigValue::new(prefix, ConfigSource::Environment);
        }
        if let Ok(url) = std::env::var("BOOKIT_SERVER_URL") {
            server.url = Some(url);
        }
        if let Ok(key) = std::env::var("BOOKIT_API_KEY") {
            server.api_key = Some(key);
        }

        Ok(Self {
            data_dir,
            config_file,
            server,
            storage: StorageConfig { image_prefix },
        })
    }

    /// Path of the local SQLite document database
    pub fn database_path(&self) -> PathBuf {
        self.data_dir.value.join("bookit.db")
    }

    /// Root directory of the local blob store
    pub fn blob_dir(&self) -> PathBuf {
        self.data_dir.value.join("blobs")
    }

    /// Default config directory (platform-specific):
    /// - Linux: ~/.config/bookit/
    /// - macOS: ~/Library/Application Support/bookit/
    /// - Windows: %APPDATA%/bookit/
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("bookit")
    }

    /// Default data directory (platform-specific):
    /// - Linux: ~/.local/share/bookit/
    /// - macOS: ~/Library/Application Support/bookit/
    /// - Windows: %APPDATA%/bookit/
    pub fn default_data_dir() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("bookit")
    }

    /// Default config file path (platform-specific config dir + config.yaml)
    pub fn default_config_path() -> PathBuf {
        Self::default_config_dir().join("config.yaml")
    }
}

/// Resolves a relative path against the config file's directory.
fn resolve_relative(config_path: &Path, path: PathBuf) -> PathBuf {
    if path.is_relative() {
        config_path
            .parent()
            .map(|p| p.join(&path))
            .unwrap_or(path)
    } else {
        path
    }
}

#[derive(Debug)]
pub enum ConfigError {
    ReadError(PathBuf, std::io::Error),
    ParseError(PathBuf, serde_yaml::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ReadError(path, e) => {
                write!(f, "Failed to read config file '{}': {}", path.display(), e)
            }
            ConfigError::ParseError(path, e) => {
                write!(f, "Failed to parse config file '{}': {}", path.display(), e)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("nonexistent.yaml");

        let config = Config::load(Some(config_path)).unwrap();
        assert!(config.data_dir.value.ends_with("bookit"));
        assert_eq!(config.data_dir.source, ConfigSource::Default);
        assert_eq!(config.storage.image_prefix.value, "product_images");
        assert!(config.config_file.is_none());
    }

    #[test]
    fn test_load_from_file() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");

        let mut file = std::fs::File::create(&config_path).unwrap();
        writeln!(file, "data_dir: /srv/bookit").unwrap();
        writeln!(file, "server:").unwrap();
        writeln!(file, "  url: http://localhost:8080").unwrap();
        writeln!(file, "  api_key: secret").unwrap();
        writeln!(file, "storage:").unwrap();
        writeln!(file, "  image_prefix: avatars").unwrap();

        let config = Config::load(Some(config_path.clone())).unwrap();
        assert_eq!(config.data_dir.value, PathBuf::from("/srv/bookit"));
        assert_eq!(config.data_dir.source, ConfigSource::File);
        assert_eq!(config.server.url.as_deref(), Some("http://localhost:8080"));
        assert_eq!(config.server.api_key.as_deref(), Some("secret"));
        assert!(config.server.is_configured());
        assert_eq!(config.storage.image_prefix.value, "avatars");
        assert_eq!(config.storage.image_prefix.source, ConfigSource::File);
        assert_eq!(config.config_file, Some(config_path));
    }

    #[test]
    fn test_relative_data_dir_resolves_against_config_file() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");
        std::fs::write(&config_path, "data_dir: data\n").unwrap();

        let config = Config::load(Some(config_path)).unwrap();
        assert_eq!(config.data_dir.value, temp_dir.path().join("data"));
        assert_eq!(config.database_path(), temp_dir.path().join("data/bookit.db"));
    }

    #[test]
    #[ignore] // Run with --ignored; env vars can pollute parallel tests
    fn test_env_var_overrides_file() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");
        std::fs::write(&config_path, "storage:\n  image_prefix: fromfile\n").unwrap();

        std::env::set_var("BOOKIT_IMAGE_PREFIX", "fromenv");

        let config = Config::load(Some(config_path)).unwrap();
        assert_eq!(config.storage.image_prefix.value, "fromenv");
        assert_eq!(config.storage.image_prefix.source, ConfigSource::Environment);

        std::env::remove_var("BOOKIT_IMAGE_PREFIX");
    }

    #[test]
    fn test_invalid_yaml_error() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");

        let mut file = std::fs::File::create(&config_path).unwrap();
        writeln!(file, "invalid: yaml: content: [").unwrap();

        let result = Config::load(Some(config_path));
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn test_api_key_not_serialized() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");
        std::fs::write(&config_path, "server:\n  api_key: topsecret\n").unwrap();

        let config = Config::load(Some(config_path)).unwrap();
        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("topsecret"));
    }
}
