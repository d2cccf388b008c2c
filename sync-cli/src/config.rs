//! Configuration loading for etagsync.
//!
//! Configuration is loaded from a TOML file (default: `etagsync.toml` in
//! the platform config directory). Every section and field is optional.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use sync_client::SyncConfig;
use sync_core::{RetryPolicy, DEFAULT_CHUNK_SIZE};
use sync_store::DEFAULT_PAGE_SIZE;

/// Config file name looked up in the platform config directory.
pub const CONFIG_FILE_NAME: &str = "etagsync.toml";

/// Smallest part size the provider accepts for multipart uploads.
pub const MIN_CHUNK_SIZE: u64 = 5 * 1024 * 1024;

/// Largest part size the provider accepts for multipart uploads.
pub const MAX_CHUNK_SIZE: u64 = 5 * 1024 * 1024 * 1024;

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AppConfig {
    /// Object store configuration.
    #[serde(default)]
    pub store: StoreConfig,
    /// Transfer configuration.
    #[serde(default)]
    pub transfer: TransferConfig,
    /// Retry configuration.
    #[serde(default)]
    pub retry: RetryConfig,
}

/// Object store configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StoreConfig {
    /// Directory holding the containers.
    #[serde(default = "default_store_root")]
    pub root: PathBuf,
    /// Objects per listing page (default: 1000).
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

/// Transfer configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TransferConfig {
    /// Fingerprint chunk and multipart part size in bytes (default: 8 MiB).
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    /// Media type for unknown extensions (default: text/plain).
    #[serde(default = "default_content_type")]
    pub default_content_type: String,
    /// Follow symbolic links while walking (default: false).
    #[serde(default)]
    pub follow_symlinks: bool,
}

/// Retry configuration for transient store errors.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RetryConfig {
    /// Total attempts per request, including the first (default: 4).
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Delay after the first failure in milliseconds (default: 200).
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
    /// Cap on the backoff in milliseconds (default: 5000).
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
}

// Default value functions
fn default_store_root() -> PathBuf {
    directories::ProjectDirs::from("io", "etagsync", "etagsync")
        .map(|dirs| dirs.data_dir().join("containers"))
        .unwrap_or_else(|| PathBuf::from(".etagsync"))
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

fn default_chunk_size() -> usize {
    DEFAULT_CHUNK_SIZE
}

fn default_content_type() -> String {
    sync_client::DEFAULT_CONTENT_TYPE.to_string()
}

fn default_max_attempts() -> u32 {
    4
}

fn default_base_delay_ms() -> u64 {
    200
}

fn default_max_delay_ms() -> u64 {
    5000
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            root: default_store_root(),
            page_size: default_page_size(),
        }
    }
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            default_content_type: default_content_type(),
            follow_symlinks: false,
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            base_delay_ms: default_base_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Load the configuration the CLI should use.
    ///
    /// An explicit path must exist. Without one, the default location is
    /// tried and a missing file there means built-in defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }
        match default_config_path() {
            Some(path) if path.is_file() => Self::from_file(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Check values against the limits the store enforces.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let chunk = self.transfer.chunk_size as u64;
        if !(MIN_CHUNK_SIZE..=MAX_CHUNK_SIZE).contains(&chunk) {
            return Err(ConfigError::Invalid(format!(
                "transfer.chunk_size must be between {MIN_CHUNK_SIZE} and {MAX_CHUNK_SIZE} bytes, got {chunk}"
            )));
        }
        if self.store.page_size == 0 {
            return Err(ConfigError::Invalid(
                "store.page_size must be greater than zero".into(),
            ));
        }
        if self.retry.max_attempts == 0 {
            return Err(ConfigError::Invalid(
                "retry.max_attempts must be at least 1".into(),
            ));
        }
        if self.retry.base_delay_ms > self.retry.max_delay_ms {
            return Err(ConfigError::Invalid(format!(
                "retry.base_delay_ms ({}) exceeds retry.max_delay_ms ({})",
                self.retry.base_delay_ms, self.retry.max_delay_ms
            )));
        }
        Ok(())
    }

    /// Executor settings derived from the `[transfer]` section.
    pub fn sync_config(&self) -> SyncConfig {
        SyncConfig::default()
            .with_chunk_size(self.transfer.chunk_size)
            .with_default_content_type(self.transfer.default_content_type.clone())
            .with_follow_symlinks(self.transfer.follow_symlinks)
    }

    /// Retry policy derived from the `[retry]` section.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.retry.max_attempts,
            Duration::from_millis(self.retry.base_delay_ms),
            Duration::from_millis(self.retry.max_delay_ms),
        )
    }
}

/// Default config file location for this platform.
pub fn default_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("io", "etagsync", "etagsync")
        .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("failed to read config file {path}: {source}")]
    ReadError {
        /// Path to the configuration file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// Failed to parse configuration file.
    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        /// Path to the configuration file.
        path: PathBuf,
        /// Underlying TOML parse error.
        source: toml::de::Error,
    },
    /// A value is out of range.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}
