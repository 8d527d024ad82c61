//! Configuration for shelf
//!
//! Loaded from `config.toml` in the platform config directory
//! (`~/.config/shelf/config.toml` on Linux). Every section is optional:
//!
//! ```toml
//! [storage]
//! data_dir = "/home/me/.local/share/shelf"
//!
//! [sources]
//! timeout_secs = 30
//!
//! [sources.google_books]
//! api_key = "..."
//!
//! [scanner]
//! enabled = true
//! frame_interval_ms = 16
//! formats = ["ean_13", "qr_code"]
//!
//! [export]
//! file_name = "library_collection.csv"
//! ```
//!
//! `GOOGLE_BOOKS_API_KEY` in the environment overrides the configured key.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::capture::BarcodeFormat;

/// Environment variable holding the Google Books API credential.
pub const GOOGLE_BOOKS_API_KEY_ENV: &str = "GOOGLE_BOOKS_API_KEY";

const APP_DIR: &str = "shelf";

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub storage: StorageConfig,
    pub sources: SourcesConfig,
    pub scanner: ScannerConfig,
    pub export: ExportConfig,
}

/// Where the collection is persisted
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory for the collection slot and the log file
    pub data_dir: Option<PathBuf>,
}

/// Metadata source settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourcesConfig {
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
    pub user_agent: String,
    pub open_library: OpenLibraryConfig,
    pub google_books: GoogleBooksConfig,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            user_agent: crate::http::DEFAULT_USER_AGENT.to_string(),
            open_library: OpenLibraryConfig::default(),
            google_books: GoogleBooksConfig::default(),
        }
    }
}

/// Open Library serves both the primary and the search fallback source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenLibraryConfig {
    pub base_url: String,
    pub covers_url: String,
}

impl Default for OpenLibraryConfig {
    fn default() -> Self {
        Self {
            base_url: "https://openlibrary.org".to_string(),
            covers_url: "https://covers.openlibrary.org".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GoogleBooksConfig {
    pub base_url: String,
    pub api_key: Option<String>,
}

impl Default for GoogleBooksConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.googleapis.com".to_string(),
            api_key: None,
        }
    }
}

/// Barcode scanner settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScannerConfig {
    /// Offer the scanning affordance at all
    pub enabled: bool,
    /// Poll tick in milliseconds (one display refresh at 60 Hz by default)
    pub frame_interval_ms: u64,
    pub formats: Vec<BarcodeFormat>,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            frame_interval_ms: 16,
            formats: vec![BarcodeFormat::Ean13, BarcodeFormat::QrCode],
        }
    }
}

impl ScannerConfig {
    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub file_name: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            file_name: crate::export::DEFAULT_EXPORT_FILE_NAME.to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml_str).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Serialize configuration to TOML
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Load and validate a config file. The environment overlay is applied.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("{}: {}", path.display(), e)))?;
        let mut config = Self::from_toml(&contents)?;
        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    /// Load `config.toml` from the platform config directory, or defaults
    /// when it does not exist.
    pub fn load_default() -> Result<Self, ConfigError> {
        match Self::default_path() {
            Some(path) if path.exists() => Self::load(&path),
            _ => {
                let mut config = Self::default();
                config.apply_env();
                Ok(config)
            }
        }
    }

    /// `<config dir>/shelf/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(APP_DIR).join("config.toml"))
    }

    /// Overlay values taken from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_env_from(|key| std::env::var(key).ok());
    }

    fn apply_env_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(key) = lookup(GOOGLE_BOOKS_API_KEY_ENV).filter(|k| !k.trim().is_empty()) {
            self.sources.google_books.api_key = Some(key);
        }
    }

    /// Directory holding the collection and log file.
    pub fn data_dir(&self) -> PathBuf {
        self.storage
            .data_dir
            .clone()
            .or_else(|| dirs::data_dir().map(|d| d.join(APP_DIR)))
            .unwrap_or_else(|| PathBuf::from(".").join(format!(".{}", APP_DIR)))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.sources.timeout_secs)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sources.timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "sources.timeout_secs must be positive".to_string(),
            ));
        }
        if self.scanner.frame_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "scanner.frame_interval_ms must be positive".to_string(),
            ));
        }
        if self.scanner.enabled && self.scanner.formats.is_empty() {
            return Err(ConfigError::Invalid(
                "scanner.formats must name at least one format".to_string(),
            ));
        }
        if self.export.file_name.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "export.file_name must not be empty".to_string(),
            ));
        }
        for (name, url) in [
            ("sources.open_library.base_url", &self.sources.open_library.base_url),
            ("sources.open_library.covers_url", &self.sources.open_library.covers_url),
            ("sources.google_books.base_url", &self.sources.google_books.base_url),
        ] {
            if url::Url::parse(url).is_err() {
                return Err(ConfigError::Invalid(format!("{} is not a valid URL", name)));
            }
        }
        Ok(())
    }
}

/// Configuration loading error
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not read config: {0}")]
    Io(String),
    #[error("Invalid config file: {0}")]
    Parse(String),
    #[error("Invalid config value: {0}")]
    Invalid(String),
}
