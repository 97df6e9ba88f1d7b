//! Configuration management
//!
//! This module handles loading and parsing configuration for the ChestScan server.
//! Configuration can be loaded from:
//! - config.yml file
//! - Environment variables (override file settings)
//!
//! Missing optional values are filled with sensible defaults.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Inference backend configuration
    #[serde(default)]
    pub inference: InferenceConfig,
    /// Upload configuration
    #[serde(default)]
    pub upload: UploadConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind to
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,
    /// CORS allowed origin (for cookie-based auth)
    #[serde(default = "default_cors_origin")]
    pub cors_origin: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origin: default_cors_origin(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_cors_origin() -> String {
    "http://localhost:3000".to_string()
}

/// Inference backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InferenceConfig {
    /// Backend mode (mock or http)
    #[serde(default)]
    pub mode: InferenceMode,
    /// Base URL of the model-serving backend (http mode)
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Artificial processing delay for fabricated results, in milliseconds (mock mode)
    #[serde(default = "default_mock_delay_ms")]
    pub mock_delay_ms: u64,
    /// Request timeout in seconds (http mode)
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            mode: InferenceMode::default(),
            base_url: default_base_url(),
            mock_delay_ms: default_mock_delay_ms(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:5000".to_string()
}

fn default_mock_delay_ms() -> u64 {
    2000
}

fn default_timeout_seconds() -> u64 {
    30
}

/// Inference backend mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum InferenceMode {
    /// Fabricated results for demos without a backend (default)
    #[default]
    Mock,
    /// Forward requests to the model-serving backend over HTTP
    Http,
}

/// Upload configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    /// Upload directory path
    #[serde(default = "default_upload_path")]
    pub path: PathBuf,
    /// Maximum file size in bytes (default: 10MB)
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,
    /// Allowed image MIME types
    #[serde(default = "default_allowed_types")]
    pub allowed_types: Vec<String>,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            path: default_upload_path(),
            max_file_size: default_max_file_size(),
            allowed_types: default_allowed_types(),
        }
    }
}

fn default_upload_path() -> PathBuf {
    PathBuf::from("uploads")
}

fn default_max_file_size() -> u64 {
    10 * 1024 * 1024 // 10MB
}

fn default_allowed_types() -> Vec<String> {
    vec![
        "image/jpeg".to_string(),
        "image/png".to_string(),
        "image/webp".to_string(),
    ]
}

impl UploadConfig {
    /// Check if a MIME type is allowed
    pub fn is_type_allowed(&self, mime_type: &str) -> bool {
        self.allowed_types.iter().any(|t| t == mime_type)
    }

    /// Get file extension for a MIME type
    pub fn get_extension(&self, mime_type: &str) -> &'static str {
        match mime_type {
            "image/jpeg" => "jpg",
            "image/png" => "png",
            "image/webp" => "webp",
            "image/bmp" => "bmp",
            "image/tiff" => "tiff",
            _ => "bin",
        }
    }
}

/// Error type for configuration parsing
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    FileRead {
        path: String,
        source: std::io::Error,
    },
    #[error("Failed to parse config file '{path}': {message}")]
    ParseError { path: String, message: String },
}

impl Config {
    /// Load configuration from file
    ///
    /// If the file doesn't exist or is empty, returns default configuration.
    /// If the file exists but is invalid YAML, returns an error with details.
    pub fn load(path: &std::path::Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.display().to_string(),
            source: e,
        })?;

        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: Config =
            serde_yaml::from_str(&content).map_err(|e| ConfigError::ParseError {
                path: path.display().to_string(),
                message: format_yaml_error(&e),
            })?;

        Ok(config)
    }

    /// Load configuration from file with environment variable overrides
    ///
    /// Environment variables follow the pattern:
    /// - CHESTSCAN_SERVER_HOST
    /// - CHESTSCAN_SERVER_PORT
    /// - CHESTSCAN_SERVER_CORS_ORIGIN
    /// - CHESTSCAN_INFERENCE_MODE
    /// - CHESTSCAN_INFERENCE_BASE_URL
    /// - CHESTSCAN_INFERENCE_MOCK_DELAY_MS
    /// - CHESTSCAN_INFERENCE_TIMEOUT_SECONDS
    /// - CHESTSCAN_UPLOAD_PATH
    /// - CHESTSCAN_UPLOAD_MAX_FILE_SIZE
    pub fn load_with_env(path: &std::path::Path) -> anyhow::Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides to the configuration
    fn apply_env_overrides(&mut self) {
        if let Ok(host) = std::env::var("CHESTSCAN_SERVER_HOST") {
            self.server.host = host;
        }
        if let Ok(port) = std::env::var("CHESTSCAN_SERVER_PORT") {
            if let Ok(port) = port.parse::<u16>() {
                self.server.port = port;
            }
        }
        if let Ok(cors_origin) = std::env::var("CHESTSCAN_SERVER_CORS_ORIGIN") {
            self.server.cors_origin = cors_origin;
        }

        if let Ok(mode) = std::env::var("CHESTSCAN_INFERENCE_MODE") {
            match mode.to_lowercase().as_str() {
                "mock" => self.inference.mode = InferenceMode::Mock,
                "http" => self.inference.mode = InferenceMode::Http,
                _ => {} // Ignore invalid values
            }
        }
        if let Ok(base_url) = std::env::var("CHESTSCAN_INFERENCE_BASE_URL") {
            self.inference.base_url = base_url;
        }
        if let Ok(delay) = std::env::var("CHESTSCAN_INFERENCE_MOCK_DELAY_MS") {
            if let Ok(delay) = delay.parse::<u64>() {
                self.inference.mock_delay_ms = delay;
            }
        }
        if let Ok(timeout) = std::env::var("CHESTSCAN_INFERENCE_TIMEOUT_SECONDS") {
            if let Ok(timeout) = timeout.parse::<u64>() {
                self.inference.timeout_seconds = timeout;
            }
        }

        if let Ok(path) = std::env::var("CHESTSCAN_UPLOAD_PATH") {
            self.upload.path = PathBuf::from(path);
        }
        if let Ok(size) = std::env::var("CHESTSCAN_UPLOAD_MAX_FILE_SIZE") {
            if let Ok(size) = size.parse::<u64>() {
                self.upload.max_file_size = size;
            }
        }
    }
}

/// Format YAML parsing error with location and context
fn format_yaml_error(e: &serde_yaml::Error) -> String {
    if let Some(location) = e.location() {
        format!(
            "at line {}, column {}: {}",
            location.line(),
            location.column(),
            e
        )
    } else {
        e.to_string()
    }
}

// Shared mutex for all config tests that modify environment variables.
#[cfg(test)]
static CONFIG_ENV_MUTEX: std::sync::Mutex<()> = std::sync::Mutex::new(());

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn lock_env() -> std::sync::MutexGuard<'static, ()> {
        super::CONFIG_ENV_MUTEX
            .lock()
            .unwrap_or_else(|e| e.into_inner())
    }

    #[test]
    fn test_load_missing_file_returns_defaults() {
        let path = std::path::Path::new("nonexistent_config.yml");
        let config = Config::load(path).unwrap();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.inference.mode, InferenceMode::Mock);
        assert_eq!(config.inference.base_url, "http://localhost:5000");
        assert_eq!(config.upload.max_file_size, 10 * 1024 * 1024);
    }

    #[test]
    fn test_load_empty_file_returns_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "   \n").unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.inference.mock_delay_ms, 2000);
    }

    #[test]
    fn test_load_partial_file_fills_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            "server:\n  port: 9000\ninference:\n  mode: http\n  base_url: http://models.internal:5000\n"
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.inference.mode, InferenceMode::Http);
        assert_eq!(config.inference.base_url, "http://models.internal:5000");
        assert_eq!(config.inference.timeout_seconds, 30);
    }

    #[test]
    fn test_load_invalid_yaml_reports_location() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "server:\n  port: [not a port\n").unwrap();

        let err = Config::load(file.path()).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn test_env_overrides() {
        let _guard = lock_env();

        std::env::set_var("CHESTSCAN_SERVER_PORT", "9999");
        std::env::set_var("CHESTSCAN_INFERENCE_MODE", "http");
        std::env::set_var("CHESTSCAN_INFERENCE_BASE_URL", "http://backend:5000");

        let config =
            Config::load_with_env(std::path::Path::new("nonexistent_config.yml")).unwrap();

        std::env::remove_var("CHESTSCAN_SERVER_PORT");
        std::env::remove_var("CHESTSCAN_INFERENCE_MODE");
        std::env::remove_var("CHESTSCAN_INFERENCE_BASE_URL");

        assert_eq!(config.server.port, 9999);
        assert_eq!(config.inference.mode, InferenceMode::Http);
        assert_eq!(config.inference.base_url, "http://backend:5000");
    }

    #[test]
    fn test_env_override_invalid_values_ignored() {
        let _guard = lock_env();

        std::env::set_var("CHESTSCAN_SERVER_PORT", "not-a-port");
        std::env::set_var("CHESTSCAN_INFERENCE_MODE", "quantum");

        let config =
            Config::load_with_env(std::path::Path::new("nonexistent_config.yml")).unwrap();

        std::env::remove_var("CHESTSCAN_SERVER_PORT");
        std::env::remove_var("CHESTSCAN_INFERENCE_MODE");

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.inference.mode, InferenceMode::Mock);
    }

    #[test]
    fn test_upload_type_allowed() {
        let config = UploadConfig::default();
        assert!(config.is_type_allowed("image/jpeg"));
        assert!(config.is_type_allowed("image/png"));
        assert!(!config.is_type_allowed("application/pdf"));
    }

    #[test]
    fn test_upload_extension_mapping() {
        let config = UploadConfig::default();
        assert_eq!(config.get_extension("image/jpeg"), "jpg");
        assert_eq!(config.get_extension("image/png"), "png");
        assert_eq!(config.get_extension("application/octet-stream"), "bin");
    }
}
