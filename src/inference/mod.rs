//! Inference backend layer
//!
//! This module provides the AI capabilities of the demo behind a strategy
//! trait, so a real model-serving backend can be substituted without
//! touching call sites. Two implementations exist:
//! - Mock (default): fabricates results locally, for demos without a backend
//! - HTTP: forwards requests to the model-serving backend
//!
//! The backend is selected based on configuration.

pub mod http;
pub mod mock;

use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;

use crate::config::{InferenceConfig, InferenceMode, UploadConfig};
use crate::models::{ChatMessage, XrayAnalysis};

pub use http::HttpBackend;
pub use mock::MockBackend;

/// An uploaded X-ray image handed to the backend for analysis
#[derive(Debug, Clone)]
pub struct XrayUpload {
    /// Original filename from the upload
    pub filename: String,
    /// MIME type of the image
    pub content_type: String,
    /// Raw image bytes
    pub data: Vec<u8>,
}

/// Error types for inference operations
#[derive(Debug, thiserror::Error)]
pub enum InferenceError {
    /// The backend could not be reached at all
    #[error("Could not connect to the prediction backend at {url}. Please ensure it is running, or enable mock mode.")]
    Unreachable {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The backend answered with a non-2xx status
    #[error("Prediction backend returned HTTP {status}")]
    BadStatus { status: u16 },

    /// The backend answered 2xx but the body did not match the contract
    #[error("Unexpected response from prediction backend: {0}")]
    InvalidResponse(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// Inference backend strategy.
///
/// Both operations correspond to one user action each; callers await them
/// sequentially and surface failures as a banner, never retrying.
#[async_trait]
pub trait InferenceBackend: Send + Sync {
    /// Analyze a chest X-ray image for signs of pneumonia
    async fn analyze(&self, upload: XrayUpload) -> Result<XrayAnalysis, InferenceError>;

    /// Produce an assistant reply to a lung-health question
    async fn chat(&self, message: &str) -> Result<ChatMessage, InferenceError>;
}

/// Create an inference backend based on configuration
pub fn create_backend(
    config: &InferenceConfig,
    upload: &UploadConfig,
) -> Result<Arc<dyn InferenceBackend>> {
    match config.mode {
        InferenceMode::Mock => {
            tracing::info!(
                delay_ms = config.mock_delay_ms,
                "Using mock inference backend"
            );
            Ok(Arc::new(MockBackend::new(
                Arc::new(upload.clone()),
                std::time::Duration::from_millis(config.mock_delay_ms),
            )))
        }
        InferenceMode::Http => {
            tracing::info!(base_url = %config.base_url, "Using HTTP inference backend");
            let backend = HttpBackend::new(
                &config.base_url,
                std::time::Duration::from_secs(config.timeout_seconds),
            )?;
            Ok(Arc::new(backend))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_backend_mock() {
        let config = InferenceConfig::default();
        let upload = UploadConfig::default();
        assert!(create_backend(&config, &upload).is_ok());
    }

    #[test]
    fn test_create_backend_http() {
        let config = InferenceConfig {
            mode: InferenceMode::Http,
            ..Default::default()
        };
        let upload = UploadConfig::default();
        assert!(create_backend(&config, &upload).is_ok());
    }
}
