//! HTTP inference backend
//!
//! Forwards analysis and chat requests to the external model-serving
//! backend. The wire contract:
//! - `POST {base}/detect` with multipart field `file` returns `prediction`,
//!   optional `confidence`, `image_url`, `report_id` and an optional
//!   `report_download_url`
//! - `POST {base}/chat` with `{"message": ...}` returns `{"response": ...}`
//!
//! The client keeps a cookie store so the backend can correlate requests to
//! a session.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::inference::{InferenceBackend, InferenceError, XrayUpload};
use crate::models::{ChatMessage, XrayAnalysis};

/// Confidence assumed when the backend omits one
const DEFAULT_CONFIDENCE: f64 = 0.95;

/// HTTP inference backend
pub struct HttpBackend {
    base_url: String,
    client: reqwest::Client,
}

/// Response body of `POST /detect`
#[derive(Debug, Deserialize)]
struct DetectResponse {
    prediction: String,
    confidence: Option<f64>,
    image_url: String,
    report_id: String,
    #[serde(default)]
    report_download_url: Option<String>,
}

/// Request body of `POST /chat`
#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    message: &'a str,
}

/// Response body of `POST /chat`
#[derive(Debug, Deserialize)]
struct ChatResponse {
    response: String,
}

impl HttpBackend {
    /// Create a new HTTP backend for the given base URL
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .cookie_store(true)
            .timeout(timeout)
            .build()
            .context("Failed to build inference HTTP client")?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn unreachable(&self, source: reqwest::Error) -> InferenceError {
        InferenceError::Unreachable {
            url: self.base_url.clone(),
            source,
        }
    }
}

#[async_trait]
impl InferenceBackend for HttpBackend {
    async fn analyze(&self, upload: XrayUpload) -> Result<XrayAnalysis, InferenceError> {
        let part = reqwest::multipart::Part::bytes(upload.data)
            .file_name(upload.filename)
            .mime_str(&upload.content_type)
            .map_err(|e| anyhow::anyhow!("Invalid upload content type: {}", e))?;
        let form = reqwest::multipart::Form::new().part("file", part);

        let response = self
            .client
            .post(format!("{}/detect", self.base_url))
            .multipart(form)
            .send()
            .await
            .map_err(|e| self.unreachable(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(InferenceError::BadStatus {
                status: status.as_u16(),
            });
        }

        let body: DetectResponse = response
            .json()
            .await
            .map_err(|e| InferenceError::InvalidResponse(e.to_string()))?;

        let prediction = body
            .prediction
            .parse()
            .map_err(|e: anyhow::Error| InferenceError::InvalidResponse(e.to_string()))?;

        Ok(XrayAnalysis {
            prediction,
            confidence: body.confidence.unwrap_or(DEFAULT_CONFIDENCE),
            image_url: body.image_url,
            report_id: body.report_id,
            report_download_url: body.report_download_url,
            created_at: Utc::now(),
        })
    }

    async fn chat(&self, message: &str) -> Result<ChatMessage, InferenceError> {
        let response = self
            .client
            .post(format!("{}/chat", self.base_url))
            .json(&ChatRequest { message })
            .send()
            .await
            .map_err(|e| self.unreachable(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(InferenceError::BadStatus {
                status: status.as_u16(),
            });
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| InferenceError::InvalidResponse(e.to_string()))?;

        Ok(ChatMessage::assistant(body.response))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ChatRole, Prediction};
    use axum::{extract::Multipart, http::StatusCode, routing::post, Json, Router};

    /// Serve a stub backend on an ephemeral port, returning its base URL
    async fn spawn_stub(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn backend(base_url: &str) -> HttpBackend {
        HttpBackend::new(base_url, Duration::from_secs(5)).unwrap()
    }

    fn png_upload() -> XrayUpload {
        XrayUpload {
            filename: "xray.png".to_string(),
            content_type: "image/png".to_string(),
            data: vec![1, 2, 3],
        }
    }

    #[tokio::test]
    async fn test_detect_parses_full_response() {
        let router = Router::new().route(
            "/detect",
            post(|mut multipart: Multipart| async move {
                // The contract requires a multipart field named "file"
                let field = multipart.next_field().await.unwrap().unwrap();
                assert_eq!(field.name(), Some("file"));

                Json(serde_json::json!({
                    "prediction": "Pneumonia",
                    "confidence": 0.87,
                    "image_url": "data:image/jpeg;base64,abc",
                    "report_id": "REP_20250101_120000",
                    "report_download_url": "/reports/REP_20250101_120000.pdf"
                }))
            }),
        );
        let base = spawn_stub(router).await;

        let result = backend(&base).analyze(png_upload()).await.unwrap();

        assert_eq!(result.prediction, Prediction::Pneumonia);
        assert!((result.confidence - 0.87).abs() < 1e-9);
        assert_eq!(result.report_id, "REP_20250101_120000");
        assert_eq!(
            result.report_download_url.as_deref(),
            Some("/reports/REP_20250101_120000.pdf")
        );
    }

    #[tokio::test]
    async fn test_detect_defaults_missing_confidence() {
        let router = Router::new().route(
            "/detect",
            post(|| async {
                Json(serde_json::json!({
                    "prediction": "Normal",
                    "image_url": "/static/uploads/x.jpg",
                    "report_id": "REP_1"
                }))
            }),
        );
        let base = spawn_stub(router).await;

        let result = backend(&base).analyze(png_upload()).await.unwrap();

        assert_eq!(result.prediction, Prediction::Normal);
        assert!((result.confidence - DEFAULT_CONFIDENCE).abs() < 1e-9);
        assert!(result.report_download_url.is_none());
    }

    #[tokio::test]
    async fn test_detect_non_2xx_is_an_error() {
        let router = Router::new().route(
            "/detect",
            post(|| async {
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(serde_json::json!({"error": "model exploded"})),
                )
            }),
        );
        let base = spawn_stub(router).await;

        let err = backend(&base).analyze(png_upload()).await.unwrap_err();
        assert!(matches!(err, InferenceError::BadStatus { status: 500 }));
    }

    #[tokio::test]
    async fn test_detect_unknown_prediction_rejected() {
        let router = Router::new().route(
            "/detect",
            post(|| async {
                Json(serde_json::json!({
                    "prediction": "Tuberculosis",
                    "image_url": "/x.jpg",
                    "report_id": "REP_1"
                }))
            }),
        );
        let base = spawn_stub(router).await;

        let err = backend(&base).analyze(png_upload()).await.unwrap_err();
        assert!(matches!(err, InferenceError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn test_chat_roundtrip() {
        let router = Router::new().route(
            "/chat",
            post(|Json(body): Json<serde_json::Value>| async move {
                assert_eq!(body["message"], "What are the symptoms?");
                Json(serde_json::json!({"response": "Fever and cough."}))
            }),
        );
        let base = spawn_stub(router).await;

        let reply = backend(&base).chat("What are the symptoms?").await.unwrap();
        assert_eq!(reply.role, ChatRole::Assistant);
        assert_eq!(reply.content, "Fever and cough.");
    }

    #[tokio::test]
    async fn test_unreachable_backend_reported_with_url() {
        // Bind then drop a listener so the port is very likely closed
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let base = format!("http://{}", addr);
        let err = backend(&base).chat("hello").await.unwrap_err();

        match err {
            InferenceError::Unreachable { url, .. } => assert_eq!(url, base),
            other => panic!("expected Unreachable, got {:?}", other),
        }
    }
}
