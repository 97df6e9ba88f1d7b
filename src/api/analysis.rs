//! X-ray analysis API endpoints
//!
//! Handles the upload-and-classify flow:
//! - POST /api/v1/analysis - Analyze an uploaded chest X-ray
//! - GET /api/v1/analysis/history - The current user's past analyses
//!
//! The upload is validated against the upload configuration before it is
//! handed to the inference backend; backend failures surface as a single
//! error with a human-readable hint, with no retry.

use axum::{
    extract::{Multipart, State},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;

use crate::api::middleware::{ApiError, AppState, AuthenticatedUser};
use crate::inference::{InferenceError, XrayUpload};
use crate::models::{AnalysisRecord, XrayAnalysis};

/// Response for a completed analysis
#[derive(Debug, Serialize)]
pub struct AnalysisResponse {
    pub prediction: String,
    pub confidence: f64,
    pub image_url: String,
    pub report_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report_download_url: Option<String>,
    pub timestamp: String,
}

impl From<XrayAnalysis> for AnalysisResponse {
    fn from(analysis: XrayAnalysis) -> Self {
        Self {
            prediction: analysis.prediction.to_string(),
            confidence: analysis.confidence,
            image_url: analysis.image_url,
            report_id: analysis.report_id,
            report_download_url: analysis.report_download_url,
            timestamp: analysis.created_at.to_rfc3339(),
        }
    }
}

/// Response for the analysis history listing
#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub analyses: Vec<AnalysisResponse>,
}

/// Build the analysis router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(analyze))
        .route("/history", get(history))
}

/// POST /api/v1/analysis - Analyze an uploaded chest X-ray
///
/// Requires authentication.
/// Accepts multipart/form-data with a single image field named "file".
async fn analyze(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    mut multipart: Multipart,
) -> Result<Json<AnalysisResponse>, ApiError> {
    let config = &state.upload_config;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::internal_error(format!("Failed to read multipart: {}", e)))?
    {
        let name = field.name().unwrap_or("").to_string();
        if name != "file" {
            continue;
        }

        let filename = field
            .file_name()
            .map(|s| s.to_string())
            .unwrap_or_else(|| "xray".to_string());

        let content_type = field
            .content_type()
            .map(|s| s.to_string())
            .unwrap_or_else(|| "application/octet-stream".to_string());

        // Validate content type
        if !config.is_type_allowed(&content_type) {
            return Err(ApiError::validation_error(format!(
                "Invalid file type: {}. Please upload an image file (JPEG, PNG).",
                content_type
            )));
        }

        // Read file data
        let data = field
            .bytes()
            .await
            .map_err(|e| ApiError::internal_error(format!("Failed to read file: {}", e)))?;

        // Validate file size
        if data.len() as u64 > config.max_file_size {
            return Err(ApiError::validation_error(format!(
                "File too large. Maximum size: {} MB",
                config.max_file_size / 1024 / 1024
            )));
        }

        let upload = XrayUpload {
            filename,
            content_type,
            data: data.to_vec(),
        };

        let analysis = state
            .inference
            .analyze(upload)
            .await
            .map_err(inference_error_to_api)?;

        state
            .analysis_repo
            .record(user.0.id, &analysis)
            .await
            .map_err(|e| ApiError::internal_error(e.to_string()))?;

        return Ok(Json(analysis.into()));
    }

    Err(ApiError::validation_error("No file provided"))
}

/// GET /api/v1/analysis/history - The current user's past analyses
///
/// Requires authentication. Newest first.
async fn history(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<HistoryResponse>, ApiError> {
    let records = state
        .analysis_repo
        .list_for_user(user.0.id)
        .await
        .map_err(|e| ApiError::internal_error(e.to_string()))?;

    Ok(Json(HistoryResponse {
        analyses: records
            .into_iter()
            .map(|r: AnalysisRecord| r.analysis.into())
            .collect(),
    }))
}

/// Map inference failures onto API errors
pub fn inference_error_to_api(err: InferenceError) -> ApiError {
    match err {
        InferenceError::Unreachable { .. } | InferenceError::BadStatus { .. } => {
            ApiError::backend_error(err.to_string())
        }
        InferenceError::InvalidResponse(_) => ApiError::backend_error(err.to_string()),
        InferenceError::Internal(e) => ApiError::internal_error(e.to_string()),
    }
}
