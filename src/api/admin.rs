//! Admin API endpoints
//!
//! Handles HTTP requests for the admin dashboard:
//! - GET /api/v1/admin/patients - List registered patients
//! - GET /api/v1/admin/stats - Analytics counters

use axum::{
    extract::State,
    routing::get,
    Json, Router,
};
use serde::Serialize;

use crate::api::auth::UserResponse;
use crate::api::middleware::{ApiError, AppState};

/// Response for the patient list
#[derive(Debug, Serialize)]
pub struct PatientListResponse {
    pub patients: Vec<UserResponse>,
    pub total: usize,
}

/// Response for dashboard analytics
#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub total_patients: i64,
    pub total_analyses: i64,
    pub pneumonia_detected: i64,
}

/// Build the admin router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/patients", get(list_patients))
        .route("/stats", get(stats))
}

/// GET /api/v1/admin/patients - List registered patients
///
/// Returns all non-admin users. Requires admin privileges.
async fn list_patients(
    State(state): State<AppState>,
) -> Result<Json<PatientListResponse>, ApiError> {
    let patients = state
        .auth_service
        .list_patients()
        .await
        .map_err(|e| ApiError::internal_error(e.to_string()))?;

    let patients: Vec<UserResponse> = patients.into_iter().map(Into::into).collect();
    let total = patients.len();

    Ok(Json(PatientListResponse { patients, total }))
}

/// GET /api/v1/admin/stats - Analytics counters
///
/// Requires admin privileges.
async fn stats(State(state): State<AppState>) -> Result<Json<StatsResponse>, ApiError> {
    let patients = state
        .auth_service
        .list_patients()
        .await
        .map_err(|e| ApiError::internal_error(e.to_string()))?;

    let total_analyses = state
        .analysis_repo
        .count()
        .await
        .map_err(|e| ApiError::internal_error(e.to_string()))?;

    let pneumonia_detected = state
        .analysis_repo
        .count_pneumonia()
        .await
        .map_err(|e| ApiError::internal_error(e.to_string()))?;

    Ok(Json(StatsResponse {
        total_patients: patients.len() as i64,
        total_analyses,
        pneumonia_detected,
    }))
}
