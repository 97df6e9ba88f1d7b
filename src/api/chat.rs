//! Chat API endpoint
//!
//! - POST /api/v1/chat - Ask the lung-health assistant a question
//!
//! Chat history lives only in the chatbot page; the server answers one
//! message at a time and keeps nothing.

use axum::{extract::State, routing::post, Json, Router};
use serde::Deserialize;

use crate::api::analysis::inference_error_to_api;
use crate::api::middleware::{ApiError, AppState, AuthenticatedUser};
use crate::models::ChatMessage;

/// Request body for a chat message
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

/// Build the chat router
pub fn router() -> Router<AppState> {
    Router::new().route("/", post(chat))
}

/// POST /api/v1/chat - Ask the assistant a question
///
/// Requires authentication. Returns the assistant's message.
async fn chat(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Json(body): Json<ChatRequest>,
) -> Result<Json<ChatMessage>, ApiError> {
    if body.message.trim().is_empty() {
        return Err(ApiError::validation_error("Message cannot be empty"));
    }

    let reply = state
        .inference
        .chat(&body.message)
        .await
        .map_err(inference_error_to_api)?;

    Ok(Json(reply))
}
