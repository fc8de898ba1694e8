//! Outbound email endpoints.

use axum::{Json, Router, extract::State, response::IntoResponse, routing::post};
use serde::{Deserialize, Serialize};

use crate::{adapters::http::app_state::AppState, app_error::AppResult};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
struct SendEmailPayload {
    to: String,
    subject: String,
    html: String,
}

#[derive(Debug, Serialize)]
struct SendEmailResponse {
    sent: bool,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/emails/transactional
async fn send_transactional(
    State(app_state): State<AppState>,
    Json(payload): Json<SendEmailPayload>,
) -> AppResult<impl IntoResponse> {
    app_state
        .email_use_cases
        .send_transactional(&payload.to, &payload.subject, &payload.html)
        .await?;

    Ok(Json(SendEmailResponse { sent: true }))
}

/// POST /api/emails/compliance
///
/// Same delivery path as the transactional endpoint, plus the configured
/// archive BCC when one is set.
async fn send_compliance(
    State(app_state): State<AppState>,
    Json(payload): Json<SendEmailPayload>,
) -> AppResult<impl IntoResponse> {
    app_state
        .email_use_cases
        .send_compliance(&payload.to, &payload.subject, &payload.html)
        .await?;

    Ok(Json(SendEmailResponse { sent: true }))
}

// ============================================================================
// Router
// ============================================================================

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/transactional", post(send_transactional))
        .route("/compliance", post(send_compliance))
}
