//! Customer billing data endpoint backing the account page.

use axum::{Json, Router, body::Bytes, extract::State, response::IntoResponse, routing::post};
use serde::Deserialize;

use crate::{
    adapters::http::app_state::AppState,
    app_error::{AppError, AppResult},
};

// ============================================================================
// Request Types
// ============================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CustomerDataPayload {
    customer_email: Option<String>,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/billing/customer-data
///
/// The body is read as raw bytes: an absent, non-UTF-8, non-JSON, or
/// field-less body must all yield the same 400 shape rather than an
/// extractor rejection.
async fn get_customer_data(
    State(app_state): State<AppState>,
    body: Bytes,
) -> AppResult<impl IntoResponse> {
    let body = String::from_utf8_lossy(&body);
    let payload: CustomerDataPayload = serde_json::from_str(&body).unwrap_or_default();

    let customer_email = payload
        .customer_email
        .filter(|email| !email.is_empty())
        .ok_or_else(|| AppError::InvalidInput("customerEmail required".to_string()))?;

    let view = app_state
        .billing_use_cases
        .customer_billing_view(&customer_email)
        .await?;

    Ok(Json(view))
}

// ============================================================================
// Router
// ============================================================================

pub(crate) fn router() -> Router<AppState> {
    Router::new().route("/customer-data", post(get_customer_data))
}
