//! Stripe webhook intake. Events are verified, classified, and logged;
//! nothing downstream is mutated since the billing view is always read
//! fresh from the provider.

use axum::{
    Router,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::post,
};
use secrecy::ExposeSecret;
use tracing::{debug, info, warn};

use crate::{
    adapters::http::app_state::AppState,
    app_error::{AppError, AppResult},
    infra::stripe_client::StripeClient,
};

/// POST /api/webhooks/stripe
///
/// The raw body is needed for signature verification, so no JSON extractor
/// may run before the check.
async fn handle_stripe_webhook(
    State(app_state): State<AppState>,
    headers: HeaderMap,
    body: String,
) -> AppResult<impl IntoResponse> {
    let signature = headers
        .get("stripe-signature")
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| AppError::InvalidInput("Missing Stripe signature".to_string()))?;

    StripeClient::verify_webhook_signature(
        &body,
        signature,
        app_state.config.stripe_webhook_secret.expose_secret(),
    )?;

    let event: serde_json::Value = serde_json::from_str(&body)
        .map_err(|e| AppError::InvalidInput(format!("Invalid webhook payload: {}", e)))?;

    let event_type = event["type"].as_str().unwrap_or("");
    let event_id = event["id"].as_str().unwrap_or("");
    let object = &event["data"]["object"];

    match event_type {
        "checkout.session.completed" => {
            info!(
                event_id,
                session_id = object["id"].as_str().unwrap_or(""),
                mode = object["mode"].as_str().unwrap_or(""),
                amount_total = object["amount_total"].as_i64().unwrap_or(0),
                "Checkout session completed"
            );
        }
        "invoice.paid" | "invoice.payment_succeeded" => {
            info!(
                event_id,
                invoice_id = object["id"].as_str().unwrap_or(""),
                amount_paid = object["amount_paid"].as_i64().unwrap_or(0),
                "Invoice paid"
            );
        }
        "invoice.payment_failed" => {
            warn!(
                event_id,
                invoice_id = object["id"].as_str().unwrap_or(""),
                customer = object["customer"].as_str().unwrap_or(""),
                "Invoice payment failed"
            );
        }
        "customer.subscription.updated" | "customer.subscription.deleted" => {
            info!(
                event_id,
                subscription_id = object["id"].as_str().unwrap_or(""),
                status = object["status"].as_str().unwrap_or(""),
                "Subscription changed"
            );
        }
        "charge.dispute.created" => {
            warn!(
                event_id,
                charge = object["charge"].as_str().unwrap_or(""),
                "Charge disputed"
            );
        }
        _ => {
            debug!("Unhandled webhook event type: {}", event_type);
        }
    }

    Ok(StatusCode::OK)
}

pub(crate) fn router() -> Router<AppState> {
    Router::new().route("/stripe", post(handle_stripe_webhook))
}
