//! Thin Stripe REST client for the read paths the billing view needs, plus
//! webhook signature verification. Only the fields this service consumes are
//! modeled; everything else in Stripe's responses is ignored.

use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::collections::HashMap;

use crate::{
    app_error::{AppError, AppResult},
    infra::http_client::build_client,
};

const STRIPE_API_BASE: &str = "https://api.stripe.com/v1";

/// Seconds a webhook timestamp may differ from now before it is rejected.
const WEBHOOK_TIMESTAMP_TOLERANCE_SECS: i64 = 300;

#[derive(Clone)]
pub struct StripeClient {
    client: Client,
    secret_key: SecretString,
}

impl StripeClient {
    pub fn new(secret_key: SecretString) -> Self {
        Self {
            client: build_client(),
            secret_key,
        }
    }

    fn auth_header(&self) -> String {
        use base64::Engine;
        let encoded = base64::engine::general_purpose::STANDARD
            .encode(format!("{}:", self.secret_key.expose_secret()));
        format!("Basic {}", encoded)
    }

    // ========================================================================
    // Customers
    // ========================================================================

    pub async fn list_customers(
        &self,
        email: &str,
        limit: i32,
    ) -> AppResult<Vec<StripeCustomer>> {
        let limit = limit.to_string();
        let response = self.client
            .get(format!("{}/customers", STRIPE_API_BASE))
            .header("Authorization", self.auth_header())
            .query(&[("email", email), ("limit", limit.as_str())])
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("Stripe request failed: {}", e)))?;

        let list: StripeCustomerList = self.handle_response(response).await?;
        Ok(list.data)
    }

    // ========================================================================
    // Subscriptions
    // ========================================================================

    /// Lists with `status=all` so canceled and unpaid subscriptions come back
    /// too; the caller decides what to show.
    pub async fn list_subscriptions(
        &self,
        customer_id: &str,
        limit: i32,
    ) -> AppResult<Vec<StripeSubscription>> {
        let limit = limit.to_string();
        let response = self.client
            .get(format!("{}/subscriptions", STRIPE_API_BASE))
            .header("Authorization", self.auth_header())
            .query(&[
                ("customer", customer_id),
                ("status", "all"),
                ("limit", limit.as_str()),
            ])
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("Stripe request failed: {}", e)))?;

        let list: StripeSubscriptionList = self.handle_response(response).await?;
        Ok(list.data)
    }

    // ========================================================================
    // Products
    // ========================================================================

    pub async fn retrieve_product(&self, product_id: &str) -> AppResult<StripeProduct> {
        let response = self.client
            .get(format!("{}/products/{}", STRIPE_API_BASE, product_id))
            .header("Authorization", self.auth_header())
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("Stripe request failed: {}", e)))?;

        self.handle_response(response).await
    }

    // ========================================================================
    // Checkout Sessions
    // ========================================================================

    pub async fn list_checkout_sessions(
        &self,
        customer_id: &str,
        limit: i32,
    ) -> AppResult<Vec<StripeCheckoutSession>> {
        let limit = limit.to_string();
        let response = self.client
            .get(format!("{}/checkout/sessions", STRIPE_API_BASE))
            .header("Authorization", self.auth_header())
            .query(&[("customer", customer_id), ("limit", limit.as_str())])
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("Stripe request failed: {}", e)))?;

        let list: StripeCheckoutSessionList = self.handle_response(response).await?;
        Ok(list.data)
    }

    // ========================================================================
    // Invoices
    // ========================================================================

    pub async fn list_invoices(
        &self,
        customer_id: &str,
        limit: i32,
    ) -> AppResult<Vec<StripeInvoice>> {
        let limit = limit.to_string();
        let response = self.client
            .get(format!("{}/invoices", STRIPE_API_BASE))
            .header("Authorization", self.auth_header())
            .query(&[("customer", customer_id), ("limit", limit.as_str())])
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("Stripe request failed: {}", e)))?;

        let list: StripeInvoiceList = self.handle_response(response).await?;
        Ok(list.data)
    }

    // ========================================================================
    // Webhook Signature Verification
    // ========================================================================

    pub fn verify_webhook_signature(
        payload: &str,
        signature_header: &str,
        webhook_secret: &str,
    ) -> AppResult<()> {
        use hmac::{Hmac, Mac};
        use sha2::Sha256;

        // Parse signature header: "t=timestamp,v1=signature,..."
        let mut timestamp: Option<&str> = None;
        let mut signatures: Vec<&str> = Vec::new();

        for part in signature_header.split(',') {
            let kv: Vec<&str> = part.splitn(2, '=').collect();
            if kv.len() != 2 {
                continue;
            }
            match kv[0] {
                "t" => timestamp = Some(kv[1]),
                "v1" => signatures.push(kv[1]),
                _ => {}
            }
        }

        let timestamp = timestamp.ok_or_else(|| {
            AppError::InvalidInput("Missing timestamp in signature".into())
        })?;

        if signatures.is_empty() {
            return Err(AppError::InvalidInput("Missing signature".into()));
        }

        // Compute expected signature over "timestamp.payload"
        let signed_payload = format!("{}.{}", timestamp, payload);
        let mut mac = Hmac::<Sha256>::new_from_slice(webhook_secret.as_bytes())
            .map_err(|_| AppError::Internal("HMAC error".into()))?;
        mac.update(signed_payload.as_bytes());
        let expected = hex::encode(mac.finalize().into_bytes());

        // Check if any signature matches
        for sig in signatures {
            if constant_time_compare(sig, &expected) {
                // Verify timestamp is within tolerance (5 minutes)
                let ts: i64 = timestamp.parse().map_err(|_| {
                    AppError::InvalidInput("Invalid timestamp".into())
                })?;
                let now = chrono::Utc::now().timestamp();
                if (now - ts).abs() > WEBHOOK_TIMESTAMP_TOLERANCE_SECS {
                    return Err(AppError::InvalidInput("Timestamp too old".into()));
                }
                return Ok(());
            }
        }

        Err(AppError::InvalidInput("Invalid signature".into()))
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    async fn handle_response<T: for<'de> Deserialize<'de>>(
        &self,
        response: reqwest::Response,
    ) -> AppResult<T> {
        let status = response.status();
        let body = response.text().await.map_err(|e| {
            AppError::Upstream(format!("Failed to read Stripe response: {}", e))
        })?;

        if !status.is_success() {
            tracing::error!(status = %status, body = %body, "Stripe API error");

            // Surface Stripe's own message verbatim when the error body parses.
            if let Ok(error) = serde_json::from_str::<StripeErrorResponse>(&body) {
                return Err(AppError::Upstream(
                    error.error.message.unwrap_or(error.error.error_type),
                ));
            }

            return Err(AppError::Upstream(format!(
                "Stripe API error: {} - {}",
                status, body
            )));
        }

        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(body = %body, error = %e, "Failed to parse Stripe response");
            AppError::Upstream(format!("Failed to parse Stripe response: {}", e))
        })
    }
}

fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut result = 0u8;
    for (x, y) in a.bytes().zip(b.bytes()) {
        result |= x ^ y;
    }
    result == 0
}

// ============================================================================
// Stripe Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct StripeCustomer {
    pub id: String,
    pub email: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StripeCustomerList {
    pub data: Vec<StripeCustomer>,
}

#[derive(Debug, Deserialize)]
pub struct StripeSubscription {
    pub id: String,
    pub status: String,
    pub cancel_at_period_end: bool,
    pub current_period_start: i64,
    pub current_period_end: i64,
    pub items: StripeSubscriptionItems,
}

#[derive(Debug, Deserialize)]
pub struct StripeSubscriptionList {
    pub data: Vec<StripeSubscription>,
}

#[derive(Debug, Deserialize)]
pub struct StripeSubscriptionItems {
    pub data: Vec<StripeSubscriptionItem>,
}

#[derive(Debug, Deserialize)]
pub struct StripeSubscriptionItem {
    pub price: StripePrice,
}

#[derive(Debug, Deserialize)]
pub struct StripePrice {
    pub product: Option<String>,
    pub unit_amount: Option<i64>,
    pub currency: Option<String>,
    pub recurring: Option<StripePriceRecurring>,
}

#[derive(Debug, Deserialize)]
pub struct StripePriceRecurring {
    pub interval: String,
}

#[derive(Debug, Deserialize)]
pub struct StripeProduct {
    pub id: String,
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StripeCheckoutSession {
    pub id: String,
    pub status: Option<String>,
    pub mode: Option<String>,
    pub amount_total: Option<i64>,
    pub currency: Option<String>,
    pub created: i64,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
pub struct StripeCheckoutSessionList {
    pub data: Vec<StripeCheckoutSession>,
}

#[derive(Debug, Deserialize)]
pub struct StripeInvoice {
    pub id: String,
    pub status: Option<String>,
    pub amount_paid: i64,
    pub currency: Option<String>,
    pub hosted_invoice_url: Option<String>,
    pub invoice_pdf: Option<String>,
    pub status_transitions: Option<StripeInvoiceStatusTransitions>,
}

#[derive(Debug, Deserialize)]
pub struct StripeInvoiceStatusTransitions {
    pub paid_at: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct StripeInvoiceList {
    pub data: Vec<StripeInvoice>,
}

#[derive(Debug, Deserialize)]
pub struct StripeErrorResponse {
    pub error: StripeError,
}

#[derive(Debug, Deserialize)]
pub struct StripeError {
    #[serde(rename = "type")]
    pub error_type: String,
    pub message: Option<String>,
    pub code: Option<String>,
}
