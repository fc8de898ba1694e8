//! Customer-facing billing records and their normalization rules.
//!
//! Each record kind has exactly one constructor that turns a raw provider
//! snapshot into the response shape: minor units become major units,
//! epoch seconds become timestamps, and missing provider values resolve to
//! the named fallback constants below.

use chrono::{DateTime, TimeZone, Utc};
use serde::Serialize;

use crate::ports::billing_provider::{CheckoutSessionInfo, InvoiceInfo, SubscriptionInfo};

/// Display name for subscriptions whose product cannot be resolved.
pub const DEFAULT_SUBSCRIPTION_NAME: &str = "Abonnement";

/// Display name for one-time purchases without a `productTitle`.
pub const DEFAULT_PURCHASE_NAME: &str = "Einmalkauf";

pub const DEFAULT_CURRENCY: &str = "EUR";

pub const DEFAULT_INTERVAL: &str = "month";

/// Checkout-session metadata key holding the purchase display name.
pub const PRODUCT_TITLE_METADATA_KEY: &str = "productTitle";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionRecord {
    pub id: String,
    pub status: String,
    pub product_name: String,
    pub current_period_start: DateTime<Utc>,
    pub current_period_end: DateTime<Utc>,
    pub cancel_at_period_end: bool,
    /// Major currency units (e.g. 29.99 for 2999 minor units).
    pub amount: f64,
    pub currency: String,
    pub interval: String,
}

impl SubscriptionRecord {
    /// Normalize a provider subscription. The product display name is
    /// resolved by the caller (it needs a provider lookup); everything else
    /// comes from the first billable item, with fallbacks when the item list
    /// is empty.
    pub fn from_provider(info: SubscriptionInfo, product_name: String) -> Self {
        let price = info.items.first().map(|item| item.price.clone());

        Self {
            id: info.id,
            status: info.status,
            product_name,
            current_period_start: timestamp_to_datetime(info.current_period_start),
            current_period_end: timestamp_to_datetime(info.current_period_end),
            cancel_at_period_end: info.cancel_at_period_end,
            amount: amount_from_minor_units(
                price.as_ref().and_then(|price| price.unit_amount).unwrap_or(0),
            ),
            currency: normalize_currency(price.as_ref().and_then(|price| price.currency.clone())),
            interval: price
                .and_then(|price| price.recurring)
                .map(|recurring| recurring.interval)
                .filter(|interval| !interval.is_empty())
                .unwrap_or_else(|| DEFAULT_INTERVAL.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseRecord {
    pub id: String,
    pub product_name: String,
    pub amount: f64,
    pub currency: String,
    pub created_at: DateTime<Utc>,
}

impl PurchaseRecord {
    /// Normalize a completed payment session. Callers are expected to have
    /// filtered with [`CheckoutSessionInfo::is_completed_payment`] already.
    pub fn from_provider(session: CheckoutSessionInfo) -> Self {
        let product_name = session
            .metadata
            .get(PRODUCT_TITLE_METADATA_KEY)
            .filter(|title| !title.is_empty())
            .cloned()
            .unwrap_or_else(|| DEFAULT_PURCHASE_NAME.to_string());

        Self {
            id: session.id,
            product_name,
            amount: amount_from_minor_units(session.amount_total.unwrap_or(0)),
            currency: normalize_currency(session.currency),
            created_at: timestamp_to_datetime(session.created),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceRecord {
    pub id: String,
    pub amount: f64,
    pub currency: String,
    /// Null when the provider recorded no paid transition.
    pub paid_at: Option<DateTime<Utc>>,
    pub invoice_url: Option<String>,
    pub invoice_pdf: Option<String>,
}

impl InvoiceRecord {
    /// Normalize a paid invoice. Callers are expected to have filtered with
    /// [`InvoiceInfo::is_paid`] already.
    pub fn from_provider(invoice: InvoiceInfo) -> Self {
        Self {
            id: invoice.id,
            amount: amount_from_minor_units(invoice.amount_paid),
            currency: normalize_currency(invoice.currency),
            paid_at: invoice.paid_at.map(timestamp_to_datetime),
            invoice_url: invoice.hosted_invoice_url,
            invoice_pdf: invoice.invoice_pdf,
        }
    }
}

/// The aggregated response: every matched account's qualifying records,
/// concatenated in account order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerBillingView {
    pub subscriptions: Vec<SubscriptionRecord>,
    pub purchases: Vec<PurchaseRecord>,
    pub invoices: Vec<InvoiceRecord>,
    pub has_stripe_account: bool,
}

impl CustomerBillingView {
    /// The response for an email with no billing account at the provider.
    /// A valid, successful outcome rather than an error.
    pub fn without_account() -> Self {
        Self {
            subscriptions: Vec::new(),
            purchases: Vec::new(),
            invoices: Vec::new(),
            has_stripe_account: false,
        }
    }
}

fn amount_from_minor_units(minor: i64) -> f64 {
    minor as f64 / 100.0
}

fn normalize_currency(raw: Option<String>) -> String {
    raw.filter(|currency| !currency.is_empty())
        .map(|currency| currency.to_uppercase())
        .unwrap_or_else(|| DEFAULT_CURRENCY.to_string())
}

fn timestamp_to_datetime(ts: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(ts, 0).single().unwrap_or_else(Utc::now)
}
