//! Billing provider port: the read-side contract the billing aggregation
//! consumes.
//!
//! Implementations return raw provider values (epoch seconds, minor currency
//! units). Normalization into customer-facing records happens in
//! `domain::entities::billing_records`, so port types stay faithful to what
//! the provider returned.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::app_error::AppResult;

// ===== Port Types - Provider-agnostic billing snapshots =====

/// Provider-assigned billing account id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CustomerId(pub String);

impl CustomerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CustomerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A billing account at the provider. A person may own several under the
/// same email address; the aggregation treats each as a separate source.
#[derive(Debug, Clone, PartialEq)]
pub struct CustomerInfo {
    pub id: CustomerId,
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SubscriptionInfo {
    pub id: String,
    /// Provider status string (`active`, `trialing`, `past_due`, ...),
    /// passed through untouched.
    pub status: String,
    pub cancel_at_period_end: bool,
    pub current_period_start: i64,
    pub current_period_end: i64,
    pub items: Vec<SubscriptionItemInfo>,
}

impl SubscriptionInfo {
    /// Product id referenced by the first billable item, if any.
    pub fn first_product_id(&self) -> Option<String> {
        self.items.first().and_then(|item| item.price.product.clone())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SubscriptionItemInfo {
    pub price: PriceInfo,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PriceInfo {
    pub product: Option<String>,
    /// Unit price in minor currency units.
    pub unit_amount: Option<i64>,
    pub currency: Option<String>,
    pub recurring: Option<RecurringInfo>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecurringInfo {
    pub interval: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProductInfo {
    pub id: String,
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutSessionInfo {
    pub id: String,
    pub status: Option<String>,
    pub mode: Option<String>,
    /// Session total in minor currency units.
    pub amount_total: Option<i64>,
    pub currency: Option<String>,
    pub created: i64,
    pub metadata: HashMap<String, String>,
}

impl CheckoutSessionInfo {
    /// Whether this session counts as a one-time purchase: completed and in
    /// payment mode. Subscription-mode and unfinished sessions do not.
    pub fn is_completed_payment(&self) -> bool {
        self.status.as_deref() == Some("complete") && self.mode.as_deref() == Some("payment")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceInfo {
    pub id: String,
    pub status: Option<String>,
    /// Amount actually paid, in minor currency units.
    pub amount_paid: i64,
    pub currency: Option<String>,
    pub hosted_invoice_url: Option<String>,
    pub invoice_pdf: Option<String>,
    /// Epoch seconds of the paid transition, when the provider recorded one.
    pub paid_at: Option<i64>,
}

impl InvoiceInfo {
    pub fn is_paid(&self) -> bool {
        self.status.as_deref() == Some("paid")
    }
}

// ===== Port Trait =====

/// Read-side access to the billing provider. All list calls take an explicit
/// `limit` that is forwarded to the provider.
#[async_trait]
pub trait BillingProviderPort: Send + Sync {
    /// Accounts matching `email` exactly (match semantics are
    /// provider-defined; no case or whitespace normalization here).
    async fn find_customers_by_email(
        &self,
        email: &str,
        limit: i32,
    ) -> AppResult<Vec<CustomerInfo>>;

    async fn list_subscriptions(
        &self,
        customer_id: &CustomerId,
        limit: i32,
    ) -> AppResult<Vec<SubscriptionInfo>>;

    /// Resolve a product for display naming.
    async fn retrieve_product(&self, product_id: &str) -> AppResult<ProductInfo>;

    async fn list_checkout_sessions(
        &self,
        customer_id: &CustomerId,
        limit: i32,
    ) -> AppResult<Vec<CheckoutSessionInfo>>;

    async fn list_invoices(
        &self,
        customer_id: &CustomerId,
        limit: i32,
    ) -> AppResult<Vec<InvoiceInfo>>;
}
