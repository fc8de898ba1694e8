//! Aggregates a customer's commerce history across every billing account
//! matching their email address into one normalized view.

use futures::stream::{self, StreamExt, TryStreamExt};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument, warn};

use crate::{
    app_error::{AppError, AppResult},
    application::ports::billing_provider::{
        BillingProviderPort, CheckoutSessionInfo, CustomerId, InvoiceInfo, SubscriptionInfo,
    },
    domain::entities::billing_records::{
        CustomerBillingView, DEFAULT_SUBSCRIPTION_NAME, InvoiceRecord, PurchaseRecord,
        SubscriptionRecord,
    },
};

/// Accounts resolved per email.
const CUSTOMER_LOOKUP_LIMIT: i32 = 10;

/// Records fetched per account and kind.
const SUBSCRIPTION_FETCH_LIMIT: i32 = 10;
const CHECKOUT_SESSION_FETCH_LIMIT: i32 = 20;
const INVOICE_FETCH_LIMIT: i32 = 10;

/// Accounts fetched in flight at once. Keeps the worst case (10 accounts x
/// 3 list calls plus product lookups) from hitting the provider all at once.
const ACCOUNT_FETCH_CONCURRENCY: usize = 4;

type AccountRecords = (
    Vec<SubscriptionInfo>,
    Vec<CheckoutSessionInfo>,
    Vec<InvoiceInfo>,
);

#[derive(Clone)]
pub struct CustomerBillingUseCases {
    provider: Arc<dyn BillingProviderPort>,
    view_timeout: Duration,
}

impl CustomerBillingUseCases {
    pub fn new(provider: Arc<dyn BillingProviderPort>, view_timeout: Duration) -> Self {
        Self {
            provider,
            view_timeout,
        }
    }

    /// Build the aggregated billing view for `customer_email`.
    ///
    /// The whole aggregation runs under one bounded timeout; expiry surfaces
    /// as an upstream error like any other provider failure.
    #[instrument(skip(self))]
    pub async fn customer_billing_view(
        &self,
        customer_email: &str,
    ) -> AppResult<CustomerBillingView> {
        match tokio::time::timeout(self.view_timeout, self.build_view(customer_email)).await {
            Ok(result) => result,
            Err(_) => Err(AppError::Upstream(format!(
                "Billing data aggregation timed out after {}s",
                self.view_timeout.as_secs()
            ))),
        }
    }

    async fn build_view(&self, customer_email: &str) -> AppResult<CustomerBillingView> {
        let customers = self
            .provider
            .find_customers_by_email(customer_email, CUSTOMER_LOOKUP_LIMIT)
            .await?;

        if customers.is_empty() {
            debug!("No billing accounts matched the email");
            return Ok(CustomerBillingView::without_account());
        }

        // The three list calls per account run in parallel; accounts fan out
        // through a bounded stream whose output keeps account order. Any
        // failed call fails the whole aggregation. The stream is fed owned
        // ids: a closure borrowing from `customers` fails the lifetime
        // bounds axum places on the handler future.
        let customer_ids: Vec<CustomerId> = customers
            .iter()
            .map(|customer| customer.id.clone())
            .collect();
        let account_records: Vec<AccountRecords> = stream::iter(customer_ids)
            .map(|customer_id| async move { self.fetch_account_records(&customer_id).await })
            .buffered(ACCOUNT_FETCH_CONCURRENCY)
            .try_collect()
            .await?;

        let mut view = CustomerBillingView {
            subscriptions: Vec::new(),
            purchases: Vec::new(),
            invoices: Vec::new(),
            has_stripe_account: true,
        };
        let mut product_names: HashMap<String, String> = HashMap::new();

        for (subscriptions, sessions, invoices) in account_records {
            for subscription in subscriptions {
                let product_name = self
                    .resolve_product_name(&subscription, &mut product_names)
                    .await;
                view.subscriptions
                    .push(SubscriptionRecord::from_provider(subscription, product_name));
            }

            view.purchases.extend(
                sessions
                    .into_iter()
                    .filter(CheckoutSessionInfo::is_completed_payment)
                    .map(PurchaseRecord::from_provider),
            );

            view.invoices.extend(
                invoices
                    .into_iter()
                    .filter(InvoiceInfo::is_paid)
                    .map(InvoiceRecord::from_provider),
            );
        }

        Ok(view)
    }

    async fn fetch_account_records(&self, customer_id: &CustomerId) -> AppResult<AccountRecords> {
        tokio::try_join!(
            self.provider
                .list_subscriptions(customer_id, SUBSCRIPTION_FETCH_LIMIT),
            self.provider
                .list_checkout_sessions(customer_id, CHECKOUT_SESSION_FETCH_LIMIT),
            self.provider.list_invoices(customer_id, INVOICE_FETCH_LIMIT),
        )
    }

    /// Resolve the display name of a subscription's product, memoized per
    /// request so repeated product ids cost a single provider lookup. A
    /// failed or empty lookup degrades to the default name rather than
    /// failing the aggregation.
    async fn resolve_product_name(
        &self,
        subscription: &SubscriptionInfo,
        names: &mut HashMap<String, String>,
    ) -> String {
        let Some(product_id) = subscription.first_product_id() else {
            return DEFAULT_SUBSCRIPTION_NAME.to_string();
        };

        if let Some(name) = names.get(&product_id) {
            return name.clone();
        }

        let name = match self.provider.retrieve_product(&product_id).await {
            Ok(product) => product
                .name
                .filter(|name| !name.is_empty())
                .unwrap_or_else(|| DEFAULT_SUBSCRIPTION_NAME.to_string()),
            Err(error) => {
                warn!(%product_id, %error, "Product lookup failed, using fallback name");
                DEFAULT_SUBSCRIPTION_NAME.to_string()
            }
        };

        names.insert(product_id, name.clone());
        name
    }
}
