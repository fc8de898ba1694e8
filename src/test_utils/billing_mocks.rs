//! In-memory mock implementations of the billing provider port.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::{
    app_error::{AppError, AppResult},
    application::ports::billing_provider::{
        BillingProviderPort, CheckoutSessionInfo, CustomerId, CustomerInfo, InvoiceInfo,
        ProductInfo, SubscriptionInfo,
    },
};

// ============================================================================
// InMemoryBillingProvider
// ============================================================================

/// Provider backed by per-customer record maps. List calls honor the
/// requested limit the way the real provider does.
#[derive(Default)]
pub struct InMemoryBillingProvider {
    pub customers: Mutex<Vec<CustomerInfo>>,
    pub subscriptions: Mutex<HashMap<String, Vec<SubscriptionInfo>>>,
    pub checkout_sessions: Mutex<HashMap<String, Vec<CheckoutSessionInfo>>>,
    pub invoices: Mutex<HashMap<String, Vec<InvoiceInfo>>>,
    pub products: Mutex<HashMap<String, ProductInfo>>,
    product_lookups: AtomicUsize,
    subscriptions_error: Mutex<Option<String>>,
    delays: Mutex<HashMap<String, Duration>>,
}

impl InMemoryBillingProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_customers(customers: Vec<CustomerInfo>) -> Self {
        Self {
            customers: Mutex::new(customers),
            ..Self::default()
        }
    }

    pub fn add_product(&self, product: ProductInfo) {
        self.products
            .lock()
            .unwrap()
            .insert(product.id.clone(), product);
    }

    pub fn add_subscriptions(&self, customer_id: &str, subscriptions: Vec<SubscriptionInfo>) {
        self.subscriptions
            .lock()
            .unwrap()
            .entry(customer_id.to_string())
            .or_default()
            .extend(subscriptions);
    }

    pub fn add_checkout_sessions(&self, customer_id: &str, sessions: Vec<CheckoutSessionInfo>) {
        self.checkout_sessions
            .lock()
            .unwrap()
            .entry(customer_id.to_string())
            .or_default()
            .extend(sessions);
    }

    pub fn add_invoices(&self, customer_id: &str, invoices: Vec<InvoiceInfo>) {
        self.invoices
            .lock()
            .unwrap()
            .entry(customer_id.to_string())
            .or_default()
            .extend(invoices);
    }

    /// Make every subsequent `list_subscriptions` call fail with `message`.
    pub fn fail_subscriptions(&self, message: &str) {
        *self.subscriptions_error.lock().unwrap() = Some(message.to_string());
    }

    /// Delay every list call for `customer_id` by `delay`. Lets tests skew
    /// per-account latency without a separate mock.
    pub fn delay_account(&self, customer_id: &str, delay: Duration) {
        self.delays
            .lock()
            .unwrap()
            .insert(customer_id.to_string(), delay);
    }

    pub fn product_lookup_count(&self) -> usize {
        self.product_lookups.load(Ordering::SeqCst)
    }

    async fn account_delay(&self, customer_id: &CustomerId) {
        // Copy the delay out before sleeping; the guard must not live
        // across the await.
        let delay = self
            .delays
            .lock()
            .unwrap()
            .get(customer_id.as_str())
            .copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }

    fn records_for<T: Clone>(
        map: &Mutex<HashMap<String, Vec<T>>>,
        customer_id: &CustomerId,
        limit: i32,
    ) -> Vec<T> {
        let mut records = map
            .lock()
            .unwrap()
            .get(customer_id.as_str())
            .cloned()
            .unwrap_or_default();
        records.truncate(limit as usize);
        records
    }
}

#[async_trait]
impl BillingProviderPort for InMemoryBillingProvider {
    async fn find_customers_by_email(
        &self,
        email: &str,
        limit: i32,
    ) -> AppResult<Vec<CustomerInfo>> {
        Ok(self
            .customers
            .lock()
            .unwrap()
            .iter()
            .filter(|customer| customer.email.as_deref() == Some(email))
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn list_subscriptions(
        &self,
        customer_id: &CustomerId,
        limit: i32,
    ) -> AppResult<Vec<SubscriptionInfo>> {
        self.account_delay(customer_id).await;
        if let Some(message) = self.subscriptions_error.lock().unwrap().clone() {
            return Err(AppError::Upstream(message));
        }
        Ok(Self::records_for(&self.subscriptions, customer_id, limit))
    }

    async fn retrieve_product(&self, product_id: &str) -> AppResult<ProductInfo> {
        self.product_lookups.fetch_add(1, Ordering::SeqCst);
        self.products
            .lock()
            .unwrap()
            .get(product_id)
            .cloned()
            .ok_or_else(|| AppError::Upstream(format!("No such product: {}", product_id)))
    }

    async fn list_checkout_sessions(
        &self,
        customer_id: &CustomerId,
        limit: i32,
    ) -> AppResult<Vec<CheckoutSessionInfo>> {
        self.account_delay(customer_id).await;
        Ok(Self::records_for(
            &self.checkout_sessions,
            customer_id,
            limit,
        ))
    }

    async fn list_invoices(
        &self,
        customer_id: &CustomerId,
        limit: i32,
    ) -> AppResult<Vec<InvoiceInfo>> {
        self.account_delay(customer_id).await;
        Ok(Self::records_for(&self.invoices, customer_id, limit))
    }
}

// ============================================================================
// FailingBillingProvider
// ============================================================================

/// Fails every call with a fixed upstream message.
pub struct FailingBillingProvider {
    message: String,
}

impl FailingBillingProvider {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }

    fn fail<T>(&self) -> AppResult<T> {
        Err(AppError::Upstream(self.message.clone()))
    }
}

#[async_trait]
impl BillingProviderPort for FailingBillingProvider {
    async fn find_customers_by_email(
        &self,
        _email: &str,
        _limit: i32,
    ) -> AppResult<Vec<CustomerInfo>> {
        self.fail()
    }

    async fn list_subscriptions(
        &self,
        _customer_id: &CustomerId,
        _limit: i32,
    ) -> AppResult<Vec<SubscriptionInfo>> {
        self.fail()
    }

    async fn retrieve_product(&self, _product_id: &str) -> AppResult<ProductInfo> {
        self.fail()
    }

    async fn list_checkout_sessions(
        &self,
        _customer_id: &CustomerId,
        _limit: i32,
    ) -> AppResult<Vec<CheckoutSessionInfo>> {
        self.fail()
    }

    async fn list_invoices(
        &self,
        _customer_id: &CustomerId,
        _limit: i32,
    ) -> AppResult<Vec<InvoiceInfo>> {
        self.fail()
    }
}

// ============================================================================
// SlowBillingProvider
// ============================================================================

/// Sleeps before answering every call; drives timeout tests.
pub struct SlowBillingProvider {
    pub delay: Duration,
}

#[async_trait]
impl BillingProviderPort for SlowBillingProvider {
    async fn find_customers_by_email(
        &self,
        email: &str,
        _limit: i32,
    ) -> AppResult<Vec<CustomerInfo>> {
        tokio::time::sleep(self.delay).await;
        Ok(vec![CustomerInfo {
            id: CustomerId::new("cus_slow"),
            email: Some(email.to_string()),
        }])
    }

    async fn list_subscriptions(
        &self,
        _customer_id: &CustomerId,
        _limit: i32,
    ) -> AppResult<Vec<SubscriptionInfo>> {
        tokio::time::sleep(self.delay).await;
        Ok(Vec::new())
    }

    async fn retrieve_product(&self, product_id: &str) -> AppResult<ProductInfo> {
        tokio::time::sleep(self.delay).await;
        Ok(ProductInfo {
            id: product_id.to_string(),
            name: None,
        })
    }

    async fn list_checkout_sessions(
        &self,
        _customer_id: &CustomerId,
        _limit: i32,
    ) -> AppResult<Vec<CheckoutSessionInfo>> {
        tokio::time::sleep(self.delay).await;
        Ok(Vec::new())
    }

    async fn list_invoices(
        &self,
        _customer_id: &CustomerId,
        _limit: i32,
    ) -> AppResult<Vec<InvoiceInfo>> {
        tokio::time::sleep(self.delay).await;
        Ok(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{create_test_customer, create_test_invoice};

    #[tokio::test]
    async fn lookup_matches_on_exact_email_only() {
        let provider = InMemoryBillingProvider::with_customers(vec![
            create_test_customer("cus_a", "kunde@example.com"),
            create_test_customer("cus_b", "andere@example.com"),
        ]);

        let found = provider
            .find_customers_by_email("kunde@example.com", 10)
            .await
            .unwrap();

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id.as_str(), "cus_a");
    }

    #[tokio::test]
    async fn list_calls_honor_the_limit() {
        let provider =
            InMemoryBillingProvider::with_customers(vec![create_test_customer("cus_a", "k@e.com")]);
        provider.add_invoices(
            "cus_a",
            (0..5)
                .map(|index| {
                    create_test_invoice(move |invoice| {
                        invoice.id = format!("in_{index}");
                    })
                })
                .collect(),
        );

        let invoices = provider
            .list_invoices(&CustomerId::new("cus_a"), 3)
            .await
            .unwrap();

        assert_eq!(invoices.len(), 3);
    }

    #[tokio::test]
    async fn missing_product_is_an_upstream_error() {
        let provider = InMemoryBillingProvider::new();

        let error = provider.retrieve_product("prod_missing").await.unwrap_err();

        assert!(matches!(error, AppError::Upstream(message) if message.contains("prod_missing")));
        assert_eq!(provider.product_lookup_count(), 1);
    }
}
