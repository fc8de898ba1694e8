//! Stripe-backed implementation of the billing provider port. All the
//! wire-to-port mapping lives here so the application layer never sees a
//! Stripe shape.

use async_trait::async_trait;
use secrecy::SecretString;

use crate::{
    app_error::AppResult,
    application::ports::billing_provider::{
        BillingProviderPort, CheckoutSessionInfo, CustomerId, CustomerInfo, InvoiceInfo,
        PriceInfo, ProductInfo, RecurringInfo, SubscriptionInfo, SubscriptionItemInfo,
    },
    infra::stripe_client::{
        StripeCheckoutSession, StripeClient, StripeCustomer, StripeInvoice, StripePrice,
        StripeProduct, StripeSubscription, StripeSubscriptionItem,
    },
};

#[derive(Clone)]
pub struct StripeBillingAdapter {
    client: StripeClient,
}

impl StripeBillingAdapter {
    pub fn new(secret_key: SecretString) -> Self {
        Self {
            client: StripeClient::new(secret_key),
        }
    }
}

#[async_trait]
impl BillingProviderPort for StripeBillingAdapter {
    async fn find_customers_by_email(
        &self,
        email: &str,
        limit: i32,
    ) -> AppResult<Vec<CustomerInfo>> {
        let customers = self.client.list_customers(email, limit).await?;
        Ok(customers.into_iter().map(map_customer).collect())
    }

    async fn list_subscriptions(
        &self,
        customer_id: &CustomerId,
        limit: i32,
    ) -> AppResult<Vec<SubscriptionInfo>> {
        let subscriptions = self
            .client
            .list_subscriptions(customer_id.as_str(), limit)
            .await?;
        Ok(subscriptions.into_iter().map(map_subscription).collect())
    }

    async fn retrieve_product(&self, product_id: &str) -> AppResult<ProductInfo> {
        let product = self.client.retrieve_product(product_id).await?;
        Ok(map_product(product))
    }

    async fn list_checkout_sessions(
        &self,
        customer_id: &CustomerId,
        limit: i32,
    ) -> AppResult<Vec<CheckoutSessionInfo>> {
        let sessions = self
            .client
            .list_checkout_sessions(customer_id.as_str(), limit)
            .await?;
        Ok(sessions.into_iter().map(map_session).collect())
    }

    async fn list_invoices(
        &self,
        customer_id: &CustomerId,
        limit: i32,
    ) -> AppResult<Vec<InvoiceInfo>> {
        let invoices = self
            .client
            .list_invoices(customer_id.as_str(), limit)
            .await?;
        Ok(invoices.into_iter().map(map_invoice).collect())
    }
}

// ============================================================================
// Wire -> Port Mapping
// ============================================================================

fn map_customer(customer: StripeCustomer) -> CustomerInfo {
    CustomerInfo {
        id: CustomerId::new(customer.id),
        email: customer.email,
    }
}

fn map_subscription(subscription: StripeSubscription) -> SubscriptionInfo {
    SubscriptionInfo {
        id: subscription.id,
        status: subscription.status,
        cancel_at_period_end: subscription.cancel_at_period_end,
        current_period_start: subscription.current_period_start,
        current_period_end: subscription.current_period_end,
        items: subscription.items.data.into_iter().map(map_item).collect(),
    }
}

fn map_item(item: StripeSubscriptionItem) -> SubscriptionItemInfo {
    SubscriptionItemInfo {
        price: map_price(item.price),
    }
}

fn map_price(price: StripePrice) -> PriceInfo {
    PriceInfo {
        product: price.product,
        unit_amount: price.unit_amount,
        currency: price.currency,
        recurring: price.recurring.map(|recurring| RecurringInfo {
            interval: recurring.interval,
        }),
    }
}

fn map_product(product: StripeProduct) -> ProductInfo {
    ProductInfo {
        id: product.id,
        name: product.name,
    }
}

fn map_session(session: StripeCheckoutSession) -> CheckoutSessionInfo {
    CheckoutSessionInfo {
        id: session.id,
        status: session.status,
        mode: session.mode,
        amount_total: session.amount_total,
        currency: session.currency,
        created: session.created,
        metadata: session.metadata,
    }
}

fn map_invoice(invoice: StripeInvoice) -> InvoiceInfo {
    InvoiceInfo {
        id: invoice.id,
        status: invoice.status,
        amount_paid: invoice.amount_paid,
        currency: invoice.currency,
        hosted_invoice_url: invoice.hosted_invoice_url,
        invoice_pdf: invoice.invoice_pdf,
        // Stripe reports the payment moment under status_transitions.
        paid_at: invoice
            .status_transitions
            .and_then(|transitions| transitions.paid_at),
    }
}
