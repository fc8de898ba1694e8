use std::sync::Arc;

use crate::{
    application::use_cases::{
        customer_billing::CustomerBillingUseCases, outbound_email::OutboundEmailUseCases,
    },
    infra::config::AppConfig,
};

/// Shared state handed to every handler. Cheap to clone, everything inside
/// is behind an Arc.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub billing_use_cases: Arc<CustomerBillingUseCases>,
    pub email_use_cases: Arc<OutboundEmailUseCases>,
}
