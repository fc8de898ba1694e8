use std::fs::File;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::{
    adapters::{email::resend::ResendEmailSender, http::app_state::AppState},
    application::{
        ports::{billing_provider::BillingProviderPort, email_sender::EmailSender},
        use_cases::{
            customer_billing::CustomerBillingUseCases, outbound_email::OutboundEmailUseCases,
        },
    },
    infra::{config::AppConfig, stripe_billing_adapter::StripeBillingAdapter},
};

pub fn init_app_state() -> anyhow::Result<AppState> {
    let config = AppConfig::from_env();

    let billing_provider = Arc::new(StripeBillingAdapter::new(config.stripe_secret_key.clone()))
        as Arc<dyn BillingProviderPort>;
    let email_sender = Arc::new(ResendEmailSender::new(
        config.resend_api_key.clone(),
        config.email_from.clone(),
    )) as Arc<dyn EmailSender>;

    let billing_use_cases = CustomerBillingUseCases::new(
        billing_provider,
        Duration::from_secs(config.billing_view_timeout_secs),
    );
    let email_use_cases =
        OutboundEmailUseCases::new(email_sender, config.compliance_archive.clone());

    Ok(AppState {
        config: Arc::new(config),
        billing_use_cases: Arc::new(billing_use_cases),
        email_use_cases: Arc::new(email_use_cases),
    })
}

pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "pulsefit_api=debug,tower_http=debug".into());

    // Console layer
    let console_layer = fmt::layer()
        .with_target(false) // don't show target (module path)
        .with_level(true) // show log level
        .pretty(); // human-friendly, with colors

    // File layer (JSON)
    let file = File::create("app.log").expect("cannot create log file");
    let json_layer = fmt::layer()
        .json()
        .with_writer(file)
        .with_current_span(true)
        .with_span_list(true);

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(json_layer)
        .try_init()
        .ok();
}
