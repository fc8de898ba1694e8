use std::net::SocketAddr;

use env_helpers::{get_env, get_env_default};
use secrecy::SecretString;

pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub stripe_secret_key: SecretString,
    pub stripe_webhook_secret: SecretString,
    pub resend_api_key: SecretString,
    /// Sender identity for outbound mail (e.g., "Pulsefit <noreply@pulsefit.app>").
    pub email_from: String,
    /// Optional archive address BCC'd on every compliance email.
    pub compliance_archive: Option<String>,
    /// Overall ceiling in seconds for one billing-view aggregation.
    pub billing_view_timeout_secs: u64,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let stripe_secret_key: SecretString =
            SecretString::new(get_env::<String>("STRIPE_SECRET_KEY").into());
        let stripe_webhook_secret: SecretString =
            SecretString::new(get_env::<String>("STRIPE_WEBHOOK_SECRET").into());
        let resend_api_key: SecretString =
            SecretString::new(get_env::<String>("RESEND_API_KEY").into());

        let email_from: String =
            get_env_default("EMAIL_FROM", "Pulsefit <noreply@pulsefit.app>".to_string());
        let compliance_archive: Option<String> = std::env::var("COMPLIANCE_ARCHIVE_EMAIL")
            .ok()
            .filter(|address| !address.is_empty());

        let bind_addr: SocketAddr = get_env_default("BIND_ADDR", "127.0.0.1:3001".parse().unwrap());
        let billing_view_timeout_secs: u64 = get_env_default("BILLING_VIEW_TIMEOUT_SECS", 30);

        Self {
            bind_addr,
            stripe_secret_key,
            stripe_webhook_secret,
            resend_api_key,
            email_from,
            compliance_archive,
            billing_view_timeout_secs,
        }
    }
}
