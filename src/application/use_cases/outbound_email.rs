//! Validated outbound email delivery.
//!
//! No HTML is generated here; callers own the content and this layer only
//! validates and forwards it to the delivery provider.

use std::sync::Arc;
use tracing::instrument;

use crate::{
    app_error::{AppError, AppResult},
    application::ports::email_sender::{EmailMessage, EmailSender},
    validators::is_valid_email,
};

#[derive(Clone)]
pub struct OutboundEmailUseCases {
    email: Arc<dyn EmailSender>,
    compliance_archive: Option<String>,
}

impl OutboundEmailUseCases {
    pub fn new(email: Arc<dyn EmailSender>, compliance_archive: Option<String>) -> Self {
        Self {
            email,
            compliance_archive,
        }
    }

    /// Send a plain transactional email.
    #[instrument(skip(self, html))]
    pub async fn send_transactional(&self, to: &str, subject: &str, html: &str) -> AppResult<()> {
        validate_message(to, subject, html)?;

        self.email
            .send(&EmailMessage {
                to: to.to_string(),
                bcc: None,
                subject: subject.to_string(),
                html: html.to_string(),
            })
            .await
    }

    /// Send a compliance email: same delivery path, additionally BCC'd to
    /// the archive address when one is configured.
    #[instrument(skip(self, html))]
    pub async fn send_compliance(&self, to: &str, subject: &str, html: &str) -> AppResult<()> {
        validate_message(to, subject, html)?;

        self.email
            .send(&EmailMessage {
                to: to.to_string(),
                bcc: self.compliance_archive.clone(),
                subject: subject.to_string(),
                html: html.to_string(),
            })
            .await
    }
}

fn validate_message(to: &str, subject: &str, html: &str) -> AppResult<()> {
    if !is_valid_email(to) {
        return Err(AppError::InvalidInput(
            "Invalid recipient address".to_string(),
        ));
    }
    if subject.trim().is_empty() {
        return Err(AppError::InvalidInput(
            "Subject must not be empty".to_string(),
        ));
    }
    if html.trim().is_empty() {
        return Err(AppError::InvalidInput(
            "Email body must not be empty".to_string(),
        ));
    }
    Ok(())
}
