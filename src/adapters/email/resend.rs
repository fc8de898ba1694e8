use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use crate::{
    app_error::{AppError, AppResult},
    application::ports::email_sender::{EmailMessage, EmailSender},
    infra::http_client::build_client,
};
use secrecy::ExposeSecret;

const RESEND_API_URL: &str = "https://api.resend.com/emails";

#[derive(Clone)]
pub struct ResendEmailSender {
    client: Client,
    api_key: secrecy::SecretString,
    from: String,
}

impl ResendEmailSender {
    pub fn new(api_key: secrecy::SecretString, from: String) -> Self {
        Self {
            client: build_client(),
            api_key,
            from,
        }
    }
}

#[derive(Serialize)]
struct ResendReq<'a> {
    from: &'a str,
    to: [&'a str; 1],
    #[serde(skip_serializing_if = "Option::is_none")]
    bcc: Option<[&'a str; 1]>,
    subject: &'a str,
    html: &'a str,
}

#[async_trait]
impl EmailSender for ResendEmailSender {
    async fn send(&self, message: &EmailMessage) -> AppResult<()> {
        let body = ResendReq {
            from: &self.from,
            to: [message.to.as_str()],
            bcc: message.bcc.as_deref().map(|address| [address]),
            subject: &message.subject,
            html: &message.html,
        };
        let response = self
            .client
            .post(RESEND_API_URL)
            .bearer_auth(self.api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("Resend request failed: {}", e)))?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response.text().await.map_err(|e| {
            AppError::Upstream(format!("Failed to read Resend response: {}", e))
        })?;
        tracing::error!(status = %status, body = %body, "Resend API error");
        Err(delivery_error(status, &body))
    }
}

/// Surface Resend's own message verbatim when the error body parses.
fn delivery_error(status: StatusCode, body: &str) -> AppError {
    if let Ok(error) = serde_json::from_str::<ResendErrorResponse>(body) {
        if let Some(message) = error.message.filter(|message| !message.is_empty()) {
            return AppError::Upstream(message);
        }
    }
    AppError::Upstream(format!("Resend API error: {} - {}", status, body))
}

#[derive(Deserialize)]
struct ResendErrorResponse {
    message: Option<String>,
}
