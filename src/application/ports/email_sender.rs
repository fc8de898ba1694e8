//! Outbound email port.

use async_trait::async_trait;

use crate::app_error::AppResult;

/// One outbound email. `bcc` carries the compliance archive copy when set.
#[derive(Debug, Clone, PartialEq)]
pub struct EmailMessage {
    pub to: String,
    pub bcc: Option<String>,
    pub subject: String,
    pub html: String,
}

#[async_trait]
pub trait EmailSender: Send + Sync {
    async fn send(&self, message: &EmailMessage) -> AppResult<()>;
}
