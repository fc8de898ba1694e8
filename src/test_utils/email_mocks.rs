//! In-memory mock implementations of the email sender port.

use async_trait::async_trait;
use std::sync::Mutex;

use crate::{
    app_error::{AppError, AppResult},
    application::ports::email_sender::{EmailMessage, EmailSender},
};

// ============================================================================
// InMemoryEmailSender
// ============================================================================

/// Records every message instead of delivering it.
#[derive(Default)]
pub struct InMemoryEmailSender {
    pub sent: Mutex<Vec<EmailMessage>>,
}

impl InMemoryEmailSender {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent_messages(&self) -> Vec<EmailMessage> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl EmailSender for InMemoryEmailSender {
    async fn send(&self, message: &EmailMessage) -> AppResult<()> {
        self.sent.lock().unwrap().push(message.clone());
        Ok(())
    }
}

// ============================================================================
// FailingEmailSender
// ============================================================================

/// Fails every delivery attempt.
#[derive(Default)]
pub struct FailingEmailSender;

#[async_trait]
impl EmailSender for FailingEmailSender {
    async fn send(&self, _message: &EmailMessage) -> AppResult<()> {
        Err(AppError::Upstream("Email delivery failed".to_string()))
    }
}
