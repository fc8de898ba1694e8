pub mod billing_provider;
pub mod email_sender;
