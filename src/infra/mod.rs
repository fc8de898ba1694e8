pub mod app;
pub mod config;
pub mod http_client;
pub mod setup;
pub mod stripe_billing_adapter;
pub mod stripe_client;
