//! Shared reqwest factory so every outbound client (Stripe, Resend) carries
//! the same timeout behavior.

use reqwest::Client;
use std::time::Duration;

/// Ceiling for TCP connect plus TLS handshake.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Ceiling for a whole request/response exchange. Provider APIs answer in
/// seconds; anything slower should fail fast and surface upstream.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Build the HTTP client used by the outbound adapters.
///
/// Panics if the client cannot be built (for example TLS backend
/// misconfiguration). Only called during startup wiring, where a panic is
/// the right outcome since the service cannot run without outbound clients.
pub fn build_client() -> Client {
    Client::builder()
        .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
        .timeout(DEFAULT_REQUEST_TIMEOUT)
        .build()
        .expect("Failed to build HTTP client")
}
