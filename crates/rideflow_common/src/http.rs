//! Shared HTTP client utilities.
//!
//! Every outbound call (routing provider, push provider) goes through a
//! client with a bounded timeout so no lifecycle operation can block
//! indefinitely on an external service.

use once_cell::sync::Lazy;
use reqwest::{Client, Error as ReqwestError};
use std::time::Duration;

/// Default timeout for HTTP requests in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// A static HTTP client that can be reused across the application.
/// Configured with the default timeout.
pub static HTTP_CLIENT: Lazy<Client> = Lazy::new(|| {
    Client::builder()
        .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
        .build()
        // Builder only fails on TLS backend misconfiguration, which is a
        // startup-fatal condition.
        .expect("Failed to create HTTP client")
});

/// Creates a new HTTP client with a custom timeout.
///
/// # Errors
///
/// Returns a [`ReqwestError`] if the client cannot be constructed.
pub fn create_client(timeout_secs: u64) -> Result<Client, ReqwestError> {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
}
