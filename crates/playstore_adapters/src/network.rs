//! Shared HTTP client configuration.
//!
//! The same client serves both the OAuth2 token endpoint and the Android
//! Publisher API, so a caller-supplied client replaces both.

use std::time::Duration;

use playstore_core::config::{HttpSettings, DEFAULT_USER_AGENT};
use playstore_core::Error;
use reqwest::Client;

/// Default timeout for HTTP requests (30 seconds)
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default connect timeout (10 seconds)
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Build an HTTP client from configured settings.
pub fn build_api_client(settings: &HttpSettings) -> Result<Client, Error> {
    Client::builder()
        .user_agent(settings.user_agent.as_str())
        .timeout(settings.timeout())
        .connect_timeout(settings.connect_timeout())
        .build()
        .map_err(|e| Error::Network(format!("failed to create API HTTP client: {}", e)))
}

/// Build an HTTP client with the default user agent and timeouts.
pub fn build_default_client() -> Result<Client, Error> {
    Client::builder()
        .user_agent(DEFAULT_USER_AGENT)
        .timeout(DEFAULT_TIMEOUT)
        .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
        .build()
        .map_err(|e| Error::Network(format!("failed to create default HTTP client: {}", e)))
}
