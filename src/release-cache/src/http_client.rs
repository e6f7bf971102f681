//! HTTP client factory for release-host requests.
//!
//! All clients include: User-Agent, tcp_nodelay, request/read timeouts and a
//! pool idle timeout so DNS changes on the release host are picked up.

use std::time::Duration;

use reqwest::Client;

/// User-Agent string for all HTTP requests
pub const USER_AGENT: &str = concat!("release-cache/", env!("CARGO_PKG_VERSION"));

/// Default timeout for API and asset requests (30 seconds)
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Connection pool idle timeout to ensure DNS is re-resolved periodically.
pub const POOL_IDLE_TIMEOUT: Duration = Duration::from_secs(60);

/// Creates an HTTP client builder with standard configuration.
pub fn create_client_builder() -> reqwest::ClientBuilder {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(DEFAULT_TIMEOUT)
        .read_timeout(DEFAULT_TIMEOUT)
        .tcp_nodelay(true)
        .pool_idle_timeout(POOL_IDLE_TIMEOUT)
        .pool_max_idle_per_host(4)
}

/// Creates an HTTP client with default configuration.
pub fn create_default_client() -> Client {
    create_client_builder()
        .build()
        .unwrap_or_else(|_| Client::new())
}
