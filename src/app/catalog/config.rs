//! HTTP client configuration and building logic
//!
//! Two clients are built from the same settings: one for catalog API calls,
//! which carries a request timeout, and one for streaming source media, which
//! does not (a multi-gigabyte download must not be cut off by a fixed limit).

use std::time::Duration;

use reqwest::Client;

use crate::constants::{catalog, http};

/// Configuration for the HTTP clients
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// TCP keep-alive settings
    pub tcp_keepalive: Option<Duration>,
    /// TCP nodelay (disable Nagle's algorithm)
    pub tcp_nodelay: bool,
    /// Connection pool idle timeout
    pub pool_idle_timeout: Option<Duration>,
    /// Request timeout for catalog API calls
    pub request_timeout: Duration,
    /// Connect timeout
    pub connect_timeout: Duration,
    /// Catalog rate limit (requests per second)
    pub rate_limit_rps: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            tcp_keepalive: Some(Duration::from_secs(30)),
            tcp_nodelay: true,
            pool_idle_timeout: Some(http::POOL_IDLE_TIMEOUT),
            request_timeout: http::CATALOG_REQUEST_TIMEOUT,
            connect_timeout: http::CONNECT_TIMEOUT,
            rate_limit_rps: catalog::DEFAULT_RATE_LIMIT_RPS,
        }
    }
}

impl ClientConfig {
    /// Builds the client used for catalog API calls
    pub fn build_catalog_client(&self) -> reqwest::Result<Client> {
        self.base_builder().timeout(self.request_timeout).build()
    }

    /// Builds the client used to stream source media
    pub fn build_source_client(&self) -> reqwest::Result<Client> {
        self.base_builder().build()
    }

    fn base_builder(&self) -> reqwest::ClientBuilder {
        let mut client_builder = Client::builder()
            .connect_timeout(self.connect_timeout)
            .user_agent(http::USER_AGENT)
            .tcp_nodelay(self.tcp_nodelay);

        if let Some(keepalive) = self.tcp_keepalive {
            client_builder = client_builder.tcp_keepalive(keepalive);
        }

        if let Some(idle_timeout) = self.pool_idle_timeout {
            client_builder = client_builder.pool_idle_timeout(idle_timeout);
        }

        client_builder
    }
}
