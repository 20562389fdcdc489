//! Core HTTP operations against the catalog API
//!
//! Every request is rate limited and authenticated with the bearer token.
//! A 429 answer is waited out with exponential backoff; any other failure is
//! returned to the caller, which decides whether it aborts the run.

use std::num::NonZeroU32;
use std::time::Duration;

use governor::{clock::DefaultClock, state::InMemoryState, Jitter, Quota, RateLimiter};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use url::Url;

use crate::constants::{catalog, http};
use crate::errors::{CatalogError, CatalogResult, HttpError};

type DirectRateLimiter = RateLimiter<governor::state::NotKeyed, InMemoryState, DefaultClock>;

/// HTTP operations handler for the catalog API
#[derive(Debug)]
pub struct HttpHandler {
    client: Client,
    api_key: String,
    rate_limiter: DirectRateLimiter,
}

impl HttpHandler {
    /// Creates a new HttpHandler
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::ZeroRateLimit` if `rate_limit_rps` is zero
    pub fn new(client: Client, api_key: String, rate_limit_rps: u32) -> CatalogResult<Self> {
        let rate_limiter = Self::build_rate_limiter(rate_limit_rps)?;
        Ok(Self {
            client,
            api_key,
            rate_limiter,
        })
    }

    fn build_rate_limiter(rate_limit_rps: u32) -> CatalogResult<DirectRateLimiter> {
        let rps = NonZeroU32::new(rate_limit_rps).ok_or(CatalogError::ZeroRateLimit)?;
        Ok(RateLimiter::direct(Quota::per_second(rps)))
    }

    /// GET `url` and decode the JSON body
    pub async fn get_json<T: DeserializeOwned>(&self, url: &Url) -> Result<T, HttpError> {
        let response = self.get_response(url).await?;
        let status = response.status();
        if !status.is_success() {
            return Err(HttpError::Status {
                status: status.as_u16(),
            });
        }

        response.json::<T>().await.map_err(HttpError::Decode)
    }

    async fn get_response(&self, url: &Url) -> Result<reqwest::Response, HttpError> {
        let mut waits = 0;
        loop {
            self.rate_limiter
                .until_ready_with_jitter(Jitter::up_to(Duration::from_millis(
                    http::RATE_LIMIT_JITTER_MS,
                )))
                .await;

            let response = self
                .client
                .get(url.as_str())
                .bearer_auth(&self.api_key)
                .send()
                .await
                .map_err(HttpError::Transport)?;

            if response.status() != StatusCode::TOO_MANY_REQUESTS {
                tracing::debug!("GET {} -> {}", url, response.status());
                return Ok(response);
            }

            if waits >= catalog::MAX_RATE_LIMIT_RETRIES {
                return Err(HttpError::RateLimited { attempts: waits + 1 });
            }
            waits += 1;
            let delay = Duration::from_millis(catalog::RATE_LIMIT_BASE_DELAY_MS * 2_u64.pow(waits));
            tracing::warn!(
                "Rate limited by catalog (429). Backing off for {}ms",
                delay.as_millis()
            );
            tokio::time::sleep(delay).await;
        }
    }
}
