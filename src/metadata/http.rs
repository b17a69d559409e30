//! Shared HTTP plumbing for provider adapters and cover sources.
//!
//! Every external service gets its own [`HttpClient`] carrying the service
//! name (for logs and errors), a request timeout, and an optional
//! token-bucket rate limit via [`governor`]. All calls race against a
//! [`CancellationToken`] so superseded queries stop doing network work.
//! Failed calls are never retried.

use std::num::NonZeroU32;
use std::time::Duration;

use governor::{Quota, RateLimiter};
use mediahint_common::{Error, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::config::{LookupConfig, ProviderEndpoint};

type DirectLimiter = RateLimiter<
    governor::state::NotKeyed,
    governor::state::InMemoryState,
    governor::clock::DefaultClock,
>;

/// JSON-over-HTTPS client bound to one external service.
pub struct HttpClient {
    provider: &'static str,
    client: reqwest::Client,
    rate_limiter: Option<DirectLimiter>,
}

impl HttpClient {
    /// Build a client for `provider` using the shared lookup settings and the
    /// provider's own endpoint settings.
    pub fn new(provider: &'static str, lookup: &LookupConfig, endpoint: &ProviderEndpoint) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(lookup.request_timeout_secs))
            .user_agent(lookup.user_agent.clone())
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!(provider, "Failed to build HTTP client with timeout: {}", e);
                reqwest::Client::new()
            });

        let rate_limiter = endpoint
            .requests_per_second
            .and_then(NonZeroU32::new)
            .map(|rps| RateLimiter::direct(Quota::per_second(rps)));

        Self {
            provider,
            client,
            rate_limiter,
        }
    }

    /// Name of the service this client talks to.
    pub fn provider(&self) -> &'static str {
        self.provider
    }

    /// GET `url` with query-string parameters and decode a JSON body.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        params: &[(&str, String)],
        cancel: &CancellationToken,
    ) -> Result<T> {
        debug!(provider = self.provider, url = %url, "GET");
        let request = self.client.get(url).query(params);
        self.send(request, cancel).await
    }

    /// POST a JSON body to `url` and decode a JSON response.
    pub async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        url: &str,
        body: &B,
        cancel: &CancellationToken,
    ) -> Result<T> {
        debug!(provider = self.provider, url = %url, "POST");
        let request = self.client.post(url).json(body);
        self.send(request, cancel).await
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
        cancel: &CancellationToken,
    ) -> Result<T> {
        let provider = self.provider;
        let exchange = async {
            if let Some(limiter) = &self.rate_limiter {
                limiter.until_ready().await;
            }

            let resp = request
                .send()
                .await
                .map_err(|e| Error::transport(provider, e.to_string()))?;

            let status = resp.status();
            if !status.is_success() {
                return Err(Error::Status {
                    provider,
                    status: status.as_u16(),
                });
            }

            let bytes = resp
                .bytes()
                .await
                .map_err(|e| Error::transport(provider, e.to_string()))?;

            serde_json::from_slice(&bytes).map_err(|e| Error::decode(provider, e.to_string()))
        };

        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(Error::Cancelled),
            result = exchange => result,
        }
    }
}

/// Extract a four-digit year from a date string like `"2023-04-15"` or
/// `"2019–2020"`.
pub fn parse_year(date: Option<&str>) -> Option<u16> {
    date.and_then(|d| d.get(..4))
        .filter(|y| y.bytes().all(|b| b.is_ascii_digit()))
        .and_then(|y| y.parse::<u16>().ok())
}
