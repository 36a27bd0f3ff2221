use crate::config::AppConfig;
use crate::model::FetchError;
use crate::scraper::rate_limiter::RateLimiter;
use crate::scraper::traits::{HttpResponse, HttpTransport};

use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Production transport on top of a shared `reqwest` client.
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new() -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait::async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(
        &self,
        url: &str,
        timeout: Duration,
        headers: &[(String, String)],
    ) -> Result<HttpResponse, FetchError> {
        let map_err = |e: reqwest::Error| {
            if e.is_timeout() {
                FetchError::Timeout {
                    url: url.to_string(),
                    timeout,
                }
            } else {
                FetchError::Connection {
                    url: url.to_string(),
                    reason: e.to_string(),
                }
            }
        };

        let mut request = self.client.get(url).timeout(timeout);
        for (name, value) in headers {
            request = request.header(name.as_str(), value.as_str());
        }

        let response = request.send().await.map_err(map_err)?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(k, v)| v.to_str().ok().map(|v| (k.to_string(), v.to_string())))
            .collect();
        let body = response.text().await.map_err(map_err)?;

        Ok(HttpResponse { status, headers, body })
    }
}

/// Throttled fetch helper every analyzer is composed with. Owns the
/// analyzer's rate limiter; the transport may be shared.
pub struct Fetcher {
    transport: Arc<dyn HttpTransport>,
    limiter: RateLimiter,
    user_agent: String,
    timeout: Duration,
}

impl Fetcher {
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        min_interval: Duration,
        user_agent: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            transport,
            limiter: RateLimiter::new(min_interval),
            user_agent: user_agent.into(),
            timeout,
        }
    }

    pub fn from_config(transport: Arc<dyn HttpTransport>, config: &AppConfig) -> Self {
        Self::new(
            transport,
            config.rate_limit_delay(),
            config.user_agent.clone(),
            config.request_timeout(),
        )
    }

    pub async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        self.fetch_with(url, self.timeout, &[]).await
    }

    /// Waits for the rate limiter, then issues one GET. Non-2xx statuses,
    /// connection errors and timeouts all come back as [`FetchError`].
    pub async fn fetch_with(
        &self,
        url: &str,
        timeout: Duration,
        headers: &[(String, String)],
    ) -> Result<String, FetchError> {
        self.limiter.acquire().await;

        let mut all_headers = Vec::with_capacity(headers.len() + 1);
        all_headers.push(("User-Agent".to_string(), self.user_agent.clone()));
        all_headers.extend(headers.iter().cloned());

        debug!("GET {}", url);
        let response = self
            .transport
            .get(url, timeout, &all_headers)
            .await
            .inspect_err(|e| {
                if e.is_timeout() {
                    warn!("⏱️ {} did not answer within {:?}", url, timeout);
                }
            })?;
        let content_type = response
            .headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case("content-type"))
            .map(|(_, v)| v.as_str())
            .unwrap_or("-");
        debug!("{} -> {} ({}, {} bytes)", url, response.status, content_type, response.body.len());
        if !response.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: response.status,
            });
        }

        Ok(response.body)
    }
}
