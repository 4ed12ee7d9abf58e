//! NASA NeoWs feed client

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use std::sync::Once;
use std::time::Duration;

use super::error::UpstreamError;
use super::types::{DateRange, RawFeedResponse};
use crate::config::UpstreamConfig;

/// Public token accepted by the provider with heavily reduced rate limits.
pub const DEMO_API_KEY: &str = "DEMO_KEY";

static DEMO_KEY_WARNING: Once = Once::new();

/// Source of raw feed payloads for a date range.
#[async_trait]
pub trait FeedSource: Send + Sync {
    /// Single attempt, no retries. `range` is already validated.
    async fn fetch(&self, range: &DateRange) -> Result<RawFeedResponse, UpstreamError>;
}

/// HTTP client for `<base>/feed`.
#[derive(Debug, Clone)]
pub struct NasaFeedClient {
    client: Client,
    feed_url: Url,
    api_key: String,
}

impl NasaFeedClient {
    pub fn new(config: &UpstreamConfig) -> Result<Self> {
        Self::with_timeout(&config.base_url, config.api_key.as_deref(), config.timeout())
    }

    pub fn with_timeout(base_url: &str, api_key: Option<&str>, timeout: Duration) -> Result<Self> {
        let feed_url = Url::parse(&format!("{}/feed", base_url.trim_end_matches('/')))
            .with_context(|| format!("Invalid upstream base URL: {}", base_url))?;

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        let api_key = match api_key.map(str::trim).filter(|k| !k.is_empty()) {
            Some(key) => key.to_string(),
            None => {
                DEMO_KEY_WARNING.call_once(|| {
                    tracing::warn!(
                        "NASA_API_KEY is not set, using {}. Upstream rate limits will be much lower.",
                        DEMO_API_KEY
                    );
                });
                DEMO_API_KEY.to_string()
            }
        };

        Ok(Self {
            client,
            feed_url,
            api_key,
        })
    }

    pub fn uses_demo_key(&self) -> bool {
        self.api_key == DEMO_API_KEY
    }

    fn request_url(&self, range: &DateRange) -> Url {
        let mut url = self.feed_url.clone();
        url.query_pairs_mut()
            .append_pair("start_date", &range.start().to_string())
            .append_pair("end_date", &range.end().to_string())
            .append_pair("api_key", &self.api_key);
        url
    }
}

fn classify_transport_error(err: &reqwest::Error) -> UpstreamError {
    if err.is_timeout() {
        UpstreamError::Timeout
    } else {
        UpstreamError::Unreachable(err.to_string())
    }
}

fn classify_status(status: StatusCode) -> Option<UpstreamError> {
    if status.is_success() {
        return None;
    }
    Some(match status {
        StatusCode::TOO_MANY_REQUESTS => UpstreamError::RateLimited,
        StatusCode::FORBIDDEN => UpstreamError::Unauthorized,
        other => UpstreamError::Status {
            status: other.as_u16(),
            status_text: other.canonical_reason().unwrap_or("Unknown").to_string(),
        },
    })
}

#[async_trait]
impl FeedSource for NasaFeedClient {
    async fn fetch(&self, range: &DateRange) -> Result<RawFeedResponse, UpstreamError> {
        tracing::debug!(
            "Requesting feed {} .. {} ({} days) from {}",
            range.start(),
            range.end(),
            range.days(),
            self.feed_url
        );

        let response = self
            .client
            .get(self.request_url(range))
            .send()
            .await
            .map_err(|e| classify_transport_error(&e))?;

        if let Some(err) = classify_status(response.status()) {
            tracing::warn!("Feed request failed with status {}", response.status());
            return Err(err);
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| classify_transport_error(&e))?;

        let feed: RawFeedResponse =
            serde_json::from_slice(&body).map_err(|e| UpstreamError::Decode(e.to_string()))?;

        tracing::debug!(
            "Feed returned {} date buckets, {} records",
            feed.near_earth_objects.len(),
            feed.record_count()
        );
        Ok(feed)
    }
}
