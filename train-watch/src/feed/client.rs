//! GTFS-realtime HTTP client.

use futures::future::BoxFuture;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};

use super::convert::{decode_feed, trip_updates_from_feed};
use super::error::FeedError;
use super::matcher::FeedProvider;
use super::types::TripUpdate;

/// Default realtime endpoint.
const DEFAULT_FEED_URL: &str = "https://api.transport.nsw.gov.au/v2/gtfs/realtime/sydneytrains";

/// Maximum allowed protobuf response size (50 MB).
const MAX_FEED_SIZE: usize = 50 * 1024 * 1024;

/// Configuration for the feed client.
#[derive(Debug, Clone)]
pub struct FeedClientConfig {
    /// API token sent as `Authorization: apikey <token>`
    pub api_token: String,
    /// Feed URL (defaults to the Sydney Trains realtime feed)
    pub url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Largest accepted response body in bytes
    pub max_size: usize,
}

impl FeedClientConfig {
    /// Create a new config with the given API token.
    pub fn new(api_token: impl Into<String>) -> Self {
        Self {
            api_token: api_token.into(),
            url: DEFAULT_FEED_URL.to_string(),
            timeout_secs: 30,
            max_size: MAX_FEED_SIZE,
        }
    }

    /// Set a custom feed URL.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Set the largest accepted response body.
    pub fn with_max_size(mut self, bytes: usize) -> Self {
        self.max_size = bytes;
        self
    }
}

/// Client for a GTFS-realtime trip updates feed.
#[derive(Debug, Clone)]
pub struct GtfsRtClient {
    http: reqwest::Client,
    url: String,
    max_size: usize,
}

impl GtfsRtClient {
    pub fn new(config: FeedClientConfig) -> Result<Self, FeedError> {
        let mut headers = HeaderMap::new();
        let auth = HeaderValue::from_str(&format!("apikey {}", config.api_token))
            .map_err(|_| FeedError::InvalidToken)?;
        headers.insert(AUTHORIZATION, auth);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            url: config.url,
            max_size: config.max_size,
        })
    }

    /// Fetch and decode the feed.
    pub async fn fetch_feed(&self) -> Result<gtfs_realtime::FeedMessage, FeedError> {
        let response = self.http.get(&self.url).send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(FeedError::Unauthorized);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FeedError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let bytes = response.bytes().await?;
        if bytes.len() > self.max_size {
            return Err(FeedError::TooLarge {
                size: bytes.len(),
                max: self.max_size,
            });
        }

        decode_feed(&bytes)
    }
}

impl FeedProvider for GtfsRtClient {
    fn fetch_trip_updates(&self) -> BoxFuture<'_, Result<Vec<TripUpdate>, FeedError>> {
        Box::pin(async move {
            let feed = self.fetch_feed().await?;
            let updates = trip_updates_from_feed(&feed);
            tracing::debug!(
                entities = feed.entity.len(),
                trip_updates = updates.len(),
                "decoded realtime feed"
            );
            Ok(updates)
        })
    }
}
