//! NotifyDroid push notifications.

use futures::future::BoxFuture;

use super::channel::DeliveryChannel;
use super::error::DeliveryError;

/// Default NotifyDroid message endpoint.
const DEFAULT_BASE_URL: &str = "http://xdroid.net/api/message";

/// Push notifications through the NotifyDroid API.
#[derive(Debug, Clone)]
pub struct NotifyDroidChannel {
    http: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
}

impl NotifyDroidChannel {
    /// Create a channel; it is disabled when `api_key` is `None`.
    pub fn new(api_key: Option<String>) -> Result<Self, DeliveryError> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()?;

        Ok(Self {
            http,
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }

    /// Set a custom base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    async fn post(&self, title: &str, body: &str) -> Result<(), DeliveryError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(DeliveryError::NotConfigured("NOTIFYDROID_API_KEY"))?;

        let response = self
            .http
            .post(&self.base_url)
            .query(&[("k", api_key), ("t", title), ("c", body)])
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await.unwrap_or_default();

        if !status.is_success() {
            return Err(DeliveryError::Api {
                channel: "NotifyDroid",
                status: status.as_u16(),
                message: text,
            });
        }

        tracing::info!(response = %text, "push notification API response");
        Ok(())
    }
}

impl DeliveryChannel for NotifyDroidChannel {
    fn name(&self) -> &str {
        "NotifyDroid"
    }

    fn enabled(&self) -> bool {
        self.api_key.is_some()
    }

    fn send<'a>(&'a self, title: &'a str, body: &'a str) -> BoxFuture<'a, Result<(), DeliveryError>> {
        Box::pin(self.post(title, body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::StubServer;

    #[test]
    fn enabled_only_with_api_key() {
        assert!(NotifyDroidChannel::new(Some("key".into())).unwrap().enabled());
        assert!(!NotifyDroidChannel::new(None).unwrap().enabled());
    }

    #[tokio::test]
    async fn send_without_key_is_not_configured() {
        let channel = NotifyDroidChannel::new(None).unwrap();
        let result = channel.send("Train delayed", "late").await;
        assert!(matches!(result, Err(DeliveryError::NotConfigured(_))));
    }

    #[tokio::test]
    async fn posts_title_and_body_as_query() {
        let server = StubServer::respond(200, &[], "OK").await;
        let channel = NotifyDroidChannel::new(Some("key".into()))
            .unwrap()
            .with_base_url(server.url());

        channel.send("Train delayed", "late").await.unwrap();

        let request = server.request().await;
        assert!(request.starts_with("post /?"));
        assert!(request.contains("k=key"));
        assert!(request.contains("t=train+delayed"));
        assert!(request.contains("c=late"));
    }

    #[tokio::test]
    async fn error_status_is_a_failure() {
        let server = StubServer::respond(500, &[], "down").await;
        let channel = NotifyDroidChannel::new(Some("key".into()))
            .unwrap()
            .with_base_url(server.url());

        let result = channel.send("Train delayed", "late").await;

        match result {
            Err(DeliveryError::Api {
                channel,
                status,
                message,
            }) => {
                assert_eq!(channel, "NotifyDroid");
                assert_eq!(status, 500);
                assert_eq!(message, "down");
            }
            other => panic!("expected API error, got {other:?}"),
        }
    }
}
