//! Twilio SMS notifications.

use futures::future::BoxFuture;
use serde::Deserialize;

use super::channel::DeliveryChannel;
use super::error::DeliveryError;

/// Default Twilio REST API base URL.
const DEFAULT_BASE_URL: &str = "https://api.twilio.com";

/// Twilio account and phone numbers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TwilioCredentials {
    pub account_sid: String,
    pub auth_token: String,
    /// Sending number
    pub from: String,
    /// Operator's number
    pub to: String,
}

/// The part of Twilio's message resource we log.
#[derive(Debug, Deserialize)]
struct MessageResource {
    sid: String,
}

/// SMS through the Twilio Messages API.
///
/// The body is sent as the text message; SMS has no title.
#[derive(Debug, Clone)]
pub struct TwilioSmsChannel {
    http: reqwest::Client,
    credentials: Option<TwilioCredentials>,
    base_url: String,
}

impl TwilioSmsChannel {
    /// Create a channel; it is disabled when `credentials` is `None`.
    pub fn new(credentials: Option<TwilioCredentials>) -> Result<Self, DeliveryError> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()?;

        Ok(Self {
            http,
            credentials,
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }

    /// Set a custom base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    fn messages_url(&self, account_sid: &str) -> String {
        format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.base_url, account_sid
        )
    }

    async fn post(&self, body: &str) -> Result<(), DeliveryError> {
        let creds = self
            .credentials
            .as_ref()
            .ok_or(DeliveryError::NotConfigured("TWILIO_ACCOUNT_SID"))?;

        let response = self
            .http
            .post(self.messages_url(&creds.account_sid))
            .basic_auth(&creds.account_sid, Some(&creds.auth_token))
            .form(&[
                ("To", creds.to.as_str()),
                ("From", creds.from.as_str()),
                ("Body", body),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(DeliveryError::Api {
                channel: "SMS",
                status: status.as_u16(),
                message,
            });
        }

        match response.json::<MessageResource>().await {
            Ok(message) => tracing::info!(sid = %message.sid, "SMS sent"),
            Err(e) => tracing::debug!(error = %e, "SMS sent, response not understood"),
        }
        Ok(())
    }
}

impl DeliveryChannel for TwilioSmsChannel {
    fn name(&self) -> &str {
        "SMS"
    }

    fn enabled(&self) -> bool {
        self.credentials.is_some()
    }

    fn send<'a>(&'a self, _title: &'a str, body: &'a str) -> BoxFuture<'a, Result<(), DeliveryError>> {
        Box::pin(self.post(body))
    }
}
