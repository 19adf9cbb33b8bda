//! Runtime configuration from the environment.

use std::path::PathBuf;

use crate::feed::FeedClientConfig;
use crate::notify::TwilioCredentials;
use crate::schedule::ScheduleDownloadConfig;

/// Default directory of the extracted GTFS schedule.
const DEFAULT_GTFS_DIR: &str = "sydneytrains_GTFS";

/// Default directory for log files and the notification record.
const DEFAULT_LOGS_DIR: &str = "logs";

/// Filename of the notification record inside the logs directory.
const RECORD_FILENAME: &str = "notification_record.json";

/// Configuration for a watcher run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Transport API token for the feed and schedule endpoints
    pub api_token: Option<String>,
    /// Override for the realtime feed URL
    pub feed_url: Option<String>,
    /// Override for the schedule archive URL
    pub schedule_url: Option<String>,
    /// Extracted GTFS schedule directory
    pub gtfs_dir: PathBuf,
    /// Directory for logs and the notification record
    pub logs_dir: PathBuf,
    /// Whether to download a fresh schedule archive before the run
    pub enable_data_refresh: bool,
    /// NotifyDroid key; push is disabled without it
    pub notifydroid_api_key: Option<String>,
    /// Twilio settings; SMS is disabled unless all four are present
    pub twilio: Option<TwilioCredentials>,
}

impl AppConfig {
    /// Read configuration from process environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read configuration through `lookup`. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |name: &str| lookup(name).filter(|value| !value.is_empty());

        let twilio = match (
            get("TWILIO_ACCOUNT_SID"),
            get("TWILIO_AUTH_TOKEN"),
            get("SMS_SENDER_NUMBER"),
            get("SMS_RECIPIENT_NUMBER"),
        ) {
            (Some(account_sid), Some(auth_token), Some(from), Some(to)) => {
                Some(TwilioCredentials {
                    account_sid,
                    auth_token,
                    from,
                    to,
                })
            }
            _ => None,
        };

        Self {
            api_token: get("API_TOKEN"),
            feed_url: get("FEED_URL"),
            schedule_url: get("SCHEDULE_URL"),
            gtfs_dir: get("GTFS_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_GTFS_DIR)),
            logs_dir: get("LOGS_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_LOGS_DIR)),
            enable_data_refresh: get("ENABLE_DATA_REFRESH").is_some(),
            notifydroid_api_key: get("NOTIFYDROID_API_KEY"),
            twilio,
        }
    }

    /// Path of the notification record file.
    pub fn record_path(&self) -> PathBuf {
        self.logs_dir.join(RECORD_FILENAME)
    }

    pub fn feed_client_config(&self) -> FeedClientConfig {
        let config = FeedClientConfig::new(self.api_token.clone().unwrap_or_default());
        match &self.feed_url {
            Some(url) => config.with_url(url),
            None => config,
        }
    }

    pub fn schedule_download_config(&self) -> ScheduleDownloadConfig {
        let config = ScheduleDownloadConfig::new(
            self.api_token.clone().unwrap_or_default(),
            &self.gtfs_dir,
        );
        match &self.schedule_url {
            Some(url) => config.with_url(url),
            None => config,
        }
    }
}
