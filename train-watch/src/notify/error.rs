//! Notification error types.

/// Errors from delivering a notification.
#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Channel API returned an error status
    #[error("{channel} API error {status}: {message}")]
    Api {
        channel: &'static str,
        status: u16,
        message: String,
    },

    /// Channel is missing credentials
    #[error("not configured: {0}")]
    NotConfigured(&'static str),

    /// No channel is enabled
    #[error("no delivery channels enabled")]
    NoChannelsEnabled,

    /// Every enabled channel failed
    #[error("all {attempted} enabled delivery channels failed")]
    AllChannelsFailed { attempted: usize },
}

/// Errors from reading or writing the notification record.
#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    /// Reading or writing the record file failed
    #[error("record file I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The record file is not valid JSON
    #[error("record file JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
