//! Notification messages.

/// A message ready for delivery.
///
/// Keyed notifications are deduplicated per `(trip, stop)` and day. Keyless
/// ones (run-level errors) are always sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub key: Option<String>,
    pub title: String,
    pub body: String,
}

impl Notification {
    /// A notification about a trip at a stop, keyed for deduplication.
    pub fn for_stop(
        trip_id: &str,
        stop_id: &str,
        title: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            key: Some(notification_key(trip_id, stop_id)),
            title: title.into(),
            body: body.into(),
        }
    }

    /// A keyless error notification.
    pub fn error(body: impl Into<String>) -> Self {
        Self {
            key: None,
            title: "Error".to_string(),
            body: body.into(),
        }
    }
}

/// Deduplication key for a trip at a stop.
pub fn notification_key(trip_id: &str, stop_id: &str) -> String {
    format!("{trip_id}_{stop_id}")
}
