//! Notifications: deduplication and delivery.
//!
//! Each `(trip, stop)` pair is notified at most once per distinct message
//! per day. Delivery goes through an ordered list of channels; see
//! [`crate::run::deliver`] for how they are tried.

mod channel;
mod dedup;
mod error;
mod notification;
mod push;
mod record;
mod sms;

pub use channel::DeliveryChannel;
pub use dedup::{Clock, DedupStatus, Deduplicator, SystemClock};
pub use error::{DeliveryError, RecordError};
pub use notification::{Notification, notification_key};
pub use push::NotifyDroidChannel;
pub use record::{JsonRecordStore, NotificationRecord, NotificationRecordSet, RecordStore};
pub use sms::{TwilioCredentials, TwilioSmsChannel};
