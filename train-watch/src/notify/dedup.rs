//! Once-per-day notification deduplication.

use chrono::{DateTime, Local, NaiveDate, Utc};

use super::error::RecordError;
use super::record::{NotificationRecord, NotificationRecordSet, RecordStore};

/// Source of the current time.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;

    /// The operator's calendar day.
    fn today(&self) -> NaiveDate;
}

/// Wall clock; the calendar day is the local date.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Outcome of a deduplication check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DedupStatus {
    NotSent,
    /// An identical notification was sent earlier today.
    AlreadySent { timestamp: DateTime<Utc> },
}

/// Decides whether a notification is new for today.
///
/// Two notifications are the same only if both title and body match
/// exactly; a delay that grows from 2 to 3 minutes is a new notification.
#[derive(Debug)]
pub struct Deduplicator<S, C> {
    store: S,
    clock: C,
}

impl<S: RecordStore, C: Clock> Deduplicator<S, C> {
    pub fn new(store: S, clock: C) -> Self {
        Self { store, clock }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Whether `(title, body)` was already sent under `key` today.
    pub fn check(&self, key: &str, title: &str, body: &str) -> DedupStatus {
        match self.current().get(key) {
            Some(record) if record.title == title && record.body == body => {
                DedupStatus::AlreadySent {
                    timestamp: record.timestamp,
                }
            }
            _ => DedupStatus::NotSent,
        }
    }

    /// Record that `(title, body)` was sent under `key` now.
    pub fn record(&self, key: &str, title: &str, body: &str) -> Result<(), RecordError> {
        let mut records = self.current();
        records.insert(
            key,
            NotificationRecord {
                title: title.to_string(),
                body: body.to_string(),
                timestamp: self.clock.now(),
            },
        );
        self.store.save(&records)
    }

    /// Today's record set. An unreadable record starts the day over rather
    /// than blocking notifications.
    fn current(&self) -> NotificationRecordSet {
        let today = self.clock.today();
        match self.store.load(today) {
            Ok(Some(records)) => records,
            Ok(None) => NotificationRecordSet::empty(today),
            Err(e) => {
                tracing::warn!(error = %e, "could not read notification record, starting empty");
                NotificationRecordSet::empty(today)
            }
        }
    }
}
