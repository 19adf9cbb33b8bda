//! Persisted record of today's notifications.
//!
//! One JSON document holds every notification sent on a calendar day. A
//! document dated any other day reads as absent, which is how the
//! deduplicator starts each day afresh.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::error::RecordError;

/// The last notification sent for one key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationRecord {
    pub title: String,
    pub body: String,
    /// When the notification was sent, stored as epoch milliseconds.
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
}

/// All notifications sent on one day, keyed by `trip_stop`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationRecordSet {
    pub date: NaiveDate,
    #[serde(default)]
    pub notifications: BTreeMap<String, NotificationRecord>,
}

impl NotificationRecordSet {
    pub fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            notifications: BTreeMap::new(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&NotificationRecord> {
        self.notifications.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, record: NotificationRecord) {
        self.notifications.insert(key.into(), record);
    }
}

/// Storage for the day's record set.
pub trait RecordStore {
    /// Load the record set for `today`.
    ///
    /// Returns `None` if nothing was ever written or the stored set is for
    /// a different day.
    fn load(&self, today: NaiveDate) -> Result<Option<NotificationRecordSet>, RecordError>;

    /// Replace the stored record set.
    fn save(&self, records: &NotificationRecordSet) -> Result<(), RecordError>;
}

/// Record set stored as pretty-printed JSON at a fixed path.
#[derive(Debug, Clone)]
pub struct JsonRecordStore {
    path: PathBuf,
}

impl JsonRecordStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RecordStore for JsonRecordStore {
    fn load(&self, today: NaiveDate) -> Result<Option<NotificationRecordSet>, RecordError> {
        if !self.path.exists() {
            return Ok(None);
        }

        let contents = std::fs::read_to_string(&self.path)?;
        let records: NotificationRecordSet = serde_json::from_str(&contents)?;

        if records.date != today {
            return Ok(None);
        }

        Ok(Some(records))
    }

    /// Creates parent directories if they don't exist.
    fn save(&self, records: &NotificationRecordSet) -> Result<(), RecordError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(records)?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }
}
