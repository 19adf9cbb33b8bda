//! Static GTFS schedule rows.
//!
//! Only the columns the watcher needs are required. Other GTFS columns are
//! either carried as optional passthrough fields or ignored by the reader.

use serde::Deserialize;

/// A row of `stops.txt`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StopRecord {
    pub stop_id: String,
    pub stop_name: String,
}

/// A row of `trips.txt`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TripRecord {
    pub trip_id: String,
    pub route_id: String,
    #[serde(default)]
    pub service_id: Option<String>,
    #[serde(default)]
    pub trip_headsign: Option<String>,
    #[serde(default)]
    pub direction_id: Option<String>,
}

/// A row of `stop_times.txt`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StopTimeRecord {
    pub trip_id: String,
    pub stop_id: String,
    /// Scheduled departure as `HH:MM:SS`. GTFS allows hours past 23 for
    /// trips running after midnight, so this stays a string.
    pub departure_time: String,
    #[serde(default)]
    pub arrival_time: Option<String>,
    #[serde(default)]
    pub stop_sequence: Option<u32>,
}

impl StopTimeRecord {
    /// Create a stop time with only the required columns.
    pub fn new(
        trip_id: impl Into<String>,
        stop_id: impl Into<String>,
        departure_time: impl Into<String>,
    ) -> Self {
        Self {
            trip_id: trip_id.into(),
            stop_id: stop_id.into(),
            departure_time: departure_time.into(),
            arrival_time: None,
            stop_sequence: None,
        }
    }

    /// The departure time truncated to `HH:MM`.
    pub fn departure_hhmm(&self) -> &str {
        self.departure_time
            .get(..5)
            .unwrap_or(&self.departure_time)
    }
}

impl StopRecord {
    pub fn new(stop_id: impl Into<String>, stop_name: impl Into<String>) -> Self {
        Self {
            stop_id: stop_id.into(),
            stop_name: stop_name.into(),
        }
    }
}

impl TripRecord {
    pub fn new(trip_id: impl Into<String>, route_id: impl Into<String>) -> Self {
        Self {
            trip_id: trip_id.into(),
            route_id: route_id.into(),
            service_id: None,
            trip_headsign: None,
            direction_id: None,
        }
    }
}
