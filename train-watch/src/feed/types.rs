//! Strongly-typed trip updates.
//!
//! The realtime feed is decoded into these types once, at the boundary.
//! Relationship codes follow GTFS-realtime; a missing code takes the proto
//! default of `SCHEDULED`.

/// Trip-level schedule relationship (`TripDescriptor.ScheduleRelationship`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TripRelationship {
    #[default]
    Scheduled,
    Added,
    Unscheduled,
    Canceled,
    Replacement,
    Duplicated,
    Deleted,
    New,
    Other(i32),
}

impl TripRelationship {
    pub fn from_code(code: Option<i32>) -> Self {
        match code {
            None | Some(0) => Self::Scheduled,
            Some(1) => Self::Added,
            Some(2) => Self::Unscheduled,
            Some(3) => Self::Canceled,
            Some(5) => Self::Replacement,
            Some(6) => Self::Duplicated,
            Some(7) => Self::Deleted,
            Some(8) => Self::New,
            Some(other) => Self::Other(other),
        }
    }

    /// Whether the trip as a whole is not running as scheduled.
    pub fn is_cancellation(self) -> bool {
        matches!(self, Self::Unscheduled | Self::Canceled | Self::Deleted)
    }
}

/// Stop-level schedule relationship (`StopTimeUpdate.ScheduleRelationship`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StopRelationship {
    #[default]
    Scheduled,
    Skipped,
    NoData,
    Unscheduled,
    Other(i32),
}

impl StopRelationship {
    pub fn from_code(code: Option<i32>) -> Self {
        match code {
            None | Some(0) => Self::Scheduled,
            Some(1) => Self::Skipped,
            Some(2) => Self::NoData,
            Some(3) => Self::Unscheduled,
            Some(other) => Self::Other(other),
        }
    }
}

/// Realtime prediction for one stop of a trip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StopTimeUpdate {
    pub stop_id: String,
    pub schedule_relationship: StopRelationship,
    /// Departure delay in seconds; negative when running early.
    pub departure_delay: Option<i32>,
}

impl StopTimeUpdate {
    pub fn new(stop_id: impl Into<String>, schedule_relationship: StopRelationship) -> Self {
        Self {
            stop_id: stop_id.into(),
            schedule_relationship,
            departure_delay: None,
        }
    }

    pub fn with_delay(mut self, seconds: i32) -> Self {
        self.departure_delay = Some(seconds);
        self
    }
}

/// Realtime update for one trip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TripUpdate {
    pub trip_id: String,
    pub schedule_relationship: TripRelationship,
    pub stop_time_updates: Vec<StopTimeUpdate>,
}

impl TripUpdate {
    pub fn new(trip_id: impl Into<String>, schedule_relationship: TripRelationship) -> Self {
        Self {
            trip_id: trip_id.into(),
            schedule_relationship,
            stop_time_updates: Vec::new(),
        }
    }

    pub fn with_stop(mut self, stop: StopTimeUpdate) -> Self {
        self.stop_time_updates.push(stop);
        self
    }

    /// The update for `stop_id`, if the feed has one.
    pub fn stop_update(&self, stop_id: &str) -> Option<&StopTimeUpdate> {
        self.stop_time_updates.iter().find(|s| s.stop_id == stop_id)
    }
}
