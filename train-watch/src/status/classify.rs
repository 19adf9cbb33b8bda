//! Classifying realtime updates for the watched stop.

use crate::feed::{StopRelationship, StopTimeUpdate, TripUpdate};
use crate::notify::Notification;
use crate::schedule::ScheduleIndex;

use super::format::format_seconds;

/// Delays above this many seconds are reported as late.
pub const DELAY_THRESHOLD_SECS: i32 = 90;

/// Departures more than this many seconds ahead of schedule are reported
/// as early.
pub const EARLY_THRESHOLD_SECS: i32 = 30;

/// Status of a trip at the watched stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassifiedStatus {
    /// The whole trip is cancelled, unscheduled or deleted.
    Cancelled,
    /// The trip runs but does not stop at the watched stop.
    Skipped,
    OnTime,
    /// Running late by this many seconds.
    Delayed(u32),
    /// Running early by this many seconds.
    Early(u32),
    /// The feed has no usable prediction for the stop.
    NoData,
}

impl ClassifiedStatus {
    /// Classify a stop-level update. Trip-level cancellation is checked
    /// separately, before this is called.
    pub fn from_stop_update(update: &StopTimeUpdate) -> Self {
        match update.schedule_relationship {
            StopRelationship::Skipped => Self::Skipped,
            StopRelationship::Scheduled => match update.departure_delay {
                Some(delay) if delay > DELAY_THRESHOLD_SECS => {
                    Self::Delayed(delay.unsigned_abs())
                }
                Some(delay) if delay < -EARLY_THRESHOLD_SECS => Self::Early(delay.unsigned_abs()),
                _ => Self::OnTime,
            },
            _ => Self::NoData,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::Cancelled | Self::Skipped => "Train cancelled",
            Self::OnTime => "Train on time",
            Self::Delayed(_) => "Train delayed",
            Self::Early(_) => "Train early",
            Self::NoData => "Error",
        }
    }

    /// Notification body for a departure (`HH:MM`) at a stop.
    pub fn message(self, departure: &str, stop_name: &str) -> String {
        match self {
            Self::Cancelled | Self::Skipped => {
                format!("{departure} train at {stop_name} has been cancelled")
            }
            Self::OnTime => format!("{departure} train at {stop_name} is on time"),
            Self::Delayed(secs) => format!(
                "{departure} train at {stop_name} is delayed by {}",
                format_seconds(secs)
            ),
            Self::Early(secs) => format!(
                "{departure} train at {stop_name} is early by {}",
                format_seconds(secs)
            ),
            Self::NoData => format!("No data for {departure} train at {stop_name}"),
        }
    }
}

/// A classified update, ready for deduplication and delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub trip_id: String,
    pub stop_id: String,
    pub status: ClassifiedStatus,
    pub notification: Notification,
}

/// Classify matched updates against the schedule index.
///
/// Updates that cannot be resolved against the index, or that carry no
/// prediction for the watched stop, are skipped. The first trip-level
/// cancellation ends the batch: it is returned as the last classification
/// and no later updates are evaluated.
pub fn classify_updates(index: &ScheduleIndex, updates: &[TripUpdate]) -> Vec<Classification> {
    let mut classifications = Vec::new();

    for update in updates {
        tracing::debug!(?update, "evaluating update");

        let Some(scheduled) = index.scheduled_stop_time(&update.trip_id) else {
            tracing::warn!(trip_id = %update.trip_id, "update references a trip with no relevant stop time");
            continue;
        };
        let Some(trip) = index.trip(&update.trip_id) else {
            tracing::warn!(trip_id = %update.trip_id, "update references an unknown trip");
            continue;
        };
        let Some(stop_name) = index.stop_name(&scheduled.stop_id) else {
            tracing::warn!(stop_id = %scheduled.stop_id, "scheduled stop time references an unknown stop");
            continue;
        };
        tracing::debug!(?scheduled, ?trip, "resolved schedule");

        let departure = scheduled.departure_hhmm();

        if update.schedule_relationship.is_cancellation() {
            let status = ClassifiedStatus::Cancelled;
            classifications.push(Classification {
                trip_id: update.trip_id.clone(),
                stop_id: scheduled.stop_id.clone(),
                status,
                notification: Notification::for_stop(
                    &update.trip_id,
                    &scheduled.stop_id,
                    status.title(),
                    status.message(departure, stop_name),
                ),
            });
            break;
        }

        let Some(stop_update) = update.stop_update(&scheduled.stop_id) else {
            tracing::debug!(trip_id = %update.trip_id, stop_id = %scheduled.stop_id, "no update for stop yet");
            continue;
        };
        tracing::debug!(?stop_update, "update for stop");

        let status = ClassifiedStatus::from_stop_update(stop_update);
        classifications.push(Classification {
            trip_id: update.trip_id.clone(),
            stop_id: scheduled.stop_id.clone(),
            status,
            notification: Notification::for_stop(
                &update.trip_id,
                &scheduled.stop_id,
                status.title(),
                status.message(departure, stop_name),
            ),
        });
    }

    classifications
}
