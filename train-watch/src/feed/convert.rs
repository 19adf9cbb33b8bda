//! Conversion from decoded GTFS-realtime messages to [`TripUpdate`]s.

use prost::Message;

use super::error::FeedError;
use super::types::{StopRelationship, StopTimeUpdate, TripRelationship, TripUpdate};

/// Decode a protobuf `FeedMessage`.
pub fn decode_feed(bytes: &[u8]) -> Result<gtfs_realtime::FeedMessage, FeedError> {
    Ok(gtfs_realtime::FeedMessage::decode(bytes)?)
}

/// Extract trip updates from a feed, in feed order.
///
/// Entities without a trip update or without a trip id are dropped, as are
/// stop time updates without a stop id.
pub fn trip_updates_from_feed(feed: &gtfs_realtime::FeedMessage) -> Vec<TripUpdate> {
    feed.entity
        .iter()
        .filter_map(|entity| entity.trip_update.as_ref())
        .filter_map(convert_trip_update)
        .collect()
}

fn convert_trip_update(update: &gtfs_realtime::TripUpdate) -> Option<TripUpdate> {
    let trip_id = update.trip.trip_id.clone()?;

    let stop_time_updates = update
        .stop_time_update
        .iter()
        .filter_map(|stu| {
            let stop_id = stu.stop_id.clone()?;
            Some(StopTimeUpdate {
                stop_id,
                schedule_relationship: StopRelationship::from_code(stu.schedule_relationship),
                departure_delay: stu.departure.as_ref().and_then(|d| d.delay),
            })
        })
        .collect();

    Some(TripUpdate {
        trip_id,
        schedule_relationship: TripRelationship::from_code(update.trip.schedule_relationship),
        stop_time_updates,
    })
}
