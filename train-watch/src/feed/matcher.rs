//! Matching realtime updates against the watched trips.

use std::collections::HashSet;

use futures::future::BoxFuture;

use super::error::FeedError;
use super::types::TripUpdate;

/// Source of realtime trip updates.
///
/// A fetch either yields the whole decoded feed or fails; there are no
/// partial results.
pub trait FeedProvider: Send + Sync {
    fn fetch_trip_updates(&self) -> BoxFuture<'_, Result<Vec<TripUpdate>, FeedError>>;
}

/// Keep the updates whose trip id is relevant, preserving feed order.
pub fn match_updates(updates: Vec<TripUpdate>, relevant_trip_ids: &HashSet<&str>) -> Vec<TripUpdate> {
    updates
        .into_iter()
        .filter(|update| relevant_trip_ids.contains(update.trip_id.as_str()))
        .collect()
}
