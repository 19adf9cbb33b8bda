//! GTFS-realtime trip updates.
//!
//! The feed is fetched as protobuf, decoded with `gtfs-realtime`, and
//! converted once into [`TripUpdate`]s. Everything downstream works on
//! those types only.

mod client;
mod convert;
mod error;
mod matcher;
mod types;

pub use client::{FeedClientConfig, GtfsRtClient};
pub use convert::{decode_feed, trip_updates_from_feed};
pub use error::FeedError;
pub use matcher::{FeedProvider, match_updates};
pub use types::{StopRelationship, StopTimeUpdate, TripRelationship, TripUpdate};
