//! Train departure watcher.
//!
//! Watches one scheduled departure (route, station, time) against a
//! GTFS-realtime feed and tells the operator about cancellations, delays
//! and early running, at most once per distinct status per day.

pub mod config;
pub mod feed;
pub mod logging;
pub mod notify;
pub mod run;
pub mod schedule;
pub mod status;

#[cfg(test)]
mod testing;
