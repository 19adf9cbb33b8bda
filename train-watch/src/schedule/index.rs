//! Lookup structures for the watched departure.
//!
//! The index joins the three schedule tables down to the stop times that
//! match all of the route prefix, station name and departure time filters.

use std::collections::{HashMap, HashSet};

use super::error::ScheduleError;
use super::records::{StopRecord, StopTimeRecord, TripRecord};
use super::source::ScheduleSource;

/// The departure being watched, as given on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleQuery {
    /// Prefix of `route_id` (e.g. `"BMT_1"`).
    pub route_prefix: String,
    /// Case-sensitive substring of `stop_name` (e.g. `"Central Station"`).
    pub station_name: String,
    /// Prefix of `departure_time` (e.g. `"07:56"`).
    pub time_prefix: String,
}

impl ScheduleQuery {
    pub fn new(
        route_prefix: impl Into<String>,
        station_name: impl Into<String>,
        time_prefix: impl Into<String>,
    ) -> Self {
        Self {
            route_prefix: route_prefix.into(),
            station_name: station_name.into(),
            time_prefix: time_prefix.into(),
        }
    }

    pub fn matches_stop(&self, stop: &StopRecord) -> bool {
        stop.stop_name.contains(&self.station_name)
    }

    pub fn matches_trip(&self, trip: &TripRecord) -> bool {
        trip.route_id.starts_with(&self.route_prefix)
    }

    pub fn matches_departure(&self, stop_time: &StopTimeRecord) -> bool {
        stop_time.departure_time.starts_with(&self.time_prefix)
    }
}

/// Schedule data relevant to one watched departure.
#[derive(Debug, Clone)]
pub struct ScheduleIndex {
    station_stop_ids: HashSet<String>,
    stop_name_for_id: HashMap<String, String>,
    route_trip_ids: HashSet<String>,
    trip_for_id: HashMap<String, TripRecord>,
    relevant_stop_times: Vec<StopTimeRecord>,
}

impl ScheduleIndex {
    /// Build the index from schedule rows.
    ///
    /// Rows may be pre-filtered or not; the query's predicates are applied
    /// here regardless. Returns [`ScheduleError::NoRelevantStopTimes`] when
    /// no stop time satisfies all three filters.
    pub fn build(
        query: &ScheduleQuery,
        stops: impl IntoIterator<Item = StopRecord>,
        trips: impl IntoIterator<Item = TripRecord>,
        stop_times: impl IntoIterator<Item = StopTimeRecord>,
    ) -> Result<Self, ScheduleError> {
        let stop_name_for_id: HashMap<String, String> = stops
            .into_iter()
            .filter(|stop| query.matches_stop(stop))
            .map(|stop| (stop.stop_id, stop.stop_name))
            .collect();
        let station_stop_ids: HashSet<String> = stop_name_for_id.keys().cloned().collect();

        let trip_for_id: HashMap<String, TripRecord> = trips
            .into_iter()
            .filter(|trip| query.matches_trip(trip))
            .map(|trip| (trip.trip_id.clone(), trip))
            .collect();
        let route_trip_ids: HashSet<String> = trip_for_id.keys().cloned().collect();

        let relevant_stop_times: Vec<StopTimeRecord> = stop_times
            .into_iter()
            .filter(|st| is_relevant(query, &route_trip_ids, &station_stop_ids, st))
            .collect();

        if relevant_stop_times.is_empty() {
            return Err(ScheduleError::NoRelevantStopTimes);
        }

        Ok(Self {
            station_stop_ids,
            stop_name_for_id,
            route_trip_ids,
            trip_for_id,
            relevant_stop_times,
        })
    }

    /// Load the index from a schedule source, filtering while reading.
    pub fn load<S: ScheduleSource + ?Sized>(
        source: &S,
        query: &ScheduleQuery,
    ) -> Result<Self, ScheduleError> {
        let stops = source.stops(&mut |stop: &StopRecord| query.matches_stop(stop))?;
        let station_stop_ids: HashSet<String> =
            stops.iter().map(|stop| stop.stop_id.clone()).collect();
        tracing::debug!(count = stops.len(), "loaded station stops");

        let trips = source.trips(&mut |trip: &TripRecord| query.matches_trip(trip))?;
        let route_trip_ids: HashSet<String> =
            trips.iter().map(|trip| trip.trip_id.clone()).collect();
        tracing::debug!(count = trips.len(), "loaded route trips");

        let stop_times = source.stop_times(&mut |st: &StopTimeRecord| {
            is_relevant(query, &route_trip_ids, &station_stop_ids, st)
        })?;
        tracing::debug!(count = stop_times.len(), "loaded relevant stop times");

        Self::build(query, stops, trips, stop_times)
    }

    pub fn station_stop_ids(&self) -> &HashSet<String> {
        &self.station_stop_ids
    }

    pub fn route_trip_ids(&self) -> &HashSet<String> {
        &self.route_trip_ids
    }

    /// Stop times matching all three filters, in schedule order.
    pub fn relevant_stop_times(&self) -> &[StopTimeRecord] {
        &self.relevant_stop_times
    }

    /// Trip ids appearing in the relevant stop times.
    pub fn relevant_trip_ids(&self) -> HashSet<&str> {
        self.relevant_stop_times
            .iter()
            .map(|st| st.trip_id.as_str())
            .collect()
    }

    /// The first relevant stop time for a trip.
    pub fn scheduled_stop_time(&self, trip_id: &str) -> Option<&StopTimeRecord> {
        self.relevant_stop_times
            .iter()
            .find(|st| st.trip_id == trip_id)
    }

    pub fn trip(&self, trip_id: &str) -> Option<&TripRecord> {
        self.trip_for_id.get(trip_id)
    }

    pub fn stop_name(&self, stop_id: &str) -> Option<&str> {
        self.stop_name_for_id.get(stop_id).map(String::as_str)
    }
}

fn is_relevant(
    query: &ScheduleQuery,
    route_trip_ids: &HashSet<String>,
    station_stop_ids: &HashSet<String>,
    stop_time: &StopTimeRecord,
) -> bool {
    route_trip_ids.contains(&stop_time.trip_id)
        && station_stop_ids.contains(&stop_time.stop_id)
        && query.matches_departure(stop_time)
}
