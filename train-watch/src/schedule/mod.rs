//! Static GTFS schedule data.
//!
//! Reads `stops.txt`, `trips.txt` and `stop_times.txt` from an extracted
//! GTFS feed and narrows them down to the stop times of one watched
//! departure (route prefix, station name, departure time prefix).

mod download;
mod error;
mod index;
mod records;
mod source;

pub use download::{
    ScheduleDownloadConfig, ScheduleDownloader, filename_from_content_disposition,
    is_stale_archive,
};
pub use error::{DownloadError, ScheduleError};
pub use index::{ScheduleIndex, ScheduleQuery};
pub use records::{StopRecord, StopTimeRecord, TripRecord};
pub use source::{GtfsDirectory, RowFilter, ScheduleSource};
