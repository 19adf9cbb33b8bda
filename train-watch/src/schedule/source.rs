//! Reading schedule tables from a GTFS directory.

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;

use super::error::ScheduleError;
use super::records::{StopRecord, StopTimeRecord, TripRecord};

/// Row filter applied while a table is read.
pub type RowFilter<'a, T> = &'a mut dyn FnMut(&T) -> bool;

/// Source of static schedule rows.
///
/// Implementations apply the filter while reading so that large tables
/// (`stop_times.txt` runs to millions of rows) never sit in memory whole.
pub trait ScheduleSource {
    fn stops(&self, filter: RowFilter<'_, StopRecord>) -> Result<Vec<StopRecord>, ScheduleError>;

    fn trips(&self, filter: RowFilter<'_, TripRecord>) -> Result<Vec<TripRecord>, ScheduleError>;

    fn stop_times(
        &self,
        filter: RowFilter<'_, StopTimeRecord>,
    ) -> Result<Vec<StopTimeRecord>, ScheduleError>;
}

/// An extracted GTFS feed on disk.
#[derive(Debug, Clone)]
pub struct GtfsDirectory {
    dir: PathBuf,
}

impl GtfsDirectory {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path(&self) -> &Path {
        &self.dir
    }

    fn read_filtered<T: DeserializeOwned>(
        &self,
        file_name: &str,
        filter: RowFilter<'_, T>,
    ) -> Result<Vec<T>, ScheduleError> {
        let path = self.dir.join(file_name);
        let csv_error = |source| ScheduleError::Csv {
            path: path.clone(),
            source,
        };

        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(&path)
            .map_err(csv_error)?;

        let mut rows = Vec::new();
        for row in reader.deserialize::<T>() {
            let row = row.map_err(csv_error)?;
            if filter(&row) {
                rows.push(row);
            }
        }

        Ok(rows)
    }
}

impl ScheduleSource for GtfsDirectory {
    fn stops(&self, filter: RowFilter<'_, StopRecord>) -> Result<Vec<StopRecord>, ScheduleError> {
        self.read_filtered("stops.txt", filter)
    }

    fn trips(&self, filter: RowFilter<'_, TripRecord>) -> Result<Vec<TripRecord>, ScheduleError> {
        self.read_filtered("trips.txt", filter)
    }

    fn stop_times(
        &self,
        filter: RowFilter<'_, StopTimeRecord>,
    ) -> Result<Vec<StopTimeRecord>, ScheduleError> {
        self.read_filtered("stop_times.txt", filter)
    }
}
