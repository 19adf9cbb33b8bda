//! Schedule error types.

use std::path::PathBuf;

/// Errors from loading and indexing static schedule data.
#[derive(Debug, thiserror::Error)]
pub enum ScheduleError {
    /// A schedule table could not be opened or a row could not be decoded
    #[error("failed to read {}: {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// No stop times match the route, station and departure time filters
    #[error("no relevant stop times found in timetable data")]
    NoRelevantStopTimes,
}

/// Errors from refreshing the schedule archive.
#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error status
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// Invalid API token
    #[error("invalid API token format")]
    InvalidToken,

    /// Reading or writing the archive failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Archive could not be extracted
    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// Archive would extract to more than the allowed size
    #[error("archive extracts to {size} bytes, limit is {max}")]
    TooLarge { size: u64, max: u64 },

    /// Extraction task panicked or was cancelled
    #[error("extraction task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}
