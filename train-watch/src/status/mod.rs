//! Status classification for the watched departure.

mod classify;
mod format;

pub use classify::{
    Classification, ClassifiedStatus, DELAY_THRESHOLD_SECS, EARLY_THRESHOLD_SECS,
    classify_updates,
};
pub use format::format_seconds;
