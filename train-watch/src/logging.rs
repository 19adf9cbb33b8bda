//! Logging to stdout and a per-run log file.

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{Duration, SystemTime};

use chrono::{DateTime, SecondsFormat, Utc};
use tracing::Subscriber;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::{BoxMakeWriter, MakeWriterExt};
use tracing_subscriber::util::SubscriberInitExt;

/// Log files older than this are deleted at start-up.
pub const LOG_RETENTION: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Prefix shared by all run log files.
const LOG_FILE_PREFIX: &str = "log_";

/// Log file name for a run started at `started`.
pub fn log_file_name(started: DateTime<Utc>) -> String {
    let stamp = started
        .to_rfc3339_opts(SecondsFormat::Millis, true)
        .replace(':', "-");
    format!("{LOG_FILE_PREFIX}{stamp}.txt")
}

/// Install the global subscriber, writing to stdout and a new file in
/// `logs_dir`. Filtering follows `RUST_LOG`, defaulting to `info`.
///
/// If the log file cannot be created, logging still goes to stdout and the
/// file error is returned. Otherwise returns the path of the log file.
pub fn init(logs_dir: &Path) -> io::Result<PathBuf> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let (subscriber, log_file) = subscriber(logs_dir, filter);

    if let Err(e) = subscriber.try_init() {
        eprintln!("Warning: logging already initialised: {e}");
    }

    log_file
}

/// Build the subscriber used by [`init`] without installing it.
fn subscriber(
    logs_dir: &Path,
    filter: EnvFilter,
) -> (impl Subscriber + Send + Sync + 'static, io::Result<PathBuf>) {
    let (writer, log_file) = match open_log_file(logs_dir) {
        Ok((path, file)) => (
            BoxMakeWriter::new(io::stdout.and(Mutex::new(file))),
            Ok(path),
        ),
        Err(e) => (BoxMakeWriter::new(io::stdout), Err(e)),
    };

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(writer)
        .finish();

    (subscriber, log_file)
}

fn open_log_file(logs_dir: &Path) -> io::Result<(PathBuf, File)> {
    std::fs::create_dir_all(logs_dir)?;
    let path = logs_dir.join(log_file_name(Utc::now()));
    let file = File::create(&path)?;
    Ok((path, file))
}

/// Delete run log files in `logs_dir` last modified more than `max_age`
/// ago. Other files (such as the notification record) are left alone.
///
/// Returns the number of files deleted.
pub fn prune_old_logs(logs_dir: &Path, max_age: Duration) -> io::Result<usize> {
    let cutoff = SystemTime::now()
        .checked_sub(max_age)
        .unwrap_or(SystemTime::UNIX_EPOCH);
    let mut deleted = 0;

    for entry in std::fs::read_dir(logs_dir)? {
        let entry = entry?;
        let is_log = entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.starts_with(LOG_FILE_PREFIX));
        if !is_log {
            continue;
        }

        let modified = entry.metadata()?.modified()?;
        if modified < cutoff {
            std::fs::remove_file(entry.path())?;
            deleted += 1;
        }
    }

    Ok(deleted)
}
