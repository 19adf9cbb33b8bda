//! Refreshing the static schedule archive.
//!
//! The schedule API answers with a zip attachment whose filename carries a
//! version number (`sydneytrains_GTFS_<digits>.zip`). A filename already
//! present on disk means the extracted data is current and nothing is
//! downloaded.

use std::path::{Path, PathBuf};

use reqwest::header::{AUTHORIZATION, CONTENT_DISPOSITION, HeaderMap, HeaderValue};

use super::error::DownloadError;

/// Default schedule endpoint.
const DEFAULT_SCHEDULE_URL: &str = "https://api.transport.nsw.gov.au/v1/gtfs/schedule/sydneytrains";

/// Largest total uncompressed size accepted from an archive (2 GB).
const MAX_EXTRACTED_SIZE: u64 = 2 * 1024 * 1024 * 1024;

/// Filename prefix of versioned schedule archives.
const ARCHIVE_PREFIX: &str = "sydneytrains_GTFS_";

/// Configuration for the schedule downloader.
#[derive(Debug, Clone)]
pub struct ScheduleDownloadConfig {
    /// API token for the schedule endpoint
    pub api_token: String,
    /// Schedule endpoint URL
    pub url: String,
    /// Directory where archives are saved
    pub archive_dir: PathBuf,
    /// Directory the archive is extracted into
    pub extract_dir: PathBuf,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl ScheduleDownloadConfig {
    /// Create a new config extracting into `extract_dir`.
    ///
    /// Archives are kept in the parent of `extract_dir`.
    pub fn new(api_token: impl Into<String>, extract_dir: impl Into<PathBuf>) -> Self {
        let extract_dir = extract_dir.into();
        let archive_dir = extract_dir
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));

        Self {
            api_token: api_token.into(),
            url: DEFAULT_SCHEDULE_URL.to_string(),
            archive_dir,
            extract_dir,
            timeout_secs: 120,
        }
    }

    /// Set a custom endpoint URL.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }
}

/// Downloads and extracts schedule archives.
#[derive(Debug, Clone)]
pub struct ScheduleDownloader {
    http: reqwest::Client,
    config: ScheduleDownloadConfig,
}

impl ScheduleDownloader {
    pub fn new(config: ScheduleDownloadConfig) -> Result<Self, DownloadError> {
        let mut headers = HeaderMap::new();
        let auth = HeaderValue::from_str(&format!("apikey {}", config.api_token))
            .map_err(|_| DownloadError::InvalidToken)?;
        headers.insert(AUTHORIZATION, auth);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { http, config })
    }

    /// Download the current archive if it is not already on disk.
    ///
    /// Returns the path of a newly downloaded and extracted archive, or
    /// `None` if nothing needed doing. Older archives are deleted after a
    /// successful extraction.
    pub async fn refresh(&self) -> Result<Option<PathBuf>, DownloadError> {
        let response = self.http.get(&self.config.url).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DownloadError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let disposition = response
            .headers()
            .get(CONTENT_DISPOSITION)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();

        if !disposition.contains("attachment") {
            tracing::warn!("schedule response has no attachment content-disposition");
            return Ok(None);
        }

        let Some(filename) = filename_from_content_disposition(&disposition) else {
            tracing::warn!(%disposition, "filename not found in content-disposition header");
            return Ok(None);
        };

        let archive_path = self.config.archive_dir.join(&filename);
        if archive_path.exists() {
            tracing::info!(%filename, "schedule archive already exists, skipping download");
            return Ok(None);
        }

        let bytes = response.bytes().await?;
        std::fs::create_dir_all(&self.config.archive_dir)?;
        std::fs::write(&archive_path, &bytes)?;
        tracing::info!(%filename, size = bytes.len(), "schedule archive downloaded");

        let extract_from = archive_path.clone();
        let extract_to = self.config.extract_dir.clone();
        let extracted = tokio::task::spawn_blocking(move || {
            extract_archive(&extract_from, &extract_to, MAX_EXTRACTED_SIZE)
        })
        .await
        .map_err(DownloadError::from)
        .and_then(|result| result);
        if let Err(e) = extracted {
            // A leftover archive would make later runs skip the download.
            if let Err(remove) = std::fs::remove_file(&archive_path) {
                tracing::warn!(%filename, error = %remove, "could not remove unextracted archive");
            }
            return Err(e);
        }
        tracing::info!(dir = %self.config.extract_dir.display(), "schedule archive extracted");

        delete_old_archives(&self.config.archive_dir, &filename);

        Ok(Some(archive_path))
    }
}

/// Extract the filename from a `Content-Disposition` header value.
pub fn filename_from_content_disposition(header: &str) -> Option<String> {
    let start = header.find("filename")?;
    let (_, value) = header[start..].split_once('=')?;
    let value = value.split(';').next()?.trim();
    let name = value.replace(['"', '\''], "");

    if name.is_empty() { None } else { Some(name) }
}

/// Whether `name` is a versioned schedule archive other than `current`.
pub fn is_stale_archive(name: &str, current: &str) -> bool {
    if name == current {
        return false;
    }

    name.strip_prefix(ARCHIVE_PREFIX)
        .and_then(|rest| rest.strip_suffix(".zip"))
        .is_some_and(|version| !version.is_empty() && version.bytes().all(|b| b.is_ascii_digit()))
}

fn extract_archive(archive: &Path, dir: &Path, max_size: u64) -> Result<(), DownloadError> {
    let file = std::fs::File::open(archive)?;
    let mut zip = zip::ZipArchive::new(file)?;

    let mut size = 0u64;
    for i in 0..zip.len() {
        size = size.saturating_add(zip.by_index(i)?.size());
    }
    if size > max_size {
        return Err(DownloadError::TooLarge {
            size,
            max: max_size,
        });
    }

    std::fs::create_dir_all(dir)?;
    zip.extract(dir)?;
    Ok(())
}

/// Delete archives superseded by `current`. Failures are logged, not returned.
fn delete_old_archives(dir: &Path, current: &str) {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!(dir = %dir.display(), error = %e, "unable to scan archive directory");
            return;
        }
    };

    for entry in entries.flatten() {
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        if !is_stale_archive(name, current) {
            continue;
        }

        match std::fs::remove_file(entry.path()) {
            Ok(()) => tracing::info!(file = name, "deleted old schedule archive"),
            Err(e) => tracing::warn!(file = name, error = %e, "could not delete old schedule archive"),
        }
    }
}
