//! Video downloader
//!
//! An existing destination file means the work is already done; the download
//! is skipped without touching the network. Transfers stream into
//! `<dest>.part` and are renamed into place once complete, so a half-written
//! file never counts as done.
//!
//! Calls for the same destination are serialized through an in-flight
//! registry; a caller that waits behind a running transfer sees the finished
//! file and skips.

use std::collections::HashMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use reqwest::StatusCode;
use thiserror::Error;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};
use url::Url;

/// Downloader errors
#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("Network error downloading {url}: {source}")]
    Network {
        url: Url,
        #[source]
        source: reqwest::Error,
    },

    #[error("Download of {url} returned HTTP {status}")]
    Status { url: Url, status: StatusCode },

    #[error("File error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl DownloadError {
    fn io(path: &Path) -> impl FnOnce(std::io::Error) -> Self + '_ {
        move |source| DownloadError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// What a download call did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadOutcome {
    /// Bytes were fetched and written
    Downloaded { bytes: u64 },
    /// Destination already existed
    Skipped,
}

impl DownloadOutcome {
    pub fn is_skipped(&self) -> bool {
        matches!(self, DownloadOutcome::Skipped)
    }
}

type Slot = Arc<tokio::sync::Mutex<()>>;

/// Destination path → lock held for the duration of a transfer
#[derive(Debug, Default)]
struct InFlight {
    slots: Mutex<HashMap<PathBuf, Slot>>,
}

impl InFlight {
    fn lease(&self, path: &Path) -> Lease<'_> {
        let mut slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
        let slot = slots.entry(path.to_path_buf()).or_default().clone();
        Lease {
            registry: self,
            path: path.to_path_buf(),
            slot,
        }
    }

    fn len(&self) -> usize {
        self.slots.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

/// Claim on a destination slot; drops the registry entry when the last
/// holder goes away
struct Lease<'a> {
    registry: &'a InFlight,
    path: PathBuf,
    slot: Slot,
}

impl Drop for Lease<'_> {
    fn drop(&mut self) {
        let mut slots = self
            .registry
            .slots
            .lock()
            .unwrap_or_else(|e| e.into_inner());
        // Registry entry + this lease
        if Arc::strong_count(&self.slot) == 2 {
            slots.remove(&self.path);
        }
    }
}

/// Streams remote assets to local files
#[derive(Debug)]
pub struct AssetDownloader {
    http: reqwest::Client,
    in_flight: InFlight,
}

impl AssetDownloader {
    pub fn new(http: reqwest::Client) -> Self {
        Self {
            http,
            in_flight: InFlight::default(),
        }
    }

    /// Download `url` to `dest` unless `dest` already exists
    ///
    /// Creates missing parent directories. On failure a partial `.part` file
    /// is removed if possible; nothing else is rolled back.
    pub async fn download(&self, url: &Url, dest: &Path) -> Result<DownloadOutcome, DownloadError> {
        let lease = self.in_flight.lease(dest);
        let _guard = lease.slot.lock().await;

        if fs::try_exists(dest).await.map_err(DownloadError::io(dest))? {
            info!(file = %dest.display(), "File already exists, skipping download");
            return Ok(DownloadOutcome::Skipped);
        }

        if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .map_err(DownloadError::io(parent))?;
        }

        let part = part_path(dest);
        let bytes = match self.stream_to(url, &part).await {
            Ok(bytes) => bytes,
            Err(e) => {
                if let Err(cleanup) = fs::remove_file(&part).await {
                    if cleanup.kind() != std::io::ErrorKind::NotFound {
                        warn!(file = %part.display(), "Failed to remove partial download: {}", cleanup);
                    }
                }
                return Err(e);
            }
        };

        fs::rename(&part, dest)
            .await
            .map_err(DownloadError::io(dest))?;

        info!(file = %dest.display(), bytes, "File downloaded");
        Ok(DownloadOutcome::Downloaded { bytes })
    }

    async fn stream_to(&self, url: &Url, part: &Path) -> Result<u64, DownloadError> {
        debug!(url = %url, "Downloading");

        let network = |source| DownloadError::Network {
            url: url.clone(),
            source,
        };

        let mut response = self.http.get(url.clone()).send().await.map_err(network)?;

        let status = response.status();
        if !status.is_success() {
            return Err(DownloadError::Status {
                url: url.clone(),
                status,
            });
        }

        let mut file = fs::File::create(part).await.map_err(DownloadError::io(part))?;
        let mut written = 0u64;

        while let Some(chunk) = response.chunk().await.map_err(network)? {
            file.write_all(&chunk).await.map_err(DownloadError::io(part))?;
            written += chunk.len() as u64;
        }

        file.flush().await.map_err(DownloadError::io(part))?;
        Ok(written)
    }

    /// Destinations with a transfer running or queued
    pub fn in_flight_count(&self) -> usize {
        self.in_flight.len()
    }
}

fn part_path(dest: &Path) -> PathBuf {
    let mut name: OsString = dest.file_name().unwrap_or_default().to_os_string();
    name.push(".part");
    dest.with_file_name(name)
}
