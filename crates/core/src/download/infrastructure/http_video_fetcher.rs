use std::path::PathBuf;
use std::time::Duration;

use reqwest::blocking::Client;

use crate::download::domain::video_fetcher::{FetchError, VideoFetcher};
use crate::shared::constants::INPUT_SUFFIX;

use super::http_download::{blocking_client, download_to_temp};

/// Streams a video over HTTP(S) into a persisted temp file.
pub struct HttpVideoFetcher {
    client: Client,
    work_dir: PathBuf,
}

impl HttpVideoFetcher {
    /// `timeout` applies to connecting and to each read, not to the whole
    /// transfer (see [`blocking_client`]).
    pub fn new(work_dir: impl Into<PathBuf>, timeout: Duration) -> Result<Self, FetchError> {
        Ok(Self {
            client: blocking_client(timeout)?,
            work_dir: work_dir.into(),
        })
    }
}

impl VideoFetcher for HttpVideoFetcher {
    fn fetch(&self, url: &str) -> Result<PathBuf, FetchError> {
        log::info!("Downloading video from {url}");

        let mut downloaded = 0;
        let temp = download_to_temp(&self.client, url, &self.work_dir, INPUT_SUFFIX, |n, _| {
            downloaded = n
        })?;

        let (_, path) = temp.keep().map_err(|e| FetchError::TempFile(e.error))?;
        log::info!("Video downloaded to {} ({downloaded} bytes)", path.display());
        Ok(path)
    }
}
