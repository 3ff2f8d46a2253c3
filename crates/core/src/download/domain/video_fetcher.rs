use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("failed to download video from {url}: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("failed to read video body from {url}: {source}")]
    Body {
        url: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write temporary video file: {0}")]
    TempFile(#[source] std::io::Error),
}

/// Port for bringing a remote video onto the local filesystem.
pub trait VideoFetcher: Send + Sync {
    /// Downloads `url` and returns the path of the local copy.
    ///
    /// The caller owns the returned file. On error no file is left behind.
    fn fetch(&self, url: &str) -> Result<PathBuf, FetchError>;
}
