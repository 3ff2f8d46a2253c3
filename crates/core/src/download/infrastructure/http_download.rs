use std::io::{Read, Write};
use std::path::Path;
use std::time::Duration;

use reqwest::blocking::Client;
use tempfile::NamedTempFile;

use crate::download::domain::video_fetcher::FetchError;
use crate::shared::constants::DOWNLOAD_CHUNK_SIZE;

/// Blocking client for video and model downloads.
///
/// `timeout` bounds connecting, waiting for the response head and every
/// single body read. The transfer as a whole has no deadline, so a large
/// download succeeds for as long as bytes keep arriving.
pub fn blocking_client(timeout: Duration) -> Result<Client, FetchError> {
    Client::builder()
        .connect_timeout(timeout)
        .timeout(timeout)
        .build()
        .map_err(FetchError::Client)
}

/// Streams `url` into a fresh temp file in `dir`.
///
/// `on_chunk` gets `(bytes_so_far, content_length)` after every chunk.
/// The returned file is still deleted on drop; callers `keep` or `persist`
/// it once they own the result. Any error drops (and deletes) it here.
pub fn download_to_temp(
    client: &Client,
    url: &str,
    dir: &Path,
    suffix: &str,
    mut on_chunk: impl FnMut(u64, Option<u64>),
) -> Result<NamedTempFile, FetchError> {
    let mut response = client
        .get(url)
        .send()
        .and_then(|r| r.error_for_status())
        .map_err(|e| FetchError::Request {
            url: url.to_string(),
            source: e,
        })?;
    let total = response.content_length();

    let mut temp = tempfile::Builder::new()
        .suffix(suffix)
        .tempfile_in(dir)
        .map_err(FetchError::TempFile)?;

    let mut buf = vec![0u8; DOWNLOAD_CHUNK_SIZE];
    let mut downloaded: u64 = 0;
    loop {
        let n = response.read(&mut buf).map_err(|e| FetchError::Body {
            url: url.to_string(),
            source: e,
        })?;
        if n == 0 {
            break;
        }
        temp.write_all(&buf[..n]).map_err(FetchError::TempFile)?;
        downloaded += n as u64;
        on_chunk(downloaded, total);
    }
    temp.flush().map_err(FetchError::TempFile)?;
    Ok(temp)
}
