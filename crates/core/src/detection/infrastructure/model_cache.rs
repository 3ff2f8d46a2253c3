use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::blocking::Client;
use thiserror::Error;

use crate::download::domain::video_fetcher::FetchError;
use crate::download::infrastructure::http_download::{blocking_client, download_to_temp};

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("face model not found and no cache directory is available; set FACE_BLUR_MODEL_DIR")]
    NoCacheDir,
    #[error("failed to create model cache {path}: {source}")]
    CacheDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to download face model: {0}")]
    Download(#[source] FetchError),
    #[error("failed to store face model at {path}: {source}")]
    Store {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Where the service finds its face model on disk.
///
/// Lookup goes per-user cache, then the operator's model directory, and
/// only then downloads into the cache. Downloads share the video client's
/// timeout rules and land under their final name only once complete.
pub struct ModelCache {
    cache_dir: Option<PathBuf>,
    model_dir: Option<PathBuf>,
    client: Client,
}

impl ModelCache {
    pub fn new(model_dir: Option<PathBuf>, download_timeout: Duration) -> Result<Self, ModelError> {
        Self::with_cache_dir(default_cache_dir(), model_dir, download_timeout)
    }

    pub fn with_cache_dir(
        cache_dir: Option<PathBuf>,
        model_dir: Option<PathBuf>,
        download_timeout: Duration,
    ) -> Result<Self, ModelError> {
        Ok(Self {
            cache_dir,
            model_dir,
            client: blocking_client(download_timeout).map_err(ModelError::Download)?,
        })
    }

    /// Path of model `name`, downloading it from `url` when no local copy
    /// exists. `on_chunk` sees `(bytes_so_far, content_length)`.
    pub fn resolve(
        &self,
        name: &str,
        url: &str,
        on_chunk: impl FnMut(u64, Option<u64>),
    ) -> Result<PathBuf, ModelError> {
        if let Some(found) = self.find_local(name) {
            log::debug!("Using face model {}", found.display());
            return Ok(found);
        }

        let cache_dir = self.cache_dir.as_deref().ok_or(ModelError::NoCacheDir)?;
        std::fs::create_dir_all(cache_dir).map_err(|e| ModelError::CacheDir {
            path: cache_dir.to_path_buf(),
            source: e,
        })?;

        log::info!("Downloading face model {name} from {url}");
        let temp = download_to_temp(&self.client, url, cache_dir, ".part", on_chunk)
            .map_err(ModelError::Download)?;

        let dest = cache_dir.join(name);
        temp.persist(&dest).map_err(|e| ModelError::Store {
            path: dest.clone(),
            source: e.error,
        })?;
        Ok(dest)
    }

    fn find_local(&self, name: &str) -> Option<PathBuf> {
        [self.cache_dir.as_deref(), self.model_dir.as_deref()]
            .into_iter()
            .flatten()
            .map(|dir: &Path| dir.join(name))
            .find(|path| path.is_file())
    }
}

/// `<user cache>/face-blur-microservice/models`, if the platform has one.
pub fn default_cache_dir() -> Option<PathBuf> {
    dirs::cache_dir().map(|d| d.join("face-blur-microservice").join("models"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::download::infrastructure::test_server::{files_in, serve_once, serve_truncated};
    use std::fs;
    use tempfile::TempDir;

    const UNUSED_URL: &str = "http://127.0.0.1:9/face.onnx";

    fn cache(cache_dir: Option<PathBuf>, model_dir: Option<PathBuf>) -> ModelCache {
        ModelCache::with_cache_dir(cache_dir, model_dir, Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_cached_copy_wins_over_model_dir() {
        let tmp = TempDir::new().unwrap();
        let cache_dir = tmp.path().join("cache");
        let model_dir = tmp.path().join("models");
        fs::create_dir_all(&cache_dir).unwrap();
        fs::create_dir_all(&model_dir).unwrap();
        fs::write(cache_dir.join("face.onnx"), b"cached").unwrap();
        fs::write(model_dir.join("face.onnx"), b"bundled").unwrap();

        let models = cache(Some(cache_dir.clone()), Some(model_dir));
        let path = models.resolve("face.onnx", UNUSED_URL, |_, _| {}).unwrap();
        assert_eq!(path, cache_dir.join("face.onnx"));
    }

    #[test]
    fn test_model_dir_used_without_cache_dir() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("face.onnx"), b"bundled").unwrap();

        let models = cache(None, Some(tmp.path().to_path_buf()));
        let path = models.resolve("face.onnx", UNUSED_URL, |_, _| {}).unwrap();
        assert_eq!(path, tmp.path().join("face.onnx"));
    }

    #[test]
    fn test_missing_model_without_cache_dir_is_error() {
        let models = cache(None, None);
        let err = models.resolve("face.onnx", UNUSED_URL, |_, _| {}).unwrap_err();
        assert!(matches!(err, ModelError::NoCacheDir));
    }

    #[test]
    fn test_download_lands_in_cache_under_final_name() {
        let url = serve_once("200 OK", b"onnx-bytes");
        let tmp = TempDir::new().unwrap();
        let cache_dir = tmp.path().join("cache");

        let mut last = None;
        let models = cache(Some(cache_dir.clone()), None);
        let path = models
            .resolve("face.onnx", &url, |n, total| last = Some((n, total)))
            .unwrap();

        assert_eq!(path, cache_dir.join("face.onnx"));
        assert_eq!(fs::read(&path).unwrap(), b"onnx-bytes");
        assert_eq!(files_in(&cache_dir), vec![path]);
        assert_eq!(last, Some((10, Some(10))));
    }

    #[test]
    fn test_failed_download_leaves_cache_empty() {
        let url = serve_truncated(1000, b"partial");
        let tmp = TempDir::new().unwrap();
        let cache_dir = tmp.path().join("cache");

        let models = cache(Some(cache_dir.clone()), None);
        let err = models.resolve("face.onnx", &url, |_, _| {}).unwrap_err();

        assert!(matches!(err, ModelError::Download(FetchError::Body { .. })));
        assert!(files_in(&cache_dir).is_empty());
    }

    #[test]
    fn test_default_cache_dir_is_service_specific() {
        if let Some(dir) = default_cache_dir() {
            assert!(dir.ends_with("face-blur-microservice/models"));
        }
    }
}
