use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;

use crate::download::domain::video_fetcher::{FetchError, VideoFetcher};
use crate::shared::constants::{INPUT_SUFFIX, OUTPUT_SUFFIX};
use crate::shared::error::BoxError;

use super::video_processor::VideoProcessor;

#[derive(Error, Debug)]
pub enum BlurError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error("failed to process video: {0}")]
    Processing(#[source] BoxError),
    #[error("failed to read output file {path}: {source}")]
    Output {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result of one remote blur job.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlurOutcome {
    pub faces_found: usize,
    pub output_path: PathBuf,
    pub file_size: u64,
}

/// Fetches a remote video, blurs it next to the download and reports
/// where the result landed.
///
/// Single-use: the processor is built for one request.
pub struct BlurRemoteVideoUseCase {
    fetcher: Arc<dyn VideoFetcher>,
    processor: Box<dyn VideoProcessor>,
}

impl BlurRemoteVideoUseCase {
    pub fn new(fetcher: Arc<dyn VideoFetcher>, processor: Box<dyn VideoProcessor>) -> Self {
        Self { fetcher, processor }
    }

    pub fn execute(&mut self, url: &str) -> Result<BlurOutcome, BlurError> {
        let input = self.fetcher.fetch(url)?;
        let output = output_path_for(&input);

        let report = match self.processor.process(&input, &output) {
            Ok(report) => report,
            Err(e) => {
                log::error!("Error processing video {}: {e}", input.display());
                remove_quietly(&input);
                return Err(BlurError::Processing(e));
            }
        };

        let file_size = std::fs::metadata(&output)
            .map_err(|e| BlurError::Output {
                path: output.clone(),
                source: e,
            })?
            .len();

        remove_quietly(&input);

        Ok(BlurOutcome {
            faces_found: report.faces_found,
            output_path: output,
            file_size,
        })
    }
}

/// `clip.mp4` → `clip_blurred.mp4`, in the same directory.
///
/// Only the trailing `.mp4` is replaced; other names get the suffix appended.
pub fn output_path_for(input: &Path) -> PathBuf {
    let name = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let stem = name.strip_suffix(INPUT_SUFFIX).unwrap_or(&name);
    input.with_file_name(format!("{stem}{OUTPUT_SUFFIX}"))
}

fn remove_quietly(path: &Path) {
    if let Err(e) = std::fs::remove_file(path) {
        log::debug!("Could not remove {}: {e}", path.display());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::video_processor::BlurReport;
    use rstest::rstest;
    use std::sync::Mutex;
    use tempfile::TempDir;

    // --- Stubs ---

    /// Drops a small file into the work dir, like a real download.
    struct StubFetcher {
        dir: PathBuf,
    }

    impl VideoFetcher for StubFetcher {
        fn fetch(&self, _url: &str) -> Result<PathBuf, FetchError> {
            let path = self.dir.join("abc123.mp4");
            std::fs::write(&path, b"input").map_err(FetchError::TempFile)?;
            Ok(path)
        }
    }

    struct FailingFetcher;

    impl VideoFetcher for FailingFetcher {
        fn fetch(&self, _url: &str) -> Result<PathBuf, FetchError> {
            Err(FetchError::TempFile(std::io::Error::other("disk full")))
        }
    }

    struct StubProcessor {
        output_bytes: Option<&'static [u8]>,
        faces: usize,
        seen: Arc<Mutex<Option<(PathBuf, PathBuf)>>>,
    }

    impl VideoProcessor for StubProcessor {
        fn process(&mut self, input: &Path, output: &Path) -> Result<BlurReport, BoxError> {
            *self.seen.lock().unwrap() = Some((input.to_path_buf(), output.to_path_buf()));
            match self.output_bytes {
                Some(bytes) => {
                    std::fs::write(output, bytes)?;
                    Ok(BlurReport {
                        frames_processed: 3,
                        faces_found: self.faces,
                    })
                }
                None => Err("could not open video file".into()),
            }
        }
    }

    fn processor(
        output_bytes: Option<&'static [u8]>,
        faces: usize,
    ) -> (Box<dyn VideoProcessor>, Arc<Mutex<Option<(PathBuf, PathBuf)>>>) {
        let seen = Arc::new(Mutex::new(None));
        (
            Box::new(StubProcessor {
                output_bytes,
                faces,
                seen: seen.clone(),
            }),
            seen,
        )
    }

    // --- Tests ---

    #[rstest]
    #[case::plain("/tmp/abc.mp4", "/tmp/abc_blurred.mp4")]
    #[case::dotted_dir("/tmp/x.mp4.d/abc.mp4", "/tmp/x.mp4.d/abc_blurred.mp4")]
    #[case::other_extension("/tmp/abc.mov", "/tmp/abc.mov_blurred.mp4")]
    fn test_output_path_for(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(output_path_for(Path::new(input)), PathBuf::from(expected));
    }

    #[test]
    fn test_success_reports_output_and_removes_input() {
        let dir = TempDir::new().unwrap();
        let (proc, seen) = processor(Some(&b"0123456789"[..]), 7);
        let mut use_case = BlurRemoteVideoUseCase::new(
            Arc::new(StubFetcher {
                dir: dir.path().to_path_buf(),
            }),
            proc,
        );

        let outcome = use_case.execute("http://host/video.mp4").unwrap();

        let input = dir.path().join("abc123.mp4");
        let output = dir.path().join("abc123_blurred.mp4");
        assert_eq!(
            outcome,
            BlurOutcome {
                faces_found: 7,
                output_path: output.clone(),
                file_size: 10,
            }
        );
        assert_eq!(*seen.lock().unwrap(), Some((input.clone(), output.clone())));
        assert!(!input.exists());
        assert!(output.exists());
    }

    #[test]
    fn test_fetch_failure_skips_processing() {
        let (proc, seen) = processor(Some(&b"x"[..]), 0);
        let mut use_case = BlurRemoteVideoUseCase::new(Arc::new(FailingFetcher), proc);

        let err = use_case.execute("http://host/video.mp4").unwrap_err();
        assert!(matches!(err, BlurError::Fetch(_)));
        assert!(err.to_string().contains("disk full"));
        assert!(seen.lock().unwrap().is_none());
    }

    #[test]
    fn test_processing_failure_is_processing_error() {
        let dir = TempDir::new().unwrap();
        let (proc, _seen) = processor(None, 0);
        let mut use_case = BlurRemoteVideoUseCase::new(
            Arc::new(StubFetcher {
                dir: dir.path().to_path_buf(),
            }),
            proc,
        );

        let err = use_case.execute("http://host/video.mp4").unwrap_err();
        assert!(matches!(err, BlurError::Processing(_)));
        assert!(!dir.path().join("abc123.mp4").exists());
    }

    #[test]
    fn test_missing_output_is_output_error() {
        struct NoOutputProcessor;
        impl VideoProcessor for NoOutputProcessor {
            fn process(&mut self, _input: &Path, _output: &Path) -> Result<BlurReport, BoxError> {
                Ok(BlurReport::default())
            }
        }

        let dir = TempDir::new().unwrap();
        let mut use_case = BlurRemoteVideoUseCase::new(
            Arc::new(StubFetcher {
                dir: dir.path().to_path_buf(),
            }),
            Box::new(NoOutputProcessor),
        );

        let err = use_case.execute("http://host/video.mp4").unwrap_err();
        assert!(matches!(err, BlurError::Output { .. }));
        assert!(err.to_string().contains("abc123_blurred.mp4"));
    }
}
