use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use faceblur_core::blurring::infrastructure::cpu_rectangular_blurrer::CpuRectangularBlurrer;
use faceblur_core::detection::infrastructure::onnx_face_detector::{
    DetectorSettings, OnnxFaceDetector,
};
use faceblur_core::download::domain::video_fetcher::{FetchError, VideoFetcher};
use faceblur_core::download::infrastructure::http_video_fetcher::HttpVideoFetcher;
use faceblur_core::pipeline::blur_remote_video_use_case::{
    BlurError, BlurOutcome, BlurRemoteVideoUseCase,
};
use faceblur_core::pipeline::blur_video_use_case::BlurVideoUseCase;
use faceblur_core::pipeline::pipeline_logger::LogPipelineLogger;
use faceblur_core::video::infrastructure::ffmpeg_reader::FfmpegReader;
use faceblur_core::video::infrastructure::ffmpeg_writer::FfmpegWriter;

use crate::config::Config;

/// What the HTTP layer needs from the blur machinery.
///
/// Called on a blocking worker thread.
pub trait BlurService: Send + Sync + 'static {
    fn blur(&self, url: &str) -> Result<BlurOutcome, BlurError>;
}

/// Downloads with [`HttpVideoFetcher`] and runs the ffmpeg + ONNX pipeline.
///
/// Each request gets its own detector session, so concurrent requests never
/// share inference state.
pub struct VideoBlurService {
    fetcher: Arc<dyn VideoFetcher>,
    model_path: PathBuf,
    detector_settings: DetectorSettings,
    kernel_size: usize,
    sigma: f64,
    max_duration: Option<Duration>,
}

impl VideoBlurService {
    pub fn new(config: &Config, model_path: PathBuf) -> Result<Self, FetchError> {
        let fetcher = HttpVideoFetcher::new(config.work_dir(), config.download_timeout())?;
        Ok(Self {
            fetcher: Arc::new(fetcher),
            model_path,
            detector_settings: DetectorSettings {
                confidence: config.confidence,
                min_face_size: config.min_face_size,
            },
            kernel_size: config.kernel_size,
            sigma: config.sigma,
            max_duration: config.max_video_duration(),
        })
    }

    pub fn model_path(&self) -> &Path {
        &self.model_path
    }

    /// Loads the model once so a broken model fails at startup, not on the
    /// first request.
    pub fn verify_model(&self) -> Result<(), Box<dyn std::error::Error>> {
        OnnxFaceDetector::new(&self.model_path, self.detector_settings)?;
        Ok(())
    }

    fn build_pipeline(&self) -> Result<BlurVideoUseCase, BlurError> {
        let detector = OnnxFaceDetector::new(&self.model_path, self.detector_settings)
            .map_err(|e| BlurError::Processing(format!("failed to load face model: {e}").into()))?;

        Ok(BlurVideoUseCase::new(
            Box::new(FfmpegReader::new()),
            Box::new(FfmpegWriter::new()),
            Box::new(detector),
            Box::new(CpuRectangularBlurrer::new(self.kernel_size, self.sigma)),
            Box::new(LogPipelineLogger::default()),
        )
        .with_max_duration(self.max_duration))
    }
}

impl BlurService for VideoBlurService {
    fn blur(&self, url: &str) -> Result<BlurOutcome, BlurError> {
        let pipeline = self.build_pipeline()?;
        BlurRemoteVideoUseCase::new(self.fetcher.clone(), Box::new(pipeline)).execute(url)
    }
}
