use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use thiserror::Error;

use faceblur_core::shared::constants::{
    DEFAULT_BLUR_KERNEL_SIZE, DEFAULT_BLUR_SIGMA, DEFAULT_CONFIDENCE,
    DEFAULT_DOWNLOAD_TIMEOUT_SECS, DEFAULT_MAX_VIDEO_SECONDS, DEFAULT_MIN_FACE_SIZE,
};

pub const DEFAULT_PORT: u16 = 5001;

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("Blur kernel size must be a positive odd integer, got {0}")]
    KernelSize(usize),
    #[error("Confidence must be between 0.0 and 1.0, got {0}")]
    Confidence(f64),
    #[error("Blur sigma must not be negative, got {0}")]
    Sigma(f64),
    #[error("Download timeout must be at least 1 second")]
    DownloadTimeout,
}

/// HTTP service that downloads videos and blurs the faces in them.
///
/// Every option can also be set through the environment variable shown.
#[derive(Parser, Debug, Clone)]
#[command(name = "faceblur-server", version)]
pub struct Config {
    /// Port to listen on.
    #[arg(long, env = "PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Address to bind.
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: IpAddr,

    /// Directory for downloaded and blurred videos (default: system temp dir).
    #[arg(long, env = "FACE_BLUR_WORK_DIR")]
    pub work_dir: Option<PathBuf>,

    /// Face detection confidence threshold (0.0-1.0).
    #[arg(long, env = "FACE_BLUR_CONFIDENCE", default_value_t = DEFAULT_CONFIDENCE)]
    pub confidence: f64,

    /// Faces smaller than this many pixels on either side are ignored.
    #[arg(long, env = "FACE_BLUR_MIN_FACE_SIZE", default_value_t = DEFAULT_MIN_FACE_SIZE)]
    pub min_face_size: u32,

    /// Gaussian blur kernel size (must be odd).
    #[arg(long, env = "FACE_BLUR_KERNEL_SIZE", default_value_t = DEFAULT_BLUR_KERNEL_SIZE)]
    pub kernel_size: usize,

    /// Gaussian sigma; 0 derives it from the kernel size.
    #[arg(long, env = "FACE_BLUR_SIGMA", default_value_t = DEFAULT_BLUR_SIGMA)]
    pub sigma: f64,

    /// Download timeout in seconds.
    #[arg(long, env = "FACE_BLUR_DOWNLOAD_TIMEOUT", default_value_t = DEFAULT_DOWNLOAD_TIMEOUT_SECS)]
    pub download_timeout: u64,

    /// Reject videos longer than this many seconds (0 = no limit).
    #[arg(long, env = "FACE_BLUR_MAX_VIDEO_SECONDS", default_value_t = DEFAULT_MAX_VIDEO_SECONDS)]
    pub max_video_seconds: u64,

    /// Directory holding a bundled copy of the face model.
    #[arg(long, env = "FACE_BLUR_MODEL_DIR")]
    pub model_dir: Option<PathBuf>,
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.kernel_size == 0 || self.kernel_size % 2 == 0 {
            return Err(ConfigError::KernelSize(self.kernel_size));
        }
        if !(0.0..=1.0).contains(&self.confidence) {
            return Err(ConfigError::Confidence(self.confidence));
        }
        if self.sigma < 0.0 {
            return Err(ConfigError::Sigma(self.sigma));
        }
        if self.download_timeout == 0 {
            return Err(ConfigError::DownloadTimeout);
        }
        Ok(())
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    pub fn work_dir(&self) -> PathBuf {
        self.work_dir.clone().unwrap_or_else(std::env::temp_dir)
    }

    pub fn download_timeout(&self) -> Duration {
        Duration::from_secs(self.download_timeout)
    }

    pub fn max_video_duration(&self) -> Option<Duration> {
        (self.max_video_seconds > 0).then(|| Duration::from_secs(self.max_video_seconds))
    }
}
