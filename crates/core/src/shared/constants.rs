pub const FACE_MODEL_NAME: &str = "yolo11n-pose_widerface.onnx";
pub const FACE_MODEL_URL: &str =
    "https://github.com/neutrinographics/faceguard/releases/download/v0.1.0/yolo11n-pose_widerface.onnx";

/// Faces narrower or shorter than this (in frame pixels) are ignored.
pub const DEFAULT_MIN_FACE_SIZE: u32 = 30;

pub const DEFAULT_CONFIDENCE: f64 = 0.5;

/// Gaussian kernel applied to each face: 99x99, sigma 51.
pub const DEFAULT_BLUR_KERNEL_SIZE: usize = 99;
pub const DEFAULT_BLUR_SIGMA: f64 = 51.0;

/// Progress is reported every this many frames.
pub const PROGRESS_INTERVAL_FRAMES: usize = 30;

pub const DEFAULT_DOWNLOAD_TIMEOUT_SECS: u64 = 30;
pub const DOWNLOAD_CHUNK_SIZE: usize = 8192;

/// Longest accepted input (5 minutes). Zero disables the check.
pub const DEFAULT_MAX_VIDEO_SECONDS: u64 = 300;

pub const INPUT_SUFFIX: &str = ".mp4";
pub const OUTPUT_SUFFIX: &str = "_blurred.mp4";

/// Fallback frame rate when the container does not report one.
pub const FALLBACK_FPS: i32 = 30;
