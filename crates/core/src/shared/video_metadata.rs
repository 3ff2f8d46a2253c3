use std::path::PathBuf;
use std::time::Duration;

#[derive(Clone, Debug, PartialEq)]
pub struct VideoMetadata {
    pub width: u32,
    pub height: u32,
    pub fps: f64,
    /// Zero when the container does not report a frame count.
    pub total_frames: usize,
    pub codec: String,
    pub source_path: Option<PathBuf>,
}

impl VideoMetadata {
    /// Duration derived from frame count and rate, if both are known.
    pub fn duration(&self) -> Option<Duration> {
        if self.fps > 0.0 && self.total_frames > 0 {
            Some(Duration::from_secs_f64(self.total_frames as f64 / self.fps))
        } else {
            None
        }
    }
}
