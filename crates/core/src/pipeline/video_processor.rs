use std::path::Path;

use crate::shared::error::BoxError;

/// Totals for one processed video.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BlurReport {
    pub frames_processed: usize,
    /// Sum of per-frame detections. The same person in two frames counts twice.
    pub faces_found: usize,
}

/// Turns a local input video into a blurred output video.
///
/// This is a port: the frame loop implements it, and callers that only
/// need "process this file" depend on the trait.
pub trait VideoProcessor: Send {
    fn process(&mut self, input: &Path, output: &Path) -> Result<BlurReport, BoxError>;
}
