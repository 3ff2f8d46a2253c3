use crate::shared::error::BoxError;
use crate::shared::frame::Frame;
use crate::shared::region::Region;

/// Domain interface for face detection.
///
/// Each call looks at one frame in isolation. `&mut self` because
/// inference sessions need exclusive access while running.
pub trait FaceDetector: Send {
    fn detect(&mut self, frame: &Frame) -> Result<Vec<Region>, BoxError>;
}
