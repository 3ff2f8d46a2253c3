use crate::shared::error::BoxError;
use crate::shared::frame::Frame;
use crate::shared::region::Region;

/// Applies blur to the given regions of a frame, in place.
pub trait FrameBlurrer: Send {
    fn blur(&self, frame: &mut Frame, regions: &[Region]) -> Result<(), BoxError>;
}
