/// A detected face rectangle in frame pixel coordinates.
///
/// Regions only live for the frame they were detected in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Region {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Region {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Builds a region from `[x1, y1, x2, y2]` corners, flooring each
    /// coordinate to a whole pixel.
    pub fn from_corners(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        let x = x1.floor() as i32;
        let y = y1.floor() as i32;
        Self {
            x,
            y,
            width: x2.floor() as i32 - x,
            height: y2.floor() as i32 - y,
        }
    }

    /// Intersection with the `frame_width` x `frame_height` frame.
    ///
    /// Returns `None` when nothing of the region is visible.
    pub fn clamp_to(&self, frame_width: u32, frame_height: u32) -> Option<Region> {
        let x1 = self.x.max(0);
        let y1 = self.y.max(0);
        let x2 = (self.x + self.width).min(frame_width as i32);
        let y2 = (self.y + self.height).min(frame_height as i32);
        if x2 <= x1 || y2 <= y1 {
            return None;
        }
        Some(Region::new(x1, y1, x2 - x1, y2 - y1))
    }

    pub fn is_at_least(&self, min_size: u32) -> bool {
        self.width >= min_size as i32 && self.height >= min_size as i32
    }
}
