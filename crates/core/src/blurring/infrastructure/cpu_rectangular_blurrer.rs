use std::cell::RefCell;

use crate::blurring::domain::frame_blurrer::FrameBlurrer;
use crate::shared::constants::{DEFAULT_BLUR_KERNEL_SIZE, DEFAULT_BLUR_SIGMA};
use crate::shared::error::BoxError;
use crate::shared::frame::Frame;
use crate::shared::region::Region;

use super::gaussian::{self, RoiRect};

/// Kernels at or above this size are applied to a downscaled ROI.
const DOWNSCALE_KERNEL_THRESHOLD: usize = 100;

/// Gaussian-blurs the full rectangle of every face region on the CPU.
///
/// Regions are clipped to the frame first. Very large kernels blur a
/// downscaled copy of the ROI and scale it back up.
pub struct CpuRectangularBlurrer {
    kernel: Vec<f32>,
    scale: usize,
    small_kernel: Vec<f32>,
    roi_buf: RefCell<Vec<u8>>,
    blur_temp: RefCell<Vec<f32>>,
}

impl CpuRectangularBlurrer {
    /// `kernel_size` must be odd; `sigma <= 0` derives sigma from the size.
    pub fn new(kernel_size: usize, sigma: f64) -> Self {
        let sigma = if sigma > 0.0 {
            sigma
        } else {
            gaussian::sigma_for_kernel(kernel_size)
        };
        let scale = (kernel_size / DOWNSCALE_KERNEL_THRESHOLD * 2).max(1);
        let small_size = (kernel_size / scale) | 1;
        Self {
            kernel: gaussian::gaussian_kernel_1d(kernel_size, sigma),
            scale,
            small_kernel: gaussian::gaussian_kernel_1d(small_size, sigma / scale as f64),
            roi_buf: RefCell::new(Vec::new()),
            blur_temp: RefCell::new(Vec::new()),
        }
    }

    fn blur_roi(&self, roi: &mut [u8], rw: usize, rh: usize, channels: usize) {
        let mut temp = self.blur_temp.borrow_mut();
        if self.scale <= 1 || rw < self.scale * 2 || rh < self.scale * 2 {
            gaussian::blur_with_kernel(roi, rw, rh, channels, &self.kernel, &mut temp);
            return;
        }
        let (mut small, sw, sh) = gaussian::downscale(roi, rw, rh, channels, self.scale);
        gaussian::blur_with_kernel(&mut small, sw, sh, channels, &self.small_kernel, &mut temp);
        let upscaled = gaussian::upscale(&small, sw, sh, channels, rw, rh);
        roi.copy_from_slice(&upscaled);
    }
}

impl Default for CpuRectangularBlurrer {
    fn default() -> Self {
        Self::new(DEFAULT_BLUR_KERNEL_SIZE, DEFAULT_BLUR_SIGMA)
    }
}

impl FrameBlurrer for CpuRectangularBlurrer {
    fn blur(&self, frame: &mut Frame, regions: &[Region]) -> Result<(), BoxError> {
        let fw = frame.width();
        let fh = frame.height();
        let channels = frame.channels() as usize;
        let data = frame.data_mut();

        for region in regions {
            let Some(visible) = region.clamp_to(fw, fh) else {
                continue;
            };
            let rect = RoiRect {
                x: visible.x as usize,
                y: visible.y as usize,
                w: visible.width as usize,
                h: visible.height as usize,
            };

            let mut roi = self.roi_buf.borrow_mut();
            gaussian::extract_roi(data, fw as usize, channels, rect, &mut roi);
            self.blur_roi(&mut roi, rect.w, rect.h, channels);
            gaussian::write_roi_back(data, &roi, fw as usize, channels, rect);
        }

        Ok(())
    }
}
