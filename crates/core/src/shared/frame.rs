use ndarray::ArrayView3;
use thiserror::Error;

/// Decoded frames are always packed RGB24.
pub const RGB_CHANNELS: u8 = 3;

#[derive(Error, Debug, PartialEq, Eq)]
#[error("frame buffer holds {actual} bytes, expected {expected} for {width}x{height} RGB")]
pub struct FrameSizeError {
    pub width: u32,
    pub height: u32,
    pub expected: usize,
    pub actual: usize,
}

/// One decoded video frame: tightly packed RGB bytes in row-major order.
///
/// Pixel format conversion happens in the ffmpeg reader and writer only.
#[derive(Clone, Debug)]
pub struct Frame {
    data: Vec<u8>,
    width: u32,
    height: u32,
    index: usize,
}

impl Frame {
    pub fn new(data: Vec<u8>, width: u32, height: u32, index: usize) -> Result<Self, FrameSizeError> {
        let expected = byte_len(width, height);
        if data.len() != expected {
            return Err(FrameSizeError {
                width,
                height,
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            data,
            width,
            height,
            index,
        })
    }

    /// Frame filled with a single gray level.
    pub fn filled(width: u32, height: u32, value: u8, index: usize) -> Self {
        Self {
            data: vec![value; byte_len(width, height)],
            width,
            height,
            index,
        }
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn channels(&self) -> u8 {
        RGB_CHANNELS
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// `[height, width, channel]` view used by detector preprocessing.
    pub fn as_ndarray(&self) -> ArrayView3<'_, u8> {
        ArrayView3::from_shape(
            (
                self.height as usize,
                self.width as usize,
                RGB_CHANNELS as usize,
            ),
            &self.data,
        )
        .expect("length checked in Frame::new")
    }
}

fn byte_len(width: u32, height: u32) -> usize {
    width as usize * height as usize * RGB_CHANNELS as usize
}
