//! Display orientation of phone clips.
//!
//! Phones record in sensor orientation and tag the stream with a display
//! matrix or a legacy `rotate` tag. The encoder writes no such tag, so
//! frames are turned upright on decode.

use ffmpeg_next::codec::packet::side_data::Type as SideDataType;
use ffmpeg_next::format::stream::Stream;

/// Clockwise quarter turns that bring a decoded frame upright.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Rotation {
    #[default]
    None,
    Cw90,
    Cw180,
    Cw270,
}

impl Rotation {
    /// Snaps any clockwise angle to the nearest quarter turn.
    pub fn from_degrees(degrees: i32) -> Self {
        match (degrees.rem_euclid(360) + 45) / 90 % 4 {
            1 => Rotation::Cw90,
            2 => Rotation::Cw180,
            3 => Rotation::Cw270,
            _ => Rotation::None,
        }
    }

    pub fn degrees(self) -> u32 {
        match self {
            Rotation::None => 0,
            Rotation::Cw90 => 90,
            Rotation::Cw180 => 180,
            Rotation::Cw270 => 270,
        }
    }

    /// Frame size after the turn.
    pub fn upright_size(self, width: u32, height: u32) -> (u32, u32) {
        match self {
            Rotation::Cw90 | Rotation::Cw270 => (height, width),
            Rotation::None | Rotation::Cw180 => (width, height),
        }
    }

    /// Turns a packed RGB24 buffer of `width` x `height`.
    pub fn apply(self, pixels: Vec<u8>, width: u32, height: u32) -> Vec<u8> {
        if self == Rotation::None {
            return pixels;
        }

        let (w, h) = (width as usize, height as usize);
        let (out_w, out_h) = self.upright_size(width, height);
        let mut out = Vec::with_capacity(pixels.len());
        for oy in 0..out_h as usize {
            for ox in 0..out_w as usize {
                let (sx, sy) = match self {
                    Rotation::Cw90 => (oy, h - 1 - ox),
                    Rotation::Cw180 => (w - 1 - ox, h - 1 - oy),
                    Rotation::Cw270 => (w - 1 - oy, ox),
                    Rotation::None => (ox, oy),
                };
                let i = (sy * w + sx) * 3;
                out.extend_from_slice(&pixels[i..i + 3]);
            }
        }
        out
    }
}

/// Reads the stream's display matrix, falling back to the `rotate` tag.
pub fn stream_rotation(stream: &Stream) -> Rotation {
    for side_data in stream.side_data() {
        if side_data.kind() == SideDataType::DisplayMatrix {
            if let Some(degrees) = display_matrix_degrees(side_data.data()) {
                return Rotation::from_degrees(degrees);
            }
        }
    }

    stream
        .metadata()
        .get("rotate")
        .and_then(|tag| tag.trim().parse::<i32>().ok())
        .map(Rotation::from_degrees)
        .unwrap_or_default()
}

/// Clockwise angle encoded in a 3x3 display matrix of 16.16 fixed-point
/// `i32`s (native byte order, row-major).
fn display_matrix_degrees(data: &[u8]) -> Option<i32> {
    if data.len() < 36 {
        return None;
    }
    let a = i32::from_ne_bytes(data[0..4].try_into().ok()?) as f64;
    let b = i32::from_ne_bytes(data[4..8].try_into().ok()?) as f64;
    if a == 0.0 && b == 0.0 {
        return None;
    }
    Some(b.atan2(a).to_degrees().round() as i32)
}
