use std::path::Path;

use crate::shared::frame::Frame;
use crate::shared::video_metadata::VideoMetadata;
use crate::video::domain::video_writer::VideoWriter;
use crate::video::infrastructure::ffmpeg_writer::FfmpegWriter;

/// Writes a short MPEG-4 clip whose frames step through gray levels.
pub(crate) fn write_gray_ramp_video(path: &Path, num_frames: usize, width: u32, height: u32, fps: i32) {
    let metadata = VideoMetadata {
        width,
        height,
        fps: fps as f64,
        total_frames: num_frames,
        codec: String::new(),
        source_path: None,
    };

    let mut writer = FfmpegWriter::new();
    writer.open(path, &metadata).unwrap();
    for i in 0..num_frames {
        let value = ((i * 40) % 256) as u8;
        writer.write(&Frame::filled(width, height, value, i)).unwrap();
    }
    writer.close().unwrap();
}
