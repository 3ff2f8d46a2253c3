pub mod ffmpeg_reader;
pub mod ffmpeg_writer;
pub mod orientation;
#[cfg(test)]
pub(crate) mod test_video;
