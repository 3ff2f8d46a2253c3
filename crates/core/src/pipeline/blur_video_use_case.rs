use std::path::Path;
use std::time::{Duration, Instant};

use crate::blurring::domain::frame_blurrer::FrameBlurrer;
use crate::detection::domain::face_detector::FaceDetector;
use crate::shared::error::BoxError;
use crate::shared::video_metadata::VideoMetadata;
use crate::video::domain::video_reader::VideoReader;
use crate::video::domain::video_writer::VideoWriter;

use super::pipeline_logger::PipelineLogger;
use super::video_processor::{BlurReport, VideoProcessor};

/// Sequential read → detect → blur → write loop over one video.
///
/// Every decoded frame is written exactly once, in decode order. Detection
/// looks at each frame on its own; nothing is carried between frames.
pub struct BlurVideoUseCase {
    reader: Box<dyn VideoReader>,
    writer: Box<dyn VideoWriter>,
    detector: Box<dyn FaceDetector>,
    blurrer: Box<dyn FrameBlurrer>,
    logger: Box<dyn PipelineLogger>,
    max_duration: Option<Duration>,
}

impl BlurVideoUseCase {
    pub fn new(
        reader: Box<dyn VideoReader>,
        writer: Box<dyn VideoWriter>,
        detector: Box<dyn FaceDetector>,
        blurrer: Box<dyn FrameBlurrer>,
        logger: Box<dyn PipelineLogger>,
    ) -> Self {
        Self {
            reader,
            writer,
            detector,
            blurrer,
            logger,
            max_duration: None,
        }
    }

    /// Rejects inputs longer than `limit` before any frame is decoded.
    /// Only applies when the container reports both rate and frame count.
    pub fn with_max_duration(mut self, limit: Option<Duration>) -> Self {
        self.max_duration = limit;
        self
    }

    pub fn execute(&mut self, input: &Path, output: &Path) -> Result<BlurReport, BoxError> {
        self.logger
            .info(&format!("Processing video: {}", input.display()));

        let metadata = self.reader.open(input)?;
        let result = self.encode(&metadata, output);
        self.reader.close();

        let report = result?;
        self.logger.info(&format!(
            "Video processing complete: {} frames processed, {} faces blurred",
            report.frames_processed, report.faces_found
        ));
        self.logger.summary();
        Ok(report)
    }

    fn encode(&mut self, metadata: &VideoMetadata, output: &Path) -> Result<BlurReport, BoxError> {
        self.logger.info(&format!(
            "Video properties: {}x{} @ {:.2}fps, {} frames",
            metadata.width, metadata.height, metadata.fps, metadata.total_frames
        ));
        self.check_duration(metadata)?;

        self.writer.open(output, metadata)?;
        let result = self.blur_frames(metadata.total_frames);
        let closed = self.writer.close();

        let report = result?;
        closed?;
        Ok(report)
    }

    fn check_duration(&self, metadata: &VideoMetadata) -> Result<(), BoxError> {
        let (Some(limit), Some(duration)) = (self.max_duration, metadata.duration()) else {
            return Ok(());
        };
        if duration > limit {
            return Err(format!(
                "video is {:.1}s long, the limit is {}s",
                duration.as_secs_f64(),
                limit.as_secs()
            )
            .into());
        }
        Ok(())
    }

    fn blur_frames(&mut self, total_frames: usize) -> Result<BlurReport, BoxError> {
        let mut report = BlurReport::default();

        for frame in self.reader.frames() {
            let mut frame = frame?;

            let t0 = Instant::now();
            let faces = self.detector.detect(&frame)?;
            self.logger.timing("detect", elapsed_ms(t0));

            if !faces.is_empty() {
                report.faces_found += faces.len();
                let t0 = Instant::now();
                self.blurrer.blur(&mut frame, &faces)?;
                self.logger.timing("blur", elapsed_ms(t0));
            }

            let t0 = Instant::now();
            self.writer.write(&frame)?;
            self.logger.timing("write", elapsed_ms(t0));

            report.frames_processed += 1;
            self.logger
                .progress(report.frames_processed, total_frames, report.faces_found);
        }

        Ok(report)
    }
}

impl VideoProcessor for BlurVideoUseCase {
    fn process(&mut self, input: &Path, output: &Path) -> Result<BlurReport, BoxError> {
        self.execute(input, output)
    }
}

fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}
