use std::collections::HashMap;
use std::time::Instant;

use crate::shared::constants::PROGRESS_INTERVAL_FRAMES;

/// Cross-cutting logger for pipeline orchestration events.
///
/// Keeps the frame loop free of any particular output mechanism.
pub trait PipelineLogger: Send {
    /// Report frame-level progress. `total` is 0 when the container
    /// does not know its frame count.
    fn progress(&mut self, current: usize, total: usize, faces_found: usize);

    /// Record how long a named pipeline stage took for one frame.
    fn timing(&mut self, stage: &str, duration_ms: f64);

    /// Log a human-readable status message.
    fn info(&mut self, message: &str);

    /// Emit an end-of-pipeline summary. Default: no-op.
    fn summary(&self) {}
}

/// Silent logger that discards all events.
pub struct NullPipelineLogger;

impl PipelineLogger for NullPipelineLogger {
    fn progress(&mut self, _current: usize, _total: usize, _faces_found: usize) {}
    fn timing(&mut self, _stage: &str, _duration_ms: f64) {}
    fn info(&mut self, _message: &str) {}
}

/// Logger backed by the `log` facade.
///
/// Progress lines are throttled to every `throttle_frames` frames. Stage
/// timings are kept for a summary at the end of the run.
pub struct LogPipelineLogger {
    throttle_frames: usize,
    timings: HashMap<String, Vec<f64>>,
    start_time: Instant,
    frames_seen: usize,
}

impl LogPipelineLogger {
    pub fn new(throttle_frames: usize) -> Self {
        Self {
            throttle_frames: throttle_frames.max(1),
            timings: HashMap::new(),
            start_time: Instant::now(),
            frames_seen: 0,
        }
    }

    /// The progress line for frame `current`, or `None` if throttled.
    pub fn progress_line(&self, current: usize, total: usize, faces_found: usize) -> Option<String> {
        if current == 0 || current % self.throttle_frames != 0 {
            return None;
        }
        if total == 0 {
            return Some(format!(
                "Progress: {current} frames, {faces_found} faces found"
            ));
        }
        let pct = current as f64 / total as f64 * 100.0;
        Some(format!(
            "Progress: {pct:.1}% ({current}/{total} frames, {faces_found} faces found)"
        ))
    }

    /// Returns the formatted summary string, or `None` if no data recorded.
    pub fn summary_string(&self) -> Option<String> {
        if self.timings.is_empty() {
            return None;
        }

        let elapsed_ms = self.start_time.elapsed().as_secs_f64() * 1000.0;
        let frames = self.frames_seen;
        let mut lines = vec![format!(
            "Pipeline summary ({frames} frames, {:.1}s total):",
            elapsed_ms / 1000.0
        )];

        let mut stages: Vec<_> = self.timings.keys().collect();
        stages.sort();
        for stage in stages {
            let durations = &self.timings[stage];
            let total_ms: f64 = durations.iter().sum();
            let avg_ms = total_ms / durations.len() as f64;
            let pct = if elapsed_ms > 0.0 {
                total_ms / elapsed_ms * 100.0
            } else {
                0.0
            };
            lines.push(format!(
                "  {stage:8}: avg {avg_ms:6.1}ms  total {total_ms:7.0}ms  ({pct:4.1}%)"
            ));
        }

        if frames > 0 && elapsed_ms > 0.0 {
            let fps = frames as f64 / (elapsed_ms / 1000.0);
            lines.push(format!("  Throughput: {fps:.1} fps"));
        }

        Some(lines.join("\n"))
    }
}

impl Default for LogPipelineLogger {
    fn default() -> Self {
        Self::new(PROGRESS_INTERVAL_FRAMES)
    }
}

impl PipelineLogger for LogPipelineLogger {
    fn progress(&mut self, current: usize, total: usize, faces_found: usize) {
        self.frames_seen = current;
        if let Some(line) = self.progress_line(current, total, faces_found) {
            log::info!("{line}");
        }
    }

    fn timing(&mut self, stage: &str, duration_ms: f64) {
        self.timings
            .entry(stage.to_string())
            .or_default()
            .push(duration_ms);
    }

    fn info(&mut self, message: &str) {
        log::info!("{message}");
    }

    fn summary(&self) {
        if let Some(text) = self.summary_string() {
            log::debug!("\n{text}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    #[test]
    fn test_null_logger_all_methods_are_noop() {
        let mut logger = NullPipelineLogger;
        logger.progress(1, 10, 0);
        logger.timing("detect", 5.0);
        logger.info("hello");
        logger.summary();
    }

    #[rstest]
    #[case::first_interval(30, 300, 4, Some("Progress: 10.0% (30/300 frames, 4 faces found)"))]
    #[case::throttled(31, 300, 4, None)]
    #[case::zero(0, 300, 0, None)]
    #[case::last_interval(300, 300, 12, Some("Progress: 100.0% (300/300 frames, 12 faces found)"))]
    #[case::unknown_total(60, 0, 2, Some("Progress: 60 frames, 2 faces found"))]
    fn test_progress_line(
        #[case] current: usize,
        #[case] total: usize,
        #[case] faces: usize,
        #[case] expected: Option<&str>,
    ) {
        let logger = LogPipelineLogger::default();
        assert_eq!(
            logger.progress_line(current, total, faces).as_deref(),
            expected
        );
    }

    #[test]
    fn test_progress_tracks_frames_seen() {
        let mut logger = LogPipelineLogger::new(10);
        for i in 1..=20 {
            logger.progress(i, 20, 0);
        }
        assert_eq!(logger.frames_seen, 20);
    }

    #[test]
    fn test_zero_throttle_is_clamped() {
        let logger = LogPipelineLogger::new(0);
        assert_eq!(logger.throttle_frames, 1);
    }

    #[test]
    fn test_timing_records_values() {
        let mut logger = LogPipelineLogger::default();
        logger.timing("detect", 20.0);
        logger.timing("detect", 30.0);
        logger.timing("blur", 5.0);

        let detect = &logger.timings["detect"];
        assert_eq!(detect.len(), 2);
        assert_relative_eq!(detect.iter().sum::<f64>() / 2.0, 25.0);
        assert_eq!(logger.timings["blur"].len(), 1);
        assert!(!logger.timings.contains_key("write"));
    }

    #[test]
    fn test_summary_lists_stages_and_throughput() {
        let mut logger = LogPipelineLogger::default();
        logger.frames_seen = 10;
        logger.timing("detect", 20.0);
        logger.timing("blur", 5.0);

        let summary = logger.summary_string().unwrap();
        assert!(summary.contains("Pipeline summary (10 frames"));
        assert!(summary.contains("detect"));
        assert!(summary.contains("blur"));
        assert!(summary.contains("fps"));
    }

    #[test]
    fn test_empty_summary_returns_none() {
        assert!(LogPipelineLogger::default().summary_string().is_none());
    }
}
