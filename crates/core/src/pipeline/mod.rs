pub mod blur_remote_video_use_case;
pub mod blur_video_use_case;
pub mod pipeline_logger;
pub mod video_processor;
