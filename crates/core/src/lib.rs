pub mod blurring;
pub mod detection;
pub mod download;
pub mod pipeline;
pub mod shared;
pub mod video;
