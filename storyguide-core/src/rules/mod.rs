// Prepublish guidance rules
// - engine.rs: GuidanceEngine, the GuidanceRule trait and pipeline dispatch
// - media.rs: image and video checks
// - report.rs: per-page aggregation of results

pub mod engine;
pub mod media;
pub mod report;

pub use engine::*;
pub use media::{
    image_element_resolution, media_element_resolution, media_element_size_on_page,
    video_element_frame_rate, video_element_length,
};
pub use report::{GuidanceReport, PageGuidance};
