// Storyguide Core Library
//
// Prepublish guidance for visual stories: heuristic media checks over page
// elements, plus the editor-side state for the border width panel and the
// dashboard story listing.

pub mod border;
pub mod cache;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod processor;
pub mod rules;
pub mod storage;
pub mod types;

// Re-export main types and functions for easy use
pub use types::*;
pub use config::GuidanceConfig;
pub use error::StoryError;
pub use processor::GuidanceProcessor;
pub use rules::{
    image_element_resolution, media_element_resolution, media_element_size_on_page,
    video_element_frame_rate, video_element_length, GuidanceEngine, GuidanceReport,
    GuidanceRule, PageGuidance,
};
