//! Errors raised while accepting story input at the boundary.

use std::io;
use thiserror::Error;

/// Reasons a story document can be rejected before guidance runs.
#[derive(Error, Debug)]
pub enum StoryError {
    /// I/O error when reading a story file.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The document is not valid story JSON.
    #[error("Malformed story JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The story has no id.
    #[error("Story is missing an id")]
    MissingId,

    /// Two elements on the same page share an id.
    #[error("Duplicate element id {element_id} on page {page_id}")]
    DuplicateElementId { page_id: String, element_id: String },

    /// Story ids become file names, so path separators are refused.
    #[error("Invalid story id: {0}")]
    InvalidId(String),
}
