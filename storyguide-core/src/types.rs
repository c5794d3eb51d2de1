use crate::border::Border;
use crate::error::StoryError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};
use std::fmt;

// ===== ELEMENT TYPES =====
// Elements arrive from the editor as JSON, so field names stay camelCase on the wire.

/// Element id, unique within a page. The editor emits both numeric and string ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ElementId {
    Number(u64),
    Text(String),
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElementId::Number(n) => write!(f, "{n}"),
            ElementId::Text(s) => f.write_str(s),
        }
    }
}

impl From<u64> for ElementId {
    fn from(value: u64) -> Self {
        ElementId::Number(value)
    }
}

impl From<&str> for ElementId {
    fn from(value: &str) -> Self {
        ElementId::Text(value.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementType {
    Image,
    Video,
    Gif,
    Text,
    Shape,
    #[serde(other)]
    Unknown,
}

impl ElementType {
    /// Image and video elements are the ones media guidance looks at.
    pub fn is_media(&self) -> bool {
        matches!(self, ElementType::Image | ElementType::Video)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ElementType::Image => "image",
            ElementType::Video => "video",
            ElementType::Gif => "gif",
            ElementType::Text => "text",
            ElementType::Shape => "shape",
            ElementType::Unknown => "unknown",
        }
    }
}

/// Pixel dimensions of one quality tier of a media resource. Either side may
/// be missing from what the editor sends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceSize {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
}

impl ResourceSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width: Some(width),
            height: Some(height),
        }
    }

    /// Returns `(short_edge, long_edge)`, or `None` when either dimension is
    /// missing or not a positive finite number.
    pub fn edges(&self) -> Option<(f64, f64)> {
        let width = positive(self.width?)?;
        let height = positive(self.height?)?;
        Some((width.min(height), width.max(height)))
    }
}

/// Media metadata attached to image and video elements
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    /// Duration in seconds (video only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frame_rate: Option<f64>,
    /// Original upload resolution
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full: Option<ResourceSize>,
    /// Additional named quality tiers (e.g. "medium", "thumbnail")
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub sizes: BTreeMap<String, ResourceSize>,
    /// Editor fields the checks do not read, kept so saves are lossless
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Element {
    pub id: ElementId,
    #[serde(rename = "type")]
    pub element_type: ElementType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource: Option<Resource>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border: Option<Border>,
    /// Editor fields the checks do not read (`src`, `scale`, ...)
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Element {
    /// Element with a numeric id, the form the editor assigns
    pub fn new(id: u64, element_type: ElementType) -> Self {
        Self::with_id(ElementId::Number(id), element_type)
    }

    pub fn with_id(id: ElementId, element_type: ElementType) -> Self {
        Self {
            id,
            element_type,
            x: None,
            y: None,
            width: None,
            height: None,
            resource: None,
            border: None,
            extra: BTreeMap::new(),
        }
    }

    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    pub fn with_resource(mut self, resource: Resource) -> Self {
        self.resource = Some(resource);
        self
    }

    pub fn with_border(mut self, border: Border) -> Self {
        self.border = Some(border);
        self
    }

    /// Rendered area in page units. `None` if width or height is missing,
    /// non-finite or not positive.
    pub fn area(&self) -> Option<f64> {
        let width = positive(self.width?)?;
        let height = positive(self.height?)?;
        Some(width * height)
    }

    /// Shorthand for `resource.full`
    pub fn full_resolution(&self) -> Option<&ResourceSize> {
        self.resource.as_ref()?.full.as_ref()
    }
}

pub(crate) fn positive(value: f64) -> Option<f64> {
    (value.is_finite() && value > 0.0).then_some(value)
}

// ===== PAGES & STORIES =====

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub id: String,
    #[serde(default)]
    pub elements: Vec<Element>,
}

impl Page {
    pub fn new(id: &str, elements: Vec<Element>) -> Self {
        Self {
            id: id.to_string(),
            elements,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoryStatus {
    #[default]
    Draft,
    Publish,
    Future,
    Private,
}

impl StoryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoryStatus::Draft => "draft",
            StoryStatus::Publish => "publish",
            StoryStatus::Future => "future",
            StoryStatus::Private => "private",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Story {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub status: StoryStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified: Option<DateTime<Utc>>,
    #[serde(default)]
    pub pages: Vec<Page>,
}

impl Story {
    pub fn new(id: &str, title: &str, pages: Vec<Page>) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            status: StoryStatus::Draft,
            author: None,
            created: None,
            modified: None,
            pages,
        }
    }

    /// Parse and validate a story coming from outside the process.
    /// This is the only place untrusted story input is checked.
    pub fn from_json_str(json: &str) -> Result<Self, StoryError> {
        let story: Story = serde_json::from_str(json)?;
        story.validate()?;
        Ok(story)
    }

    pub fn validate(&self) -> Result<(), StoryError> {
        if self.id.trim().is_empty() {
            return Err(StoryError::MissingId);
        }
        if !is_valid_story_id(&self.id) {
            return Err(StoryError::InvalidId(self.id.clone()));
        }

        for page in &self.pages {
            let mut seen = HashSet::new();
            for element in &page.elements {
                if !seen.insert(&element.id) {
                    return Err(StoryError::DuplicateElementId {
                        page_id: page.id.clone(),
                        element_id: element.id.to_string(),
                    });
                }
            }
        }

        Ok(())
    }

    pub fn element_count(&self) -> usize {
        self.pages.iter().map(|p| p.elements.len()).sum()
    }

    pub fn summary(&self) -> StorySummary {
        StorySummary {
            id: self.id.clone(),
            title: self.title.clone(),
            status: self.status,
            author: self.author.clone(),
            modified: self.modified,
            page_count: self.pages.len(),
        }
    }
}

/// Story ids double as file names in the story store
pub fn is_valid_story_id(id: &str) -> bool {
    !id.is_empty()
        && id != "."
        && id != ".."
        && !id.contains(['/', '\\'])
}

/// Dashboard card data for a saved story
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorySummary {
    pub id: String,
    pub title: String,
    pub status: StoryStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified: Option<DateTime<Utc>>,
    pub page_count: usize,
}

// ===== GUIDANCE =====

/// Always `"guidance"` on the wire. Guidance is advisory and never blocks publishing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GuidanceKind {
    Guidance,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum GuidanceMessage {
    #[serde(rename = "Image is too small on the page")]
    ImageTooSmallOnPage,
    #[serde(rename = "Video is too small on the page")]
    VideoTooSmallOnPage,
    #[serde(rename = "Image has low resolution")]
    ImageLowResolution,
    #[serde(rename = "Video has low resolution")]
    VideoLowResolution,
    #[serde(rename = "Video's resolution is too high to display on most mobile devices (>4k)")]
    VideoResolutionTooHigh,
    #[serde(rename = "Video is longer than 1 minute (suggest breaking video up into multiple segments)")]
    VideoTooLong,
    #[serde(rename = "Video has low frame rate (less than 24fps)")]
    VideoLowFrameRate,
}

impl GuidanceMessage {
    pub const fn as_str(&self) -> &'static str {
        match self {
            GuidanceMessage::ImageTooSmallOnPage => "Image is too small on the page",
            GuidanceMessage::VideoTooSmallOnPage => "Video is too small on the page",
            GuidanceMessage::ImageLowResolution => "Image has low resolution",
            GuidanceMessage::VideoLowResolution => "Video has low resolution",
            GuidanceMessage::VideoResolutionTooHigh => {
                "Video's resolution is too high to display on most mobile devices (>4k)"
            }
            GuidanceMessage::VideoTooLong => {
                "Video is longer than 1 minute (suggest breaking video up into multiple segments)"
            }
            GuidanceMessage::VideoLowFrameRate => "Video has low frame rate (less than 24fps)",
        }
    }
}

impl fmt::Display for GuidanceMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Guidance {
    #[serde(rename = "type")]
    pub kind: GuidanceKind,
    pub element_id: ElementId,
    pub message: GuidanceMessage,
}

impl Guidance {
    pub fn new(element_id: ElementId, message: GuidanceMessage) -> Self {
        Self {
            kind: GuidanceKind::Guidance,
            element_id,
            message,
        }
    }
}
