use crate::types::{ElementId, Guidance, GuidanceMessage};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Guidance collected for one page, in element order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageGuidance {
    pub page_id: String,
    pub page_index: usize,
    pub guidance: Vec<Guidance>,
}

impl PageGuidance {
    pub fn is_empty(&self) -> bool {
        self.guidance.is_empty()
    }
}

/// Result of a prepublish check over a whole story.
/// Pages without guidance are left out.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuidanceReport {
    pub id: Uuid,
    pub story_id: String,
    pub generated_at: DateTime<Utc>,
    pub pages: Vec<PageGuidance>,
}

impl GuidanceReport {
    pub fn new(story_id: &str, pages: Vec<PageGuidance>) -> Self {
        Self {
            id: Uuid::new_v4(),
            story_id: story_id.to_string(),
            generated_at: Utc::now(),
            pages: pages.into_iter().filter(|p| !p.is_empty()).collect(),
        }
    }

    pub fn total(&self) -> usize {
        self.pages.iter().map(|p| p.guidance.len()).sum()
    }

    pub fn is_clean(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Guidance> {
        self.pages.iter().flat_map(|p| p.guidance.iter())
    }

    pub fn for_element(&self, element_id: &ElementId) -> Vec<&Guidance> {
        self.iter().filter(|g| &g.element_id == element_id).collect()
    }

    /// Every message in report order
    pub fn messages(&self) -> Vec<GuidanceMessage> {
        self.iter().map(|g| g.message).collect()
    }

    pub fn count_by_message(&self) -> BTreeMap<GuidanceMessage, usize> {
        let mut counts = BTreeMap::new();
        for guidance in self.iter() {
            *counts.entry(guidance.message).or_insert(0) += 1;
        }
        counts
    }
}
