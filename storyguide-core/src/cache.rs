//! Report cache entries.
//!
//! A cached report is reused only while the story content, the guidance
//! thresholds, the rules that ran and the crate version all match.

use crate::config::GuidanceConfig;
use crate::rules::GuidanceReport;
use crate::storage::{calculate_config_hash, calculate_story_hash};
use crate::types::Story;
use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

pub const STORYGUIDE_VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub struct ReportCacheKey {
    pub story_id: String,
    pub story_hash: String,
    pub config_hash: String,
    /// Enabled pipeline rules, in run order
    pub rules: Vec<String>,
    pub storyguide_version: String,
}

impl ReportCacheKey {
    pub fn for_story(story: &Story, config: &GuidanceConfig) -> Result<Self> {
        let rules = config
            .pipeline
            .rules
            .iter()
            .filter(|rule| rule.enabled)
            .map(|rule| rule.name.clone())
            .collect();

        Ok(Self {
            story_id: story.id.clone(),
            story_hash: calculate_story_hash(story)?,
            config_hash: calculate_config_hash(config)?,
            rules,
            storyguide_version: STORYGUIDE_VERSION.to_string(),
        })
    }

    /// Storage name for the entry: `<story id>-<sha256 of the key>`
    pub fn to_cache_hash(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(&self.story_hash);
        hasher.update(&self.config_hash);
        for rule in &self.rules {
            hasher.update(rule);
            hasher.update([0u8]);
        }
        hasher.update(&self.storyguide_version);
        format!("{}-{:x}", self.story_id, hasher.finalize())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportCacheValue {
    pub report: GuidanceReport,
    pub created_at: DateTime<Utc>,
    pub processing_time_ms: u64,
    pub guidance_total: usize,
}

impl ReportCacheValue {
    pub fn new(report: GuidanceReport, processing_time_ms: u64) -> Self {
        Self {
            guidance_total: report.total(),
            report,
            created_at: Utc::now(),
            processing_time_ms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::media::VIDEO_ELEMENT_LENGTH;
    use crate::types::Page;

    fn story(title: &str) -> Story {
        Story::new("trip", title, vec![Page::new("p1", Vec::new())])
    }

    #[test]
    fn key_tracks_story_and_pipeline() {
        let config = GuidanceConfig::default();
        let base = ReportCacheKey::for_story(&story("One"), &config).unwrap();
        assert_eq!(base.rules.len(), 5);
        assert!(base.to_cache_hash().starts_with("trip-"));

        let same = ReportCacheKey::for_story(&story("One"), &config).unwrap();
        assert_eq!(base.to_cache_hash(), same.to_cache_hash());

        let edited = ReportCacheKey::for_story(&story("Two"), &config).unwrap();
        assert_ne!(base.to_cache_hash(), edited.to_cache_hash());

        let mut fewer_rules = config.clone();
        fewer_rules.pipeline.rules.retain(|rule| rule.name == VIDEO_ELEMENT_LENGTH);
        let narrowed = ReportCacheKey::for_story(&story("One"), &fewer_rules).unwrap();
        assert_eq!(narrowed.rules, vec![VIDEO_ELEMENT_LENGTH.to_string()]);
        assert_ne!(base.to_cache_hash(), narrowed.to_cache_hash());
    }

    #[test]
    fn value_records_guidance_total() {
        let value = ReportCacheValue::new(GuidanceReport::new("trip", Vec::new()), 4);
        assert_eq!(value.guidance_total, 0);
        assert_eq!(value.processing_time_ms, 4);
    }
}
