use crate::rules::media::{
    IMAGE_ELEMENT_RESOLUTION, MEDIA_ELEMENT_RESOLUTION, MEDIA_ELEMENT_SIZE_ON_PAGE,
    VIDEO_ELEMENT_FRAME_RATE, VIDEO_ELEMENT_LENGTH,
};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

// Default value functions for serde
fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuidanceConfig {
    /// Visible page area that element coverage is measured against
    #[serde(default)]
    pub safe_zone: SafeZone,
    /// Thresholds for the media rules
    #[serde(default)]
    pub media: MediaGuidanceConfig,
    /// Pipeline configuration - defines which rules to run and in what order
    #[serde(default)]
    pub pipeline: PipelineConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SafeZone {
    /// Width in page units
    pub width: f64,
    /// Height in page units
    pub height: f64,
}

impl SafeZone {
    /// `None` when the configured zone is degenerate
    pub fn area(&self) -> Option<f64> {
        let area = self.width * self.height;
        (self.width > 0.0 && self.height > 0.0 && area.is_finite()).then_some(area)
    }
}

impl Default for SafeZone {
    fn default() -> Self {
        // 2:3 portrait safe zone of the editor canvas
        Self {
            width: 412.0,
            height: 618.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaGuidanceConfig {
    /// Minimum share of the safe zone a media element should cover (0.0-1.0)
    pub min_safe_zone_coverage: f64,
    /// Videos whose short edge is at or below this are low resolution
    pub low_resolution_short_edge: f64,
    /// Videos whose short edge reaches this are too large for most devices
    pub max_resolution_short_edge: f64,
    /// Videos whose long edge reaches this are too large for most devices
    pub max_resolution_long_edge: f64,
    /// Longest recommended video, in seconds
    pub max_video_length_secs: f64,
    /// Lowest recommended video frame rate
    pub min_video_frame_rate: f64,
    /// Source pixels required per page unit on both axes of an image
    pub min_image_pixel_density: f64,
}

impl Default for MediaGuidanceConfig {
    fn default() -> Self {
        Self {
            min_safe_zone_coverage: 0.5,
            low_resolution_short_edge: 480.0,
            max_resolution_short_edge: 2160.0,
            max_resolution_long_edge: 3840.0,
            max_video_length_secs: 60.0,
            min_video_frame_rate: 24.0,
            min_image_pixel_density: 2.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// List of rules to run in order
    pub rules: Vec<RuleConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleConfig {
    /// Name of the rule
    pub name: String,
    /// Whether this rule is enabled
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl RuleConfig {
    fn enabled(name: &str) -> Self {
        Self {
            name: name.to_string(),
            enabled: true,
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            rules: vec![
                RuleConfig::enabled(MEDIA_ELEMENT_SIZE_ON_PAGE),
                RuleConfig::enabled(MEDIA_ELEMENT_RESOLUTION),
                RuleConfig::enabled(VIDEO_ELEMENT_LENGTH),
                RuleConfig::enabled(IMAGE_ELEMENT_RESOLUTION),
                RuleConfig::enabled(VIDEO_ELEMENT_FRAME_RATE),
            ],
        }
    }
}

impl Default for GuidanceConfig {
    fn default() -> Self {
        Self {
            safe_zone: SafeZone::default(),
            media: MediaGuidanceConfig::default(),
            pipeline: PipelineConfig::default(),
        }
    }
}

impl GuidanceConfig {
    /// Shared default config used by the standalone rule functions
    pub fn builtin() -> &'static GuidanceConfig {
        static BUILTIN: OnceLock<GuidanceConfig> = OnceLock::new();
        BUILTIN.get_or_init(GuidanceConfig::default)
    }

    /// Load config from a YAML file
    pub fn load_from_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {path}"))?;
        Self::from_yaml_str(&content)
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: GuidanceConfig =
            serde_yaml::from_str(yaml).context("Invalid guidance config")?;
        Ok(config)
    }

    /// Load config with fallback to default
    pub fn load_with_fallback(path: Option<&str>) -> Self {
        match path {
            Some(p) => Self::load_from_file(p).unwrap_or_else(|e| {
                tracing::warn!(path = p, error = %e, "Failed to load config, using defaults");
                Self::default()
            }),
            None => Self::default(),
        }
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn rule_enabled(&self, name: &str) -> bool {
        self.pipeline
            .rules
            .iter()
            .any(|rule| rule.enabled && rule.name == name)
    }
}
