use super::media::*;
use super::report::{GuidanceReport, PageGuidance};
use crate::config::GuidanceConfig;
use crate::types::*;
use regex::Regex;
use std::cell::RefCell;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// A single prepublish check. Rules are pure: the same element always
/// produces the same answer, and a rule never mutates what it inspects.
pub trait GuidanceRule {
    fn name(&self) -> &str;
    fn applies_to(&self, element_type: ElementType) -> bool;
    /// `None` means the check passed, or the element lacks the data it needs
    fn check(&self, element: &Element) -> Option<Guidance>;
}

// Debug configuration for pipeline tracing
#[derive(Debug, Clone)]
pub struct DebugConfig {
    pub enabled: bool,
    pub filter_patterns: Vec<String>,
}

impl DebugConfig {
    pub fn new(enabled: bool, filter_patterns: Vec<String>) -> Self {
        Self {
            enabled,
            filter_patterns,
        }
    }

    pub fn disabled() -> Self {
        Self {
            enabled: false,
            filter_patterns: Vec::new(),
        }
    }

    fn matches(&self, element: &Element) -> bool {
        let id = element.id.to_string();
        self.filter_patterns.iter().any(|pattern| {
            // Try regex first, fall back to simple string contains
            match Regex::new(pattern) {
                Ok(regex) => regex.is_match(&id),
                Err(_) => id.contains(pattern.as_str()),
            }
        })
    }
}

/// Trace the outcome of each rule for elements whose id matches the debug filter
fn debug_rule_outcome(
    rule_name: &str,
    element: &Element,
    outcome: Option<&Guidance>,
    debug_config: &DebugConfig,
) {
    if !debug_config.enabled || debug_config.filter_patterns.is_empty() {
        return;
    }
    if !debug_config.matches(element) {
        return;
    }

    debug!(
        rule = rule_name,
        element_id = %element.id,
        element_type = element.element_type.as_str(),
        width = ?element.width,
        height = ?element.height,
        outcome = outcome.map(|g| g.message.as_str()).unwrap_or("pass"),
        "rule evaluated"
    );
}

pub struct GuidanceEngine {
    debug_config: DebugConfig,
    pub rule_timings: RefCell<Vec<(String, Duration)>>,
}

impl Default for GuidanceEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl GuidanceEngine {
    pub fn new() -> Self {
        Self {
            debug_config: DebugConfig::disabled(),
            rule_timings: RefCell::new(Vec::new()),
        }
    }

    pub fn set_debug_config(&mut self, debug_config: DebugConfig) {
        self.debug_config = debug_config;
    }

    /// Instantiate the enabled rules from the pipeline config, in order
    pub fn build_rules<'a>(&self, config: &'a GuidanceConfig) -> Vec<Box<dyn GuidanceRule + 'a>> {
        let mut rules = Vec::new();
        for rule_config in &config.pipeline.rules {
            if !rule_config.enabled {
                debug!(rule = %rule_config.name, "Skipping disabled rule");
                continue;
            }
            if let Some(rule) = rule_by_name(&rule_config.name, config) {
                rules.push(rule);
            }
        }
        rules
    }

    /// All guidance for one element, in pipeline order
    pub fn check_element(&self, element: &Element, config: &GuidanceConfig) -> Vec<Guidance> {
        let rules = self.build_rules(config);
        let mut timings = vec![Duration::ZERO; rules.len()];
        let guidance = self.run_rules(&rules, element, &mut timings);
        self.record_timings(&rules, timings);
        guidance
    }

    pub fn check_page(&self, page: &Page, page_index: usize, config: &GuidanceConfig) -> PageGuidance {
        let rules = self.build_rules(config);
        let mut timings = vec![Duration::ZERO; rules.len()];
        let page_guidance = self.check_page_with(&rules, page, page_index, &mut timings);
        self.record_timings(&rules, timings);
        page_guidance
    }

    pub fn check_story(&self, story: &Story, config: &GuidanceConfig) -> GuidanceReport {
        info!(
            story_id = %story.id,
            pages = story.pages.len(),
            elements = story.element_count(),
            "Running prepublish guidance"
        );

        let rules = self.build_rules(config);
        let mut timings = vec![Duration::ZERO; rules.len()];

        let pages = story
            .pages
            .iter()
            .enumerate()
            .map(|(index, page)| self.check_page_with(&rules, page, index, &mut timings))
            .collect();

        self.record_timings(&rules, timings);

        let report = GuidanceReport::new(&story.id, pages);
        info!(story_id = %story.id, guidance = report.total(), "Guidance complete");
        report
    }

    fn check_page_with(
        &self,
        rules: &[Box<dyn GuidanceRule + '_>],
        page: &Page,
        page_index: usize,
        timings: &mut [Duration],
    ) -> PageGuidance {
        let guidance = page
            .elements
            .iter()
            .flat_map(|element| self.run_rules(rules, element, &mut *timings))
            .collect();

        PageGuidance {
            page_id: page.id.clone(),
            page_index,
            guidance,
        }
    }

    fn run_rules(
        &self,
        rules: &[Box<dyn GuidanceRule + '_>],
        element: &Element,
        timings: &mut [Duration],
    ) -> Vec<Guidance> {
        let mut results = Vec::new();
        for (rule, elapsed) in rules.iter().zip(timings.iter_mut()) {
            if !rule.applies_to(element.element_type) {
                continue;
            }
            let start = Instant::now();
            let outcome = rule.check(element);
            *elapsed += start.elapsed();

            debug_rule_outcome(rule.name(), element, outcome.as_ref(), &self.debug_config);
            results.extend(outcome);
        }
        results
    }

    fn record_timings(&self, rules: &[Box<dyn GuidanceRule + '_>], timings: Vec<Duration>) {
        let mut recorded = self.rule_timings.borrow_mut();
        recorded.clear();
        recorded.extend(
            rules
                .iter()
                .zip(timings)
                .map(|(rule, elapsed)| (rule.name().to_string(), elapsed)),
        );
    }
}

fn rule_by_name<'a>(name: &str, config: &'a GuidanceConfig) -> Option<Box<dyn GuidanceRule + 'a>> {
    match name {
        MEDIA_ELEMENT_SIZE_ON_PAGE => Some(Box::new(MediaElementSizeRule::new(config))),
        MEDIA_ELEMENT_RESOLUTION => Some(Box::new(MediaElementResolutionRule::new(config))),
        VIDEO_ELEMENT_LENGTH => Some(Box::new(VideoElementLengthRule::new(config))),
        IMAGE_ELEMENT_RESOLUTION => Some(Box::new(ImageElementResolutionRule::new(config))),
        VIDEO_ELEMENT_FRAME_RATE => Some(Box::new(VideoElementFrameRateRule::new(config))),
        _ => {
            warn!(rule = name, "Unknown guidance rule, skipping");
            None
        }
    }
}
