use crate::cache::{ReportCacheKey, ReportCacheValue};
use crate::config::GuidanceConfig;
use crate::rules::{DebugConfig, GuidanceEngine, GuidanceReport};
use crate::storage::{FileStorage, MemoryStorage, StoryStorage};
use crate::types::Story;
use anyhow::{anyhow, Result};
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Simple profiler that collects timings for processing steps
pub struct StepProfiler {
    enabled: bool,
    timings: Vec<(String, Duration)>,
}

impl StepProfiler {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            timings: Vec::new(),
        }
    }

    pub fn time_step<F, R>(&mut self, step_name: &str, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        if !self.enabled {
            return f();
        }

        let start = Instant::now();
        let result = f();
        let elapsed = start.elapsed();

        self.timings.push((step_name.to_string(), elapsed));
        info!(step = step_name, elapsed_us = elapsed.as_micros() as u64, "Step finished");

        result
    }

    pub fn timings(&self) -> &[(String, Duration)] {
        &self.timings
    }

    pub fn log_summary(&self) {
        if !self.enabled || self.timings.is_empty() {
            return;
        }

        let total: Duration = self.timings.iter().map(|(_, d)| *d).sum();
        for (step, duration) in &self.timings {
            let percentage = if total.is_zero() {
                0.0
            } else {
                (duration.as_secs_f64() / total.as_secs_f64()) * 100.0
            };
            info!(
                step = step.as_str(),
                elapsed_us = duration.as_micros() as u64,
                share_pct = percentage,
                "Profile"
            );
        }
        info!(elapsed_us = total.as_micros() as u64, "Profile total");
    }
}

/// Runs guidance over stories, with a report cache in front of the engine
pub struct GuidanceProcessor {
    storage: Box<dyn StoryStorage + Send + Sync>,
    engine: GuidanceEngine,
}

impl GuidanceProcessor {
    pub fn new(storage: Box<dyn StoryStorage + Send + Sync>) -> Self {
        Self {
            storage,
            engine: GuidanceEngine::new(),
        }
    }

    /// Processor caching reports under `cache_dir`
    pub fn with_file_cache(cache_dir: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::new(Box::new(FileStorage::new(cache_dir)?)))
    }

    /// Processor with an in-memory store that lives as long as the processor
    pub fn in_memory() -> Self {
        Self::new(Box::new(MemoryStorage::new()))
    }

    pub fn storage(&self) -> &dyn StoryStorage {
        self.storage.as_ref()
    }

    pub fn set_debug_config(&mut self, debug_config: DebugConfig) {
        self.engine.set_debug_config(debug_config);
    }

    pub fn rule_timings(&self) -> Vec<(String, Duration)> {
        self.engine.rule_timings.borrow().clone()
    }

    pub fn check_story(&self, story: &Story, config: &GuidanceConfig) -> Result<GuidanceReport> {
        self.check_story_with_config_and_profiling(story, config, false, false)
    }

    pub fn check_story_with_config_and_profiling(
        &self,
        story: &Story,
        config: &GuidanceConfig,
        profile: bool,
        skip_cache: bool,
    ) -> Result<GuidanceReport> {
        let mut profiler = StepProfiler::new(profile);

        let cache_key = profiler.time_step("Cache key", || ReportCacheKey::for_story(story, config))?;

        if !skip_cache {
            // A broken cache entry is only a miss; the report is recomputed and rewritten
            match profiler.time_step("Cache lookup", || self.storage.get_report(&cache_key)) {
                Ok(Some(cached)) => {
                    info!(story_id = %story.id, cached_at = %cached.created_at, "Using cached guidance report");
                    profiler.log_summary();
                    return Ok(cached.report);
                }
                Ok(None) => {}
                Err(e) => warn!(story_id = %story.id, error = %e, "Ignoring unreadable cached report"),
            }
        }

        let start = Instant::now();
        let report = profiler.time_step("Guidance rules", || self.engine.check_story(story, config));
        let processing_time_ms = start.elapsed().as_millis() as u64;

        if profile {
            for (rule, elapsed) in self.engine.rule_timings.borrow().iter() {
                info!(rule = rule.as_str(), elapsed_us = elapsed.as_micros() as u64, "Rule timing");
            }
        }

        if !skip_cache {
            let value = ReportCacheValue::new(report.clone(), processing_time_ms);
            if let Err(e) = profiler.time_step("Cache store", || self.storage.store_report(&cache_key, &value)) {
                warn!(story_id = %story.id, error = %e, "Failed to cache guidance report");
            }
        }

        profiler.log_summary();
        Ok(report)
    }

    /// Parse, validate and check a story file
    pub fn check_story_file(
        &self,
        path: impl AsRef<Path>,
        config: &GuidanceConfig,
        profile: bool,
        skip_cache: bool,
    ) -> Result<(Story, GuidanceReport)> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| anyhow!("Failed to read {}: {}", path.display(), e))?;
        let story = Story::from_json_str(&json)
            .map_err(|e| anyhow!("Invalid story {}: {}", path.display(), e))?;
        let report = self.check_story_with_config_and_profiling(&story, config, profile, skip_cache)?;
        Ok((story, report))
    }

    /// Check a story already held by the processor's storage
    pub fn check_stored_story(&self, id: &str, config: &GuidanceConfig) -> Result<GuidanceReport> {
        let story = self
            .storage
            .load_story(id)?
            .ok_or_else(|| anyhow!("Story not found: {}", id))?;
        self.check_story(&story, config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Element, ElementType, Page};

    fn small_video_story() -> Story {
        Story::new(
            "s1",
            "Clips",
            vec![Page::new("p1", vec![Element::new(456, ElementType::Video).with_size(400.0, 100.0)])],
        )
    }

    #[test]
    fn second_check_is_served_from_cache() {
        let processor = GuidanceProcessor::in_memory();
        let config = GuidanceConfig::default();

        let first = processor.check_story(&small_video_story(), &config).unwrap();
        let second = processor.check_story(&small_video_story(), &config).unwrap();
        assert_eq!(first.id, second.id);
    }

    #[test]
    fn skip_cache_always_reruns() {
        let processor = GuidanceProcessor::in_memory();
        let config = GuidanceConfig::default();

        let first = processor
            .check_story_with_config_and_profiling(&small_video_story(), &config, false, true)
            .unwrap();
        let second = processor
            .check_story_with_config_and_profiling(&small_video_story(), &config, true, true)
            .unwrap();
        assert_ne!(first.id, second.id);
        assert_eq!(first.pages, second.pages);
    }

    #[test]
    fn config_change_misses_cache() {
        let processor = GuidanceProcessor::in_memory();
        let mut config = GuidanceConfig::default();
        let first = processor.check_story(&small_video_story(), &config).unwrap();
        assert_eq!(first.total(), 1);

        config.media.min_safe_zone_coverage = 0.1;
        let second = processor.check_story(&small_video_story(), &config).unwrap();
        assert!(second.is_clean());
    }

    #[test]
    fn stored_story_lookup() {
        let processor = GuidanceProcessor::in_memory();
        processor.storage().store_story(&small_video_story()).unwrap();

        let report = processor
            .check_stored_story("s1", &GuidanceConfig::default())
            .unwrap();
        assert_eq!(report.total(), 1);
        assert!(processor
            .check_stored_story("nope", &GuidanceConfig::default())
            .is_err());
    }

    #[test]
    fn profiler_records_only_when_enabled() {
        let mut off = StepProfiler::new(false);
        assert_eq!(off.time_step("x", || 2), 2);
        assert!(off.timings().is_empty());

        let mut on = StepProfiler::new(true);
        on.time_step("x", || ());
        assert_eq!(on.timings().len(), 1);
    }

    #[test]
    fn corrupt_cache_entry_is_recomputed_and_replaced() {
        let temp_dir = tempfile::tempdir().unwrap();
        let processor = GuidanceProcessor::with_file_cache(temp_dir.path()).unwrap();
        let config = GuidanceConfig::default();
        let first = processor.check_story(&small_video_story(), &config).unwrap();

        let reports = temp_dir.path().join("reports");
        let entry = std::fs::read_dir(&reports).unwrap().next().unwrap().unwrap().path();
        std::fs::write(&entry, "{ truncated").unwrap();

        let second = processor.check_story(&small_video_story(), &config).unwrap();
        assert_eq!(second.pages, first.pages);
        assert_ne!(second.id, first.id);

        // The entry was rewritten, so the next check is a hit again
        let third = processor.check_story(&small_video_story(), &config).unwrap();
        assert_eq!(third.id, second.id);
    }

    #[test]
    fn unwritable_cache_does_not_fail_the_check() {
        let temp_dir = tempfile::tempdir().unwrap();
        let processor = GuidanceProcessor::with_file_cache(temp_dir.path()).unwrap();
        std::fs::remove_dir(temp_dir.path().join("reports")).unwrap();

        let report = processor
            .check_story(&small_video_story(), &GuidanceConfig::default())
            .unwrap();
        assert_eq!(report.total(), 1);
    }
}
