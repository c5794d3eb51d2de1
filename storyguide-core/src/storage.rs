use crate::cache::{ReportCacheKey, ReportCacheValue};
use crate::dashboard::{StoryPage, StoryQuery};
use crate::error::StoryError;
use crate::types::{is_valid_story_id, Story};
use anyhow::{anyhow, Result};
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

/// Storage abstraction for saved stories and cached guidance reports
pub trait StoryStorage {
    // Stories
    fn list_stories(&self, query: &StoryQuery, page: usize) -> Result<StoryPage>;
    fn load_story(&self, id: &str) -> Result<Option<Story>>;
    fn store_story(&self, story: &Story) -> Result<()>;

    // Guidance report cache (story + config → report)
    fn get_report(&self, cache_key: &ReportCacheKey) -> Result<Option<ReportCacheValue>>;
    fn store_report(&self, cache_key: &ReportCacheKey, cache_value: &ReportCacheValue) -> Result<()>;
}

/// File-based storage: one JSON file per story, reports under `reports/`.
///
/// New stories are written to `<id>.json`. Files dropped into the directory by
/// hand may have any name; they are found by the `id` inside them.
pub struct FileStorage {
    root: PathBuf,
}

impl FileStorage {
    pub fn new(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)?;
        fs::create_dir_all(root.join("reports"))?;

        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn default_story_path(&self, id: &str) -> Result<PathBuf> {
        if !is_valid_story_id(id) {
            return Err(StoryError::InvalidId(id.to_string()).into());
        }
        Ok(self.root.join(format!("{id}.json")))
    }

    fn report_path(&self, cache_key: &ReportCacheKey) -> PathBuf {
        self.root
            .join("reports")
            .join(format!("{}.json", cache_key.to_cache_hash()))
    }

    fn read_story_file(path: &Path) -> Result<Story, StoryError> {
        let json = fs::read_to_string(path)?;
        Story::from_json_str(&json)
    }

    /// Every story file that parses and validates, keyed by story id. Bad files
    /// are logged and skipped so one broken document does not hide the rest of
    /// the dashboard. When two files claim the same id the first by file name wins.
    fn scan_stories(&self) -> Result<BTreeMap<String, (PathBuf, Story)>> {
        let mut paths = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let path = entry?.path();
            if path.is_file() && path.extension().and_then(|e| e.to_str()) == Some("json") {
                paths.push(path);
            }
        }
        paths.sort();

        let mut stories: BTreeMap<String, (PathBuf, Story)> = BTreeMap::new();
        for path in paths {
            match Self::read_story_file(&path) {
                Ok(story) => {
                    if let Some((kept, _)) = stories.get(&story.id) {
                        tracing::warn!(
                            path = %path.display(),
                            kept = %kept.display(),
                            story_id = %story.id,
                            "Duplicate story id, ignoring file"
                        );
                        continue;
                    }
                    stories.insert(story.id.clone(), (path, story));
                }
                Err(e) => tracing::warn!(path = %path.display(), error = %e, "Skipping unreadable story"),
            }
        }
        Ok(stories)
    }

    /// Path of the file holding story `id`, if there is one
    fn find_story(&self, id: &str) -> Result<Option<(PathBuf, Story)>> {
        let path = self.default_story_path(id)?;
        if path.is_file() {
            if let Ok(story) = Self::read_story_file(&path) {
                if story.id == id {
                    return Ok(Some((path, story)));
                }
            }
        }
        Ok(self.scan_stories()?.remove(id))
    }
}

impl StoryStorage for FileStorage {
    fn list_stories(&self, query: &StoryQuery, page: usize) -> Result<StoryPage> {
        let summaries = self
            .scan_stories()?
            .values()
            .map(|(_, story)| story.summary())
            .collect::<Vec<_>>();
        Ok(query.paginate(summaries, page))
    }

    fn load_story(&self, id: &str) -> Result<Option<Story>> {
        Ok(self.find_story(id)?.map(|(_, story)| story))
    }

    fn store_story(&self, story: &Story) -> Result<()> {
        story.validate()?;
        let path = match self.find_story(&story.id)? {
            Some((existing, _)) => existing,
            None => self.default_story_path(&story.id)?,
        };
        let json_str = serde_json::to_string_pretty(story)
            .map_err(|e| anyhow!("Failed to serialize story: {}", e))?;
        fs::write(path, json_str)?;
        Ok(())
    }

    fn get_report(&self, cache_key: &ReportCacheKey) -> Result<Option<ReportCacheValue>> {
        let path = self.report_path(cache_key);
        if path.exists() {
            let json_str = fs::read_to_string(path)?;
            let cache_value: ReportCacheValue = serde_json::from_str(&json_str)
                .map_err(|e| anyhow!("Failed to deserialize cached report: {}", e))?;
            Ok(Some(cache_value))
        } else {
            Ok(None)
        }
    }

    fn store_report(&self, cache_key: &ReportCacheKey, cache_value: &ReportCacheValue) -> Result<()> {
        let path = self.report_path(cache_key);
        let json_str = serde_json::to_string_pretty(cache_value)
            .map_err(|e| anyhow!("Failed to serialize cached report: {}", e))?;
        fs::write(path, json_str)?;
        Ok(())
    }
}

/// In-process storage, for embedding and tests
#[derive(Default)]
pub struct MemoryStorage {
    stories: RwLock<BTreeMap<String, Story>>,
    reports: RwLock<HashMap<String, ReportCacheValue>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_stories(stories: impl IntoIterator<Item = Story>) -> Result<Self> {
        let storage = Self::new();
        for story in stories {
            storage.store_story(&story)?;
        }
        Ok(storage)
    }
}

fn poisoned<T>(_: T) -> anyhow::Error {
    anyhow!("Story storage lock poisoned")
}

impl StoryStorage for MemoryStorage {
    fn list_stories(&self, query: &StoryQuery, page: usize) -> Result<StoryPage> {
        let stories = self.stories.read().map_err(poisoned)?;
        Ok(query.paginate(stories.values().map(Story::summary), page))
    }

    fn load_story(&self, id: &str) -> Result<Option<Story>> {
        let stories = self.stories.read().map_err(poisoned)?;
        Ok(stories.get(id).cloned())
    }

    fn store_story(&self, story: &Story) -> Result<()> {
        story.validate()?;
        let mut stories = self.stories.write().map_err(poisoned)?;
        stories.insert(story.id.clone(), story.clone());
        Ok(())
    }

    fn get_report(&self, cache_key: &ReportCacheKey) -> Result<Option<ReportCacheValue>> {
        let reports = self.reports.read().map_err(poisoned)?;
        Ok(reports.get(&cache_key.to_cache_hash()).cloned())
    }

    fn store_report(&self, cache_key: &ReportCacheKey, cache_value: &ReportCacheValue) -> Result<()> {
        let mut reports = self.reports.write().map_err(poisoned)?;
        reports.insert(cache_key.to_cache_hash(), cache_value.clone());
        Ok(())
    }
}

/// Calculate hash for a story's canonical JSON (for the report cache key)
pub fn calculate_story_hash(story: &Story) -> Result<String> {
    let story_json = serde_json::to_string(story)
        .map_err(|e| anyhow!("Failed to serialize story for hashing: {}", e))?;

    let mut hasher = Sha256::new();
    hasher.update(story_json.as_bytes());
    Ok(format!("{:x}", hasher.finalize()))
}

/// Calculate hash for configuration data (for the report cache key)
pub fn calculate_config_hash<T: serde::Serialize>(config: &T) -> Result<String> {
    let config_json = serde_json::to_string(config)
        .map_err(|e| anyhow!("Failed to serialize config for hashing: {}", e))?;

    let mut hasher = Sha256::new();
    hasher.update(config_json.as_bytes());
    Ok(format!("{:x}", hasher.finalize()))
}
