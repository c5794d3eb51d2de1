//! Dashboard content view: the paginated story list and its empty state.
//!
//! What the dashboard shows is a pure function of the loaded stories, the
//! paging state and the search keyword ([`ContentView::select`]). Paging is
//! driven by [`StoryListController::request_next_page`].

use crate::storage::StoryStorage;
use crate::types::{StoryStatus, StorySummary};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

pub const DEFAULT_STORIES_PER_PAGE: usize = 24;
pub const ALL_DATA_LOADED_MESSAGE: &str = "No more stories";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StatusFilter {
    #[default]
    All,
    Draft,
    Published,
}

impl StatusFilter {
    pub fn matches(&self, status: StoryStatus) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Draft => status == StoryStatus::Draft,
            StatusFilter::Published => status == StoryStatus::Publish,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortBy {
    #[default]
    LastModified,
    Name,
    CreatedBy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortBy {
    /// Newest first for dates, alphabetical for names
    pub fn default_direction(&self) -> SortDirection {
        match self {
            SortBy::LastModified => SortDirection::Desc,
            SortBy::Name | SortBy::CreatedBy => SortDirection::Asc,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoryQuery {
    pub search: Option<String>,
    pub status: StatusFilter,
    pub sort: SortBy,
    pub direction: SortDirection,
    pub per_page: usize,
}

impl Default for StoryQuery {
    fn default() -> Self {
        Self {
            search: None,
            status: StatusFilter::All,
            sort: SortBy::LastModified,
            direction: SortBy::LastModified.default_direction(),
            per_page: DEFAULT_STORIES_PER_PAGE,
        }
    }
}

impl StoryQuery {
    /// Trimmed search keyword, `None` when blank
    pub fn keyword(&self) -> Option<&str> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }

    pub fn matches(&self, story: &StorySummary) -> bool {
        if !self.status.matches(story.status) {
            return false;
        }
        match self.keyword() {
            Some(keyword) => story
                .title
                .to_lowercase()
                .contains(&keyword.to_lowercase()),
            None => true,
        }
    }

    fn compare(&self, a: &StorySummary, b: &StorySummary) -> Ordering {
        let ordering = match self.sort {
            // Stories never saved sort as oldest
            SortBy::LastModified => a.modified.cmp(&b.modified),
            SortBy::Name => a.title.to_lowercase().cmp(&b.title.to_lowercase()),
            SortBy::CreatedBy => a.author.cmp(&b.author),
        };
        let ordering = match self.direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        };
        // Stable tiebreak so paging never repeats or skips a story
        ordering.then_with(|| a.id.cmp(&b.id))
    }

    /// Filter, sort and slice `stories` to the requested 1-based page
    pub fn paginate(&self, stories: impl IntoIterator<Item = StorySummary>, page: usize) -> StoryPage {
        let mut matching: Vec<StorySummary> =
            stories.into_iter().filter(|s| self.matches(s)).collect();
        matching.sort_by(|a, b| self.compare(a, b));

        let per_page = self.per_page.max(1);
        let total_stories = matching.len();
        let total_pages = total_stories.div_ceil(per_page);
        let page = page.max(1);

        let stories = matching
            .into_iter()
            .skip((page - 1).saturating_mul(per_page))
            .take(per_page)
            .collect();

        StoryPage {
            stories,
            page,
            total_stories,
            total_pages,
        }
    }
}

/// One page of results from the story store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryPage {
    pub stories: Vec<StorySummary>,
    pub page: usize,
    pub total_stories: usize,
    pub total_pages: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewStyle {
    #[default]
    Grid,
    List,
}

/// Rendered size of one story card
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageSize {
    pub width: f64,
    pub height: f64,
}

impl Default for PageSize {
    fn default() -> Self {
        Self {
            width: 212.0,
            height: 318.0,
        }
    }
}

/// Layout settings handed to the content view
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewConfig {
    pub style: ViewStyle,
    pub page_size: PageSize,
}

/// Paging state exposed to the view
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PagingState {
    pub is_loading: bool,
    pub all_pages_fetched: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EmptyView {
    pub search_keyword: Option<String>,
}

impl EmptyView {
    pub fn message(&self) -> String {
        match &self.search_keyword {
            Some(keyword) => format!("Sorry, we couldn't find any results matching \"{keyword}\""),
            None => "Start telling Stories.".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ContentView {
    Listing {
        stories: Vec<StorySummary>,
        view: ViewConfig,
        can_load_more: bool,
        is_loading: bool,
        all_data_loaded_message: &'static str,
    },
    Empty(EmptyView),
}

impl ContentView {
    pub fn select(
        stories: &[StorySummary],
        paging: PagingState,
        search_keyword: Option<&str>,
        view: ViewConfig,
    ) -> Self {
        if stories.is_empty() {
            return ContentView::Empty(EmptyView {
                search_keyword: search_keyword
                    .map(str::trim)
                    .filter(|k| !k.is_empty())
                    .map(str::to_string),
            });
        }

        ContentView::Listing {
            stories: stories.to_vec(),
            view,
            can_load_more: !paging.all_pages_fetched,
            is_loading: paging.is_loading,
            all_data_loaded_message: ALL_DATA_LOADED_MESSAGE,
        }
    }
}

/// Infinite-scroll controller over a story store
pub struct StoryListController<'a, S: StoryStorage + ?Sized> {
    storage: &'a S,
    query: StoryQuery,
    view: ViewConfig,
    stories: Vec<StorySummary>,
    pages_fetched: usize,
    total_stories: usize,
    paging: PagingState,
}

impl<'a, S: StoryStorage + ?Sized> StoryListController<'a, S> {
    pub fn new(storage: &'a S, query: StoryQuery, view: ViewConfig) -> Self {
        Self {
            storage,
            query,
            view,
            stories: Vec::new(),
            pages_fetched: 0,
            total_stories: 0,
            paging: PagingState::default(),
        }
    }

    pub fn query(&self) -> &StoryQuery {
        &self.query
    }

    /// Replace the query and start over from the first page
    pub fn set_query(&mut self, query: StoryQuery) {
        self.query = query;
        self.stories.clear();
        self.pages_fetched = 0;
        self.total_stories = 0;
        self.paging = PagingState::default();
    }

    pub fn stories(&self) -> &[StorySummary] {
        &self.stories
    }

    pub fn total_stories(&self) -> usize {
        self.total_stories
    }

    pub fn paging(&self) -> PagingState {
        self.paging
    }

    /// Fetch and append the next page. Returns how many stories were added;
    /// zero once every page has been fetched.
    pub fn request_next_page(&mut self) -> Result<usize> {
        if self.paging.all_pages_fetched || self.paging.is_loading {
            return Ok(0);
        }

        self.paging.is_loading = true;
        let next = self.pages_fetched + 1;
        let result = self.storage.list_stories(&self.query, next);
        self.paging.is_loading = false;

        let page = result?;
        let added = page.stories.len();
        tracing::debug!(page = next, added, total = page.total_stories, "Fetched story page");

        self.stories.extend(page.stories);
        self.pages_fetched = next;
        self.total_stories = page.total_stories;
        self.paging.all_pages_fetched = next >= page.total_pages;

        Ok(added)
    }

    pub fn content_view(&self) -> ContentView {
        ContentView::select(
            &self.stories,
            self.paging,
            self.query.keyword(),
            self.view,
        )
    }
}
