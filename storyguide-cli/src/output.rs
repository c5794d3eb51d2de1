//! Rendering of guidance reports and story listings for the terminal.

use anyhow::Result;
use clap::ValueEnum;
use std::fmt::Write;
use storyguide_core::dashboard::ContentView;
use storyguide_core::{GuidanceReport, Story, StorySummary};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable summary
    #[default]
    Text,
    /// Pretty-printed JSON
    Json,
}

/// Guidance grouped under page headings, followed by a one-line total
pub fn render_text(report: &GuidanceReport, story: &Story) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Story: {} ({})", story.title, story.id);

    if report.is_clean() {
        let _ = writeln!(out, "No guidance, ready to publish");
        return out;
    }

    for page in &report.pages {
        let _ = writeln!(out, "Page {} \"{}\"", page.page_index + 1, page.page_id);
        for guidance in &page.guidance {
            let _ = writeln!(out, "  [{}] {}", guidance.element_id, guidance.message);
        }
    }

    let _ = writeln!(
        out,
        "{} guidance item(s) on {} of {} page(s)",
        report.total(),
        report.pages.len(),
        story.pages.len()
    );
    out
}

pub fn render_json<T: serde::Serialize>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

fn story_line(story: &StorySummary) -> String {
    let modified = story
        .modified
        .map(|m| m.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".to_string());
    format!(
        "{:<24} {:<8} {:<16} {}",
        story.id,
        story.status.as_str(),
        modified,
        story.title
    )
}

/// Dashboard listing, or the empty-state message when nothing matched
pub fn render_listing(view: &ContentView, total_stories: usize) -> String {
    let mut out = String::new();
    match view {
        ContentView::Listing {
            stories,
            can_load_more,
            all_data_loaded_message,
            ..
        } => {
            for story in stories {
                let _ = writeln!(out, "{}", story_line(story));
            }
            if *can_load_more {
                let _ = writeln!(
                    out,
                    "Showing {} of {} stories (use --pages to load more)",
                    stories.len(),
                    total_stories
                );
            } else {
                let _ = writeln!(out, "{all_data_loaded_message}");
            }
        }
        ContentView::Empty(empty) => {
            let _ = writeln!(out, "{}", empty.message());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use storyguide_core::dashboard::{EmptyView, PagingState, ViewConfig};
    use storyguide_core::{Element, ElementType, GuidanceConfig, GuidanceEngine, Page, StoryStatus};

    fn story() -> Story {
        Story::new(
            "clips",
            "Clips",
            vec![
                Page::new("intro", vec![Element::new(1, ElementType::Text)]),
                Page::new("main", vec![Element::new(456, ElementType::Video).with_size(400.0, 100.0)]),
            ],
        )
    }

    #[test]
    fn text_report_lists_guidance_by_page() {
        let story = story();
        let report = GuidanceEngine::new().check_story(&story, &GuidanceConfig::default());
        let text = render_text(&report, &story);

        assert!(text.contains("Page 2 \"main\""));
        assert!(text.contains("  [456] Video is too small on the page"));
        assert!(text.contains("1 guidance item(s) on 1 of 2 page(s)"));
        assert!(!text.contains("intro"));
    }

    #[test]
    fn clean_report_says_so() {
        let story = Story::new("s", "Quiet", vec![Page::new("p", Vec::new())]);
        let report = GuidanceEngine::new().check_story(&story, &GuidanceConfig::default());
        assert!(render_text(&report, &story).contains("ready to publish"));
    }

    #[test]
    fn listing_footer_depends_on_paging() {
        let summary = story().summary();
        let more = ContentView::select(
            std::slice::from_ref(&summary),
            PagingState::default(),
            None,
            ViewConfig::default(),
        );
        assert!(render_listing(&more, 3).contains("Showing 1 of 3 stories"));

        let done = ContentView::select(
            &[summary],
            PagingState {
                is_loading: false,
                all_pages_fetched: true,
            },
            None,
            ViewConfig::default(),
        );
        let text = render_listing(&done, 1);
        assert!(text.contains("draft"));
        assert!(text.ends_with("No more stories\n"));
    }

    #[test]
    fn empty_listing_prints_message() {
        let view = ContentView::Empty(EmptyView { search_keyword: None });
        assert_eq!(render_listing(&view, 0), "Start telling Stories.\n");
    }

    #[test]
    fn json_uses_serde_names() {
        assert_eq!(OutputFormat::default(), OutputFormat::Text);
        let status = render_json(&StoryStatus::Publish).unwrap();
        assert_eq!(status, "\"publish\"");
    }
}
