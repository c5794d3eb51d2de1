//! Guidance boundary tests: story JSON in, guidance report out.
//!
//! Fixtures live in `test_fixtures/`:
//!
//! - `stories/media_checklist.json`: one element per media rule outcome
//! - `stories/clean_story.json`: full-bleed, well-encoded media, no guidance
//! - `invalid/`: documents rejected at the input boundary
//! - `partial/`: documents missing optional media metadata

use serde_json::Value;
use std::path::PathBuf;
use storyguide_core::config::GuidanceConfig;
use storyguide_core::rules::media::VIDEO_ELEMENT_LENGTH;
use storyguide_core::{ElementId, GuidanceEngine, GuidanceMessage, Story, StoryError};

// ============================================================================
// Fixture helpers
// ============================================================================

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("test_fixtures")
}

fn load_fixture(relative: &str) -> String {
    let path = fixtures_dir().join(relative);
    std::fs::read_to_string(&path)
        .unwrap_or_else(|_| panic!("Missing fixture: {}", path.display()))
}

fn load_story(name: &str) -> Story {
    Story::from_json_str(&load_fixture(&format!("stories/{name}.json")))
        .unwrap_or_else(|e| panic!("Fixture {name} should be a valid story: {e}"))
}

fn messages_for(story: &Story, id: u64) -> Vec<GuidanceMessage> {
    let report = GuidanceEngine::new().check_story(story, &GuidanceConfig::default());
    report
        .for_element(&ElementId::Number(id))
        .into_iter()
        .map(|g| g.message)
        .collect()
}

// ============================================================================
// Media checklist: each element hits exactly one rule
// ============================================================================

mod media_checklist {
    use super::*;

    #[test]
    fn small_image_is_flagged() {
        let story = load_story("media_checklist");
        assert_eq!(messages_for(&story, 123), vec![GuidanceMessage::ImageTooSmallOnPage]);
    }

    #[test]
    fn small_video_is_flagged() {
        let story = load_story("media_checklist");
        assert_eq!(messages_for(&story, 456), vec![GuidanceMessage::VideoTooSmallOnPage]);
    }

    #[test]
    fn low_resolution_video_is_flagged() {
        let story = load_story("media_checklist");
        assert_eq!(messages_for(&story, 789), vec![GuidanceMessage::VideoLowResolution]);
    }

    #[test]
    fn four_k_video_is_flagged() {
        let story = load_story("media_checklist");
        assert_eq!(messages_for(&story, 101), vec![GuidanceMessage::VideoResolutionTooHigh]);
    }

    #[test]
    fn long_video_is_flagged() {
        let story = load_story("media_checklist");
        assert_eq!(messages_for(&story, 202), vec![GuidanceMessage::VideoTooLong]);
    }

    #[test]
    fn text_is_never_flagged() {
        let story = load_story("media_checklist");
        assert!(messages_for(&story, 1).is_empty());
    }

    #[test]
    fn report_groups_by_page_in_order() {
        let story = load_story("media_checklist");
        let report = GuidanceEngine::new().check_story(&story, &GuidanceConfig::default());

        let page_ids: Vec<_> = report.pages.iter().map(|p| p.page_id.as_str()).collect();
        assert_eq!(page_ids, vec!["cover", "clips", "finale"]);
        assert_eq!(report.total(), 5);
        assert_eq!(report.story_id, "media-checklist");
    }

    #[test]
    fn report_json_uses_wire_shape() {
        let story = load_story("media_checklist");
        let report = GuidanceEngine::new().check_story(&story, &GuidanceConfig::default());
        let json: Value = serde_json::to_value(&report).unwrap();

        let first = &json["pages"][0]["guidance"][0];
        assert_eq!(first["type"], "guidance");
        assert_eq!(first["elementId"], 123);
        assert_eq!(first["message"], "Image is too small on the page");
        assert_eq!(json["storyId"], "media-checklist");
    }

    #[test]
    fn repeated_checks_agree() {
        let story = load_story("media_checklist");
        let engine = GuidanceEngine::new();
        let config = GuidanceConfig::default();
        let first = engine.check_story(&story, &config);
        let second = engine.check_story(&story, &config);
        assert_eq!(first.pages, second.pages);
    }
}

// ============================================================================
// Configuration changes what fires
// ============================================================================

mod configured_pipeline {
    use super::*;

    #[test]
    fn clean_story_has_no_guidance() {
        let story = load_story("clean_story");
        let report = GuidanceEngine::new().check_story(&story, &GuidanceConfig::default());
        assert!(report.is_clean(), "unexpected guidance: {:?}", report.pages);
    }

    #[test]
    fn stricter_length_limit_flags_clean_story() {
        let story = load_story("clean_story");
        let config = GuidanceConfig::from_yaml_str("media:\n  max_video_length_secs: 30\n").unwrap();
        let report = GuidanceEngine::new().check_story(&story, &config);

        let messages: Vec<_> = report.iter().map(|g| g.message).collect();
        assert_eq!(messages, vec![GuidanceMessage::VideoTooLong]);
    }

    #[test]
    fn single_rule_pipeline() {
        let story = load_story("media_checklist");
        let yaml = format!("pipeline:\n  rules:\n    - name: {VIDEO_ELEMENT_LENGTH}\n");
        let config = GuidanceConfig::from_yaml_str(&yaml).unwrap();
        let report = GuidanceEngine::new().check_story(&story, &config);

        assert_eq!(report.total(), 1);
        assert_eq!(report.pages[0].page_id, "finale");
    }

    #[test]
    fn strict_config_file() {
        let path = fixtures_dir().join("configs/strict.yaml");
        let config = GuidanceConfig::load_from_file(path.to_str().unwrap()).unwrap();
        assert!(!config.rule_enabled("MediaElementResolution"));
        assert!(!config.rule_enabled("ImageElementResolution"));

        let story = load_story("media_checklist");
        let report = GuidanceEngine::new().check_story(&story, &config);
        assert_eq!(
            report.messages(),
            vec![
                GuidanceMessage::ImageTooSmallOnPage,
                GuidanceMessage::VideoTooSmallOnPage,
                GuidanceMessage::VideoTooLong,
            ]
        );
    }
}

// ============================================================================
// Input boundary
// ============================================================================

mod input_boundary {
    use super::*;

    #[test]
    fn duplicate_element_ids_are_rejected() {
        let err = Story::from_json_str(&load_fixture("invalid/duplicate_ids.json")).unwrap_err();
        match err {
            StoryError::DuplicateElementId { page_id, element_id } => {
                assert_eq!(page_id, "p1");
                assert_eq!(element_id, "7");
            }
            other => panic!("expected duplicate id error, got {other}"),
        }
    }

    #[test]
    fn malformed_documents_are_rejected() {
        let err = Story::from_json_str(&load_fixture("invalid/not_a_story.json")).unwrap_err();
        assert!(matches!(err, StoryError::Json(_)));
    }

    #[test]
    fn missing_resolution_side_does_not_block_other_rules() {
        let story = Story::from_json_str(&load_fixture("partial/partial_resource.json")).unwrap();
        let report = GuidanceEngine::new().check_story(&story, &GuidanceConfig::default());
        assert_eq!(report.messages(), vec![GuidanceMessage::VideoTooLong]);
    }

    #[test]
    fn quality_tiers_are_preserved() {
        let story = load_story("media_checklist");
        let video = &story.pages[2].elements[1];
        let resource = video.resource.as_ref().unwrap();
        assert_eq!(resource.sizes["medium"].width, Some(540.0));
        assert_eq!(resource.frame_rate, Some(30.0));
    }
}
