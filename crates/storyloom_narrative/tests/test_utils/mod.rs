//! Test utilities for storyloom narrative tests.
//!
//! This module provides a mock streaming driver and story fixtures.

use storyloom_config::StoryloomConfig;
use storyloom_core::{PromptConfig, SegmentId, StorySegment, Template};
use storyloom_narrative::{NarratorConfig, SegmentStore};

pub mod mock_driver;

#[allow(unused_imports)]
pub use mock_driver::{MockBehavior, MockStreamingDriver};

/// Narrator settings from the bundled configuration.
#[allow(dead_code)]
pub fn test_config() -> NarratorConfig {
    NarratorConfig::from_config(&StoryloomConfig::default()).expect("bundled config is valid")
}

/// A template with fixed prompts so request text is predictable.
#[allow(dead_code)]
pub fn test_template() -> Template {
    Template::new(
        Some("t-1".to_string()),
        "Test",
        PromptConfig::new(
            Some("Continue the story.".to_string()),
            Some("WRITER INPUT".to_string()),
            Some("Summarize the chapter.".to_string()),
            Some("Describe the end state as JSON.".to_string()),
        ),
        "A quiet village.",
    )
}

/// A store of alternating user/assistant turns with ids `u{n}` and `a{n}`.
#[allow(dead_code)]
pub fn exchange_store(turns: &[(&str, &str)]) -> SegmentStore {
    let mut store = SegmentStore::new();
    for (n, (user, assistant)) in turns.iter().enumerate() {
        store = store
            .append(StorySegment::user(*user).with_id(format!("u{}", n + 1)))
            .expect("fresh user segment")
            .append(StorySegment::assistant(*assistant).with_id(format!("a{}", n + 1)))
            .expect("fresh assistant segment");
    }
    store
}

/// Shorthand for a segment id.
#[allow(dead_code)]
pub fn sid(id: &str) -> SegmentId {
    SegmentId::from(id)
}
