//! Story segments.

use crate::{ChapterId, Role, SegmentId, SummaryId};
use serde::{Deserialize, Serialize};

fn is_false(value: &bool) -> bool {
    !*value
}

/// One turn in a book's narrative.
///
/// Content and role are fixed by whoever creates the segment; the summary,
/// chapter and exclusion annotations are applied afterwards through the
/// segment store, which enforces that:
/// - only assistant segments are queued for or collapsed into a summary,
/// - a summarized segment is never still queued,
/// - a chapter assignment is never replaced.
///
/// # Examples
///
/// ```
/// use storyloom_core::{Role, StorySegment};
///
/// let seg = StorySegment::assistant("You head north into the woods.");
/// assert_eq!(*seg.role(), Role::Assistant);
/// assert!(!seg.is_summarized());
/// assert!(!seg.is_chaptered());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_getters::Getters)]
#[serde(rename_all = "camelCase")]
pub struct StorySegment {
    /// Unique, creation-ordered identifier
    id: SegmentId,
    /// In-story day the turn belongs to
    #[serde(default)]
    day: u32,
    /// Who produced the turn
    role: Role,
    /// Raw text
    content: String,
    /// Aside that should not feed later narration
    #[serde(default, skip_serializing_if = "is_false")]
    exclude_from_prev_story: bool,
    /// Queued for the next summarization batch
    #[serde(default, skip_serializing_if = "is_false")]
    to_summarize: bool,
    /// Summary now representing this segment
    #[serde(default, skip_serializing_if = "Option::is_none")]
    segment_summary_id: Option<SummaryId>,
    /// Chapter this segment was closed into
    #[serde(default, skip_serializing_if = "Option::is_none")]
    chapter_id: Option<ChapterId>,
    /// Generation stopped before the model finished
    #[serde(default, skip_serializing_if = "is_false")]
    incomplete: bool,
}

impl StorySegment {
    /// Create a fresh segment with a generated id.
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            id: SegmentId::generate(),
            day: 0,
            role,
            content: content.into(),
            exclude_from_prev_story: false,
            to_summarize: false,
            segment_summary_id: None,
            chapter_id: None,
            incomplete: false,
        }
    }

    /// Create a user turn.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    /// Create an assistant turn.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    /// Replace the identifier.
    pub fn with_id(mut self, id: impl Into<SegmentId>) -> Self {
        self.id = id.into();
        self
    }

    /// Set the story day.
    pub fn with_day(mut self, day: u32) -> Self {
        self.day = day;
        self
    }

    /// Replace the content.
    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    /// Set or clear the exclusion flag.
    pub fn with_excluded(mut self, excluded: bool) -> Self {
        self.exclude_from_prev_story = excluded;
        self
    }

    /// Set or clear the summarization queue flag.
    pub fn with_to_summarize(mut self, queued: bool) -> Self {
        self.to_summarize = queued;
        self
    }

    /// Point the segment at a summary and drop it from the queue.
    pub fn with_summary(mut self, summary_id: SummaryId) -> Self {
        self.segment_summary_id = Some(summary_id);
        self.to_summarize = false;
        self
    }

    /// Assign the segment to a chapter.
    pub fn with_chapter(mut self, chapter_id: ChapterId) -> Self {
        self.chapter_id = Some(chapter_id);
        self
    }

    /// Mark whether the content is a partial generation.
    pub fn with_incomplete(mut self, incomplete: bool) -> Self {
        self.incomplete = incomplete;
        self
    }

    /// True for model-generated prose.
    pub fn is_assistant(&self) -> bool {
        self.role == Role::Assistant
    }

    /// True once a summary stands in for this segment.
    pub fn is_summarized(&self) -> bool {
        self.segment_summary_id.is_some()
    }

    /// True once the segment belongs to a chapter.
    pub fn is_chaptered(&self) -> bool {
        self.chapter_id.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summarizing_clears_queue_flag() {
        let seg = StorySegment::assistant("text")
            .with_to_summarize(true)
            .with_summary(SummaryId::from("s-1"));
        assert!(!seg.to_summarize());
        assert!(seg.is_summarized());
    }

    #[test]
    fn deserializes_persisted_document() {
        let json = r#"{
            "id": "1712000000000",
            "day": 2,
            "role": "assistant",
            "content": "The rain kept falling.",
            "toSummarize": true
        }"#;
        let seg: StorySegment = serde_json::from_str(json).unwrap();
        assert_eq!(seg.id().as_str(), "1712000000000");
        assert_eq!(*seg.day(), 2);
        assert!(*seg.to_summarize());
        assert!(!seg.exclude_from_prev_story());
        assert!(seg.segment_summary_id().is_none());
    }

    #[test]
    fn omits_unset_flags_when_serialized() {
        let seg = StorySegment::user("go north").with_id("u-1");
        let json = serde_json::to_value(&seg).unwrap();
        assert!(json.get("toSummarize").is_none());
        assert!(json.get("chapterId").is_none());
        assert_eq!(json["role"], "user");
    }
}
