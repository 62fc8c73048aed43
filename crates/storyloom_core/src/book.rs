//! The book aggregate.

use crate::{Chapter, SegmentSummary, StorySegment};
use serde::{Deserialize, Serialize};

/// Aggregate root owning a story's segments, summaries and chapters.
///
/// `version` is the optimistic concurrency counter: a repository accepts a
/// save only when the submitted version equals the stored one, then
/// increments it by exactly one.
///
/// # Examples
///
/// ```
/// use storyloom_core::{Book, StorySegment};
///
/// let book = Book::new("book-1", "template-1");
/// assert_eq!(*book.version(), 0);
///
/// let grown = book.with_story(vec![StorySegment::user("go north")], vec![], vec![]);
/// assert_eq!(grown.story_segments().len(), 1);
/// assert!(book.story_segments().is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, derive_getters::Getters)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    /// Book identifier
    book_id: String,
    /// Template the book was created from
    template_id: String,
    /// Optional display name
    #[serde(default)]
    name: Option<String>,
    /// Ordered story turns
    #[serde(default)]
    story_segments: Vec<StorySegment>,
    /// Summaries referenced by segments
    #[serde(default)]
    segment_summaries: Vec<SegmentSummary>,
    /// Closed chapters, oldest first
    #[serde(default)]
    chapters: Vec<Chapter>,
    /// Optimistic concurrency counter
    #[serde(default)]
    version: u64,
}

impl Book {
    /// Create an empty book.
    pub fn new(book_id: impl Into<String>, template_id: impl Into<String>) -> Self {
        Self {
            book_id: book_id.into(),
            template_id: template_id.into(),
            name: None,
            story_segments: Vec::new(),
            segment_summaries: Vec::new(),
            chapters: Vec::new(),
            version: 0,
        }
    }

    /// Copy of this book with a new display name.
    pub fn renamed(&self, name: Option<String>) -> Self {
        Self {
            name: name.filter(|n| !n.trim().is_empty()),
            ..self.clone()
        }
    }

    /// Copy of this book with its narrative state replaced.
    pub fn with_story(
        &self,
        story_segments: Vec<StorySegment>,
        segment_summaries: Vec<SegmentSummary>,
        chapters: Vec<Chapter>,
    ) -> Self {
        Self {
            book_id: self.book_id.clone(),
            template_id: self.template_id.clone(),
            name: self.name.clone(),
            story_segments,
            segment_summaries,
            chapters,
            version: self.version,
        }
    }

    /// Copy of this book carrying a different version counter.
    pub fn with_version(&self, version: u64) -> Self {
        Self {
            version,
            ..self.clone()
        }
    }
}
