//! The segment store: immutable snapshots of a book's narrative state.
//!
//! Every mutation validates first and returns a fresh snapshot; the
//! snapshot it was called on is never touched, so a rejected operation
//! leaves the caller's state exactly as it was.

use derive_getters::Getters;
use std::collections::HashSet;
use storyloom_core::{
    Book, Chapter, ChapterId, SegmentId, SegmentSummary, StorySegment, SummaryId,
};
use storyloom_error::{StoryloomResult, ValidationError, ValidationErrorKind};
use tracing::debug;

/// A single annotation applied to one segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Annotation {
    /// Check or uncheck the segment for the next summarization batch
    QueueForSummary(bool),
    /// Keep the segment out of (or put it back into) the story so far
    Exclude(bool),
    /// Point the segment at an existing summary
    Summary(SummaryId),
    /// Assign the segment to an existing chapter
    Chapter(ChapterId),
}

fn reject<T>(kind: ValidationErrorKind) -> StoryloomResult<T> {
    Err(ValidationError::new(kind).into())
}

/// Ordered segments with their summaries and chapters.
///
/// # Examples
///
/// ```
/// use storyloom_core::StorySegment;
/// use storyloom_narrative::SegmentStore;
///
/// let empty = SegmentStore::new();
/// let store = empty
///     .append(StorySegment::user("go north"))?
///     .append(StorySegment::assistant("You head north into the woods."))?;
///
/// assert_eq!(store.len(), 2);
/// assert!(empty.is_empty());
/// # Ok::<(), storyloom_error::StoryloomError>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq, Getters)]
pub struct SegmentStore {
    /// Segments in creation order
    segments: Vec<StorySegment>,
    /// Summaries referenced by segments
    summaries: Vec<SegmentSummary>,
    /// Closed chapters, oldest first
    chapters: Vec<Chapter>,
}

impl SegmentStore {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from raw parts without checking invariants.
    ///
    /// Persisted documents are external data; call [`SegmentStore::validate`]
    /// to find out whether they hold together.
    pub fn from_parts(
        segments: Vec<StorySegment>,
        summaries: Vec<SegmentSummary>,
        chapters: Vec<Chapter>,
    ) -> Self {
        Self {
            segments,
            summaries,
            chapters,
        }
    }

    /// Snapshot of a book's narrative state.
    pub fn from_book(book: &Book) -> Self {
        Self::from_parts(
            book.story_segments().clone(),
            book.segment_summaries().clone(),
            book.chapters().clone(),
        )
    }

    /// Copy of `book` carrying this snapshot's narrative state.
    pub fn apply_to(&self, book: &Book) -> Book {
        book.with_story(
            self.segments.clone(),
            self.summaries.clone(),
            self.chapters.clone(),
        )
    }

    /// Number of segments.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// True when the store holds no segments.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Look up a segment by id.
    pub fn segment(&self, id: &SegmentId) -> Option<&StorySegment> {
        self.segments.iter().find(|s| s.id() == id)
    }

    /// Position of a segment in creation order.
    pub fn position(&self, id: &SegmentId) -> Option<usize> {
        self.segments.iter().position(|s| s.id() == id)
    }

    /// The most recently added segment.
    pub fn last(&self) -> Option<&StorySegment> {
        self.segments.last()
    }

    /// Look up a summary by id.
    pub fn summary(&self, id: &SummaryId) -> Option<&SegmentSummary> {
        self.summaries.iter().find(|s| s.id() == id)
    }

    /// Look up a chapter by id.
    pub fn chapter(&self, id: &ChapterId) -> Option<&Chapter> {
        self.chapters.iter().find(|c| c.id() == id)
    }

    /// Story day of the latest segment, or 0 for an empty store.
    pub fn current_day(&self) -> u32 {
        self.segments.last().map(|s| *s.day()).unwrap_or_default()
    }

    /// Segments checked for the next summarization batch, in order.
    pub fn queued_for_summary(&self) -> Vec<&StorySegment> {
        self.segments.iter().filter(|s| *s.to_summarize()).collect()
    }

    /// Split into `(unchaptered, chaptered)` segments, each in order.
    pub fn split_by_chapter(&self) -> (Vec<&StorySegment>, Vec<&StorySegment>) {
        self.segments.iter().partition(|s| !s.is_chaptered())
    }

    /// Segments belonging to one chapter, in order.
    pub fn chapter_segments(&self, id: &ChapterId) -> Vec<&StorySegment> {
        self.segments
            .iter()
            .filter(|s| s.chapter_id().as_ref() == Some(id))
            .collect()
    }

    fn require_position(&self, id: &SegmentId) -> StoryloomResult<usize> {
        match self.position(id) {
            Some(index) => Ok(index),
            None => reject(ValidationErrorKind::UnknownSegment(id.to_string())),
        }
    }

    /// Append a new segment at the end.
    ///
    /// New segments must carry a fresh id and no summary or chapter
    /// annotation; only assistant segments may arrive already queued for
    /// summarization.
    pub fn append(&self, segment: StorySegment) -> StoryloomResult<Self> {
        let id = segment.id().to_string();
        if self.position(segment.id()).is_some() {
            return reject(ValidationErrorKind::DuplicateSegment(id));
        }
        if segment.is_summarized() || segment.is_chaptered() {
            return reject(ValidationErrorKind::PreAnnotatedSegment(id));
        }
        if *segment.to_summarize() && !segment.is_assistant() {
            return reject(ValidationErrorKind::NotAssistant(id));
        }

        debug!(segment_id = %id, role = %segment.role(), "Appending segment");
        let mut next = self.clone();
        next.segments.push(segment);
        Ok(next)
    }

    /// Apply one annotation to one segment.
    pub fn annotate(&self, id: &SegmentId, annotation: Annotation) -> StoryloomResult<Self> {
        let index = self.require_position(id)?;
        let current = &self.segments[index];
        let name = id.to_string();

        let updated = match annotation {
            Annotation::QueueForSummary(false) => current.clone().with_to_summarize(false),
            Annotation::QueueForSummary(true) => {
                if !current.is_assistant() {
                    return reject(ValidationErrorKind::NotAssistant(name));
                }
                if current.is_summarized() {
                    return reject(ValidationErrorKind::AlreadySummarized(name));
                }
                if current.is_chaptered() {
                    return reject(ValidationErrorKind::AlreadyChaptered(name));
                }
                current.clone().with_to_summarize(true)
            }
            Annotation::Exclude(excluded) => current.clone().with_excluded(excluded),
            Annotation::Summary(summary_id) => {
                if !current.is_assistant() {
                    return reject(ValidationErrorKind::NotAssistant(name));
                }
                if current.is_summarized() {
                    return reject(ValidationErrorKind::AlreadySummarized(name));
                }
                if self.summary(&summary_id).is_none() {
                    return reject(ValidationErrorKind::UnknownSummary(summary_id.to_string()));
                }
                current.clone().with_summary(summary_id)
            }
            Annotation::Chapter(chapter_id) => {
                if current.is_chaptered() {
                    return reject(ValidationErrorKind::AlreadyChaptered(name));
                }
                if self.chapter(&chapter_id).is_none() {
                    return reject(ValidationErrorKind::UnknownChapter(chapter_id.to_string()));
                }
                if self.segments[..index].iter().any(|s| !s.is_chaptered()) {
                    return reject(ValidationErrorKind::ChapterGap(name));
                }
                current.clone().with_chapter(chapter_id)
            }
        };

        debug!(segment_id = %id, "Annotated segment");
        let mut next = self.clone();
        next.segments[index] = updated;
        Ok(next)
    }

    /// Replace a segment's text. Annotations are kept.
    pub fn replace_content(
        &self,
        id: &SegmentId,
        content: impl Into<String>,
        incomplete: bool,
    ) -> StoryloomResult<Self> {
        let index = self.require_position(id)?;
        let mut next = self.clone();
        next.segments[index] = self.segments[index]
            .clone()
            .with_content(content)
            .with_incomplete(incomplete);
        debug!(segment_id = %id, "Replaced segment content");
        Ok(next)
    }

    /// Delete a segment.
    ///
    /// Summarized or chaptered segments are refused so that no summary or
    /// chapter loses part of the span it covers.
    pub fn remove(&self, id: &SegmentId) -> StoryloomResult<Self> {
        let index = self.require_position(id)?;
        let segment = &self.segments[index];
        if segment.is_summarized() || segment.is_chaptered() {
            return reject(ValidationErrorKind::SegmentLocked(id.to_string()));
        }
        let mut next = self.clone();
        next.segments.remove(index);
        debug!(segment_id = %id, "Removed segment");
        Ok(next)
    }

    /// Add a summary and point every listed segment at it.
    ///
    /// All-or-nothing: any segment failing the summary annotation rules
    /// rejects the whole batch.
    pub fn apply_summary(
        &self,
        summary: SegmentSummary,
        segment_ids: &[SegmentId],
    ) -> StoryloomResult<Self> {
        if segment_ids.is_empty() {
            return reject(ValidationErrorKind::EmptySelection);
        }
        if self.summary(summary.id()).is_some() {
            return reject(ValidationErrorKind::DuplicateSegment(summary.id().to_string()));
        }

        let summary_id = summary.id().clone();
        let mut next = self.clone();
        next.summaries.push(summary);
        for id in segment_ids {
            next = next.annotate(id, Annotation::Summary(summary_id.clone()))?;
        }
        debug!(summary_id = %summary_id, covered = segment_ids.len(), "Applied summary");
        Ok(next)
    }

    /// Add a chapter and assign every unchaptered segment up to and
    /// including `through` to it.
    pub fn apply_chapter(&self, chapter: Chapter, through: &SegmentId) -> StoryloomResult<Self> {
        let end = self.require_position(through)?;
        if self.segments[end].is_chaptered() {
            return reject(ValidationErrorKind::AlreadyChaptered(through.to_string()));
        }
        if self.chapter(chapter.id()).is_some() {
            return reject(ValidationErrorKind::DuplicateSegment(chapter.id().to_string()));
        }

        let chapter_id = chapter.id().clone();
        let mut next = self.clone();
        next.chapters.push(chapter);
        let ids: Vec<SegmentId> = self.segments[..=end]
            .iter()
            .filter(|s| !s.is_chaptered())
            .map(|s| s.id().clone())
            .collect();
        for id in &ids {
            next = next.annotate(id, Annotation::Chapter(chapter_id.clone()))?;
        }
        debug!(chapter_id = %chapter_id, covered = ids.len(), "Applied chapter");
        Ok(next)
    }

    /// Check every structural invariant.
    ///
    /// Missing summary or chapter records are not reported here; they are
    /// integrity anomalies (see [`SegmentStore::integrity_issues`]).
    pub fn validate(&self) -> StoryloomResult<()> {
        let mut seen = HashSet::new();
        let mut open_chapter_seen = false;

        for segment in &self.segments {
            let id = segment.id().to_string();
            if !seen.insert(segment.id()) {
                return reject(ValidationErrorKind::DuplicateSegment(id));
            }
            if (segment.is_summarized() || *segment.to_summarize()) && !segment.is_assistant() {
                return reject(ValidationErrorKind::NotAssistant(id));
            }
            if segment.is_summarized() && *segment.to_summarize() {
                return reject(ValidationErrorKind::AlreadySummarized(id));
            }
            if segment.is_chaptered() {
                if open_chapter_seen {
                    return reject(ValidationErrorKind::ChapterGap(id));
                }
            } else {
                open_chapter_seen = true;
            }
        }
        Ok(())
    }

    /// Dangling references that degrade output without blocking it.
    pub fn integrity_issues(&self) -> Vec<String> {
        let mut issues = Vec::new();
        for segment in &self.segments {
            if let Some(summary_id) = segment.segment_summary_id() {
                if self.summary(summary_id).is_none() {
                    issues.push(format!(
                        "Segment '{}' references missing summary '{}'",
                        segment.id(),
                        summary_id
                    ));
                }
            }
            if let Some(chapter_id) = segment.chapter_id() {
                if self.chapter(chapter_id).is_none() {
                    issues.push(format!(
                        "Segment '{}' references missing chapter '{}'",
                        segment.id(),
                        chapter_id
                    ));
                }
            }
        }
        issues
    }
}
