//! Story-so-far assembly.
//!
//! Rolls the assistant prose preceding a cutoff into one text blob,
//! substituting each summary for the run of segments it covers.

use crate::SegmentStore;
use std::collections::HashSet;
use storyloom_config::ContextSettings;
use storyloom_core::{SegmentId, SegmentSummary, StorySegment};
use storyloom_error::{StoryloomResult, ValidationError, ValidationErrorKind};
use tracing::warn;

/// Which segments take part in assembly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Inclusion {
    /// Live narration: segments flagged as excluded are skipped
    #[default]
    Live,
    /// Previews and exports: every assistant segment takes part
    ForceAll,
}

/// Builds the "story so far" text.
///
/// Assembly is a pure function of its inputs: the same segments, summaries
/// and cutoff always produce the same text.
///
/// # Examples
///
/// ```
/// use storyloom_core::{SegmentSummary, StorySegment, SummaryId};
/// use storyloom_narrative::{ContextAssembler, Inclusion};
///
/// let summary = SegmentSummary::new(SummaryId::from("s1"), "They travelled north.");
/// let segments = vec![
///     StorySegment::user("go north"),
///     StorySegment::assistant("You head north.").with_summary(SummaryId::from("s1")),
///     StorySegment::assistant("Still north.").with_summary(SummaryId::from("s1")),
///     StorySegment::assistant("The woods thicken."),
/// ];
///
/// let text = ContextAssembler::default()
///     .assemble(&segments, &[summary], None, Inclusion::Live)?;
/// assert_eq!(text, "They travelled north.\n\nThe woods thicken.");
/// # Ok::<(), storyloom_error::StoryloomError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextAssembler {
    divider: String,
}

impl Default for ContextAssembler {
    fn default() -> Self {
        Self::new("\n\n")
    }
}

impl ContextAssembler {
    /// Assembler joining pieces with `divider`.
    pub fn new(divider: impl Into<String>) -> Self {
        Self {
            divider: divider.into(),
        }
    }

    /// Assembler for live narration.
    pub fn from_settings(settings: &ContextSettings) -> Self {
        Self::new(settings.divider.clone())
    }

    /// Assembler for exported documents.
    pub fn for_export(settings: &ContextSettings) -> Self {
        Self::new(settings.export_divider.clone())
    }

    /// The divider placed between pieces.
    pub fn divider(&self) -> &str {
        &self.divider
    }

    /// Assemble the text for `segments`, stopping before `until`.
    ///
    /// An `until` id that is not among `segments` is rejected rather than
    /// producing a silently empty context. A segment pointing at a summary
    /// that does not exist yields a visible placeholder.
    pub fn assemble<'a, I>(
        &self,
        segments: I,
        summaries: &[SegmentSummary],
        until: Option<&SegmentId>,
        inclusion: Inclusion,
    ) -> StoryloomResult<String>
    where
        I: IntoIterator<Item = &'a StorySegment>,
    {
        let segments: Vec<&StorySegment> = segments.into_iter().collect();
        let limit = match until {
            Some(id) => segments.iter().position(|s| s.id() == id).ok_or_else(|| {
                ValidationError::new(ValidationErrorKind::UnknownSegment(id.to_string()))
            })?,
            None => segments.len(),
        };

        let mut pieces: Vec<String> = Vec::new();
        let mut emitted = HashSet::new();

        for segment in segments[..limit].iter().filter(|s| {
            s.is_assistant() && (inclusion == Inclusion::ForceAll || !*s.exclude_from_prev_story())
        }) {
            let Some(summary_id) = segment.segment_summary_id() else {
                pieces.push(segment.content().clone());
                continue;
            };
            if !emitted.insert(summary_id) {
                continue;
            }
            match summaries.iter().find(|s| s.id() == summary_id) {
                Some(summary) => pieces.push(summary.content().clone()),
                None => {
                    warn!(
                        segment_id = %segment.id(),
                        summary_id = %summary_id,
                        "Segment references a missing summary"
                    );
                    pieces.push(format!("[Missing summary with id {}]", summary_id));
                }
            }
        }

        Ok(pieces.join(&self.divider))
    }

    /// Story so far for live narration: unchaptered segments only.
    ///
    /// `until` is looked up across the whole story, so a chaptered cutoff is
    /// valid and leaves nothing unchaptered before it.
    pub fn story_so_far(
        &self,
        store: &SegmentStore,
        until: Option<&SegmentId>,
    ) -> StoryloomResult<String> {
        let limit = match until {
            Some(id) => store.position(id).ok_or_else(|| {
                ValidationError::new(ValidationErrorKind::UnknownSegment(id.to_string()))
            })?,
            None => store.len(),
        };
        let unchaptered = store.segments()[..limit]
            .iter()
            .filter(|s| !s.is_chaptered());
        self.assemble(unchaptered, store.summaries(), None, Inclusion::Live)
    }
}
