//! Summarization: collapse a contiguous run of assistant segments into one
//! summary record.

use crate::{collect_stream, prompt, NarratorConfig, SegmentStore, StreamOutcome};
use derive_getters::Getters;
use storyloom_core::{CompletionRequest, SegmentId, SegmentSummary, SummaryId};
use storyloom_error::{GenerationErrorKind, StoryloomResult, ValidationError, ValidationErrorKind};
use storyloom_interface::Streaming;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument};

/// A prepared summarization batch with its editable text buffer.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct SummarizationDraft {
    /// Segments the summary will cover, in order
    segment_ids: Vec<SegmentId>,
    /// Raw text of those segments
    source: Vec<String>,
    /// Target paragraph count
    paragraphs: usize,
    /// Generated or hand-edited summary text
    buffer: String,
    /// Why the last generation stopped early
    failure: Option<GenerationErrorKind>,
}

impl SummarizationDraft {
    /// Change the paragraph target.
    pub fn with_paragraphs(mut self, paragraphs: usize) -> StoryloomResult<Self> {
        if paragraphs == 0 {
            return Err(ValidationError::new(ValidationErrorKind::ZeroParagraphs).into());
        }
        self.paragraphs = paragraphs;
        Ok(self)
    }

    /// Replace the buffer with hand-edited text.
    pub fn edited(mut self, text: impl Into<String>) -> Self {
        self.buffer = text.into();
        self
    }
}

/// Drives the summarization transition.
///
/// Preparation checks the selection, generation streams a draft into the
/// buffer, and commit records one [`SegmentSummary`] for the whole batch.
pub struct Summarizer<D: Streaming> {
    driver: D,
    config: NarratorConfig,
}

impl<D: Streaming> Summarizer<D> {
    /// Create a summarizer over `driver`.
    pub fn new(driver: D, config: NarratorConfig) -> Self {
        Self { driver, config }
    }

    /// Validate the queued selection and open a draft.
    ///
    /// The queued segments must be contiguous among assistant segments: no
    /// unqueued assistant segment may sit between the first and the last
    /// queued one.
    pub fn prepare(&self, store: &SegmentStore) -> StoryloomResult<SummarizationDraft> {
        let assistants: Vec<_> = store.segments().iter().filter(|s| s.is_assistant()).collect();
        let queued: Vec<usize> = assistants
            .iter()
            .enumerate()
            .filter(|(_, s)| *s.to_summarize())
            .map(|(i, _)| i)
            .collect();

        let (Some(&first), Some(&last)) = (queued.first(), queued.last()) else {
            return Err(ValidationError::new(ValidationErrorKind::EmptySelection).into());
        };
        if let Some(gap) = assistants[first..=last].iter().find(|s| !*s.to_summarize()) {
            return Err(ValidationError::new(ValidationErrorKind::NonContiguousSelection(
                gap.id().to_string(),
            ))
            .into());
        }

        let batch = &assistants[first..=last];
        Ok(SummarizationDraft {
            segment_ids: batch.iter().map(|s| s.id().clone()).collect(),
            source: batch.iter().map(|s| s.content().clone()).collect(),
            paragraphs: batch.len(),
            buffer: String::new(),
            failure: None,
        })
    }

    /// The request a draft would send.
    pub fn request(&self, draft: &SummarizationDraft) -> CompletionRequest {
        let contents: Vec<&str> = draft.source.iter().map(String::as_str).collect();
        prompt::summarization_request(
            self.config.summary().instruction_for(draft.paragraphs),
            &contents,
        )
    }

    /// Stream a fresh summary into the draft's buffer.
    #[instrument(
        skip_all,
        fields(segments = draft.segment_ids.len(), paragraphs = draft.paragraphs)
    )]
    pub async fn generate(
        &self,
        draft: SummarizationDraft,
        cancel: &CancellationToken,
    ) -> SummarizationDraft {
        let request = self.request(&draft);
        let outcome: StreamOutcome =
            collect_stream(&self.driver, &request, *self.config.policy(), cancel, |_| {}).await;
        SummarizationDraft {
            buffer: outcome.render(self.config.cleaner()),
            failure: outcome.failure().cloned(),
            ..draft
        }
    }

    /// Record the summary and annotate every covered segment.
    ///
    /// Rejected without touching `store` when the buffer is blank or the
    /// queued selection changed since the draft was prepared.
    #[instrument(skip_all, fields(segments = draft.segment_ids.len()))]
    pub fn commit(
        &self,
        store: &SegmentStore,
        draft: &SummarizationDraft,
    ) -> StoryloomResult<(SegmentStore, SegmentSummary)> {
        if draft.buffer.trim().is_empty() {
            return Err(
                ValidationError::new(ValidationErrorKind::BlankField("Summary".to_string())).into(),
            );
        }
        let current = self.prepare(store)?;
        if current.segment_ids != draft.segment_ids {
            return Err(ValidationError::new(ValidationErrorKind::StaleSelection).into());
        }

        let summary = SegmentSummary::new(SummaryId::generate(), draft.buffer.trim());
        let next = store.apply_summary(summary.clone(), &draft.segment_ids)?;
        info!(summary_id = %summary.id(), "Committed segment summary");
        Ok((next, summary))
    }
}
