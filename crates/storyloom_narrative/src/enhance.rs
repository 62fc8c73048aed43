//! Segment enhancement: rewrite one segment according to an instruction.

use crate::{collect_stream, prompt, NarratorConfig, SegmentStore};
use derive_getters::Getters;
use storyloom_core::{CompletionRequest, SegmentId};
use storyloom_error::{GenerationErrorKind, StoryloomResult, ValidationError, ValidationErrorKind};
use storyloom_interface::Streaming;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};

/// A proposed rewrite awaiting the writer's approval.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct EnhancementDraft {
    /// Segment being rewritten
    segment_id: SegmentId,
    /// Instruction given to the model
    instruction: String,
    /// Generated or hand-edited replacement text
    result: String,
    /// Why generation stopped early, if it did
    failure: Option<GenerationErrorKind>,
}

impl EnhancementDraft {
    /// Replace the proposed text with a hand-edited version.
    pub fn edited(mut self, text: impl Into<String>) -> Self {
        self.result = text.into();
        self
    }

    /// Write the proposed text into the segment.
    pub fn apply(&self, store: &SegmentStore) -> StoryloomResult<SegmentStore> {
        if self.result.trim().is_empty() {
            return Err(ValidationError::new(ValidationErrorKind::BlankField(
                "Enhanced content".to_string(),
            ))
            .into());
        }
        store.replace_content(&self.segment_id, self.result.trim(), false)
    }
}

/// Rewrites single segments through the completion backend.
pub struct Enhancer<D: Streaming> {
    driver: D,
    config: NarratorConfig,
}

impl<D: Streaming> Enhancer<D> {
    /// Create an enhancer over `driver`.
    pub fn new(driver: D, config: NarratorConfig) -> Self {
        Self { driver, config }
    }

    /// The request rewriting `segment_id`, optionally preceded by the story
    /// before it.
    pub fn request(
        &self,
        store: &SegmentStore,
        segment_id: &SegmentId,
        instruction: &str,
        include_previous_story: bool,
    ) -> StoryloomResult<CompletionRequest> {
        let segment = store.segment(segment_id).ok_or_else(|| {
            ValidationError::new(ValidationErrorKind::UnknownSegment(segment_id.to_string()))
        })?;
        let previous = if include_previous_story {
            Some(self.config.assembler().assemble(
                store.segments(),
                store.summaries(),
                Some(segment_id),
                crate::Inclusion::Live,
            )?)
        } else {
            None
        };
        Ok(prompt::enhancement_request(
            previous.as_deref(),
            segment.content(),
            instruction,
        ))
    }

    /// Stream a rewrite of one segment.
    #[instrument(
        skip_all,
        fields(segment_id = %segment_id, include_previous_story = include_previous_story)
    )]
    pub async fn enhance(
        &self,
        store: &SegmentStore,
        segment_id: &SegmentId,
        instruction: &str,
        include_previous_story: bool,
        cancel: &CancellationToken,
    ) -> StoryloomResult<EnhancementDraft> {
        let request = self.request(store, segment_id, instruction, include_previous_story)?;
        let outcome =
            collect_stream(&self.driver, &request, *self.config.policy(), cancel, |_| {}).await;
        debug!(complete = outcome.is_complete(), "Enhancement generated");
        Ok(EnhancementDraft {
            segment_id: segment_id.clone(),
            instruction: instruction.trim().to_string(),
            result: outcome.render(self.config.cleaner()),
            failure: outcome.failure().cloned(),
        })
    }
}
