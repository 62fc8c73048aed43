//! Chapter wrap: close a prefix of the story into a chapter record, and
//! render closed chapters.

use crate::{collect_stream, prompt, Inclusion, NarratorConfig, SegmentStore};
use derive_getters::Getters;
use storyloom_core::{Chapter, ChapterId, PromptConfig, SegmentId, Template};
use storyloom_error::{GenerationErrorKind, StoryloomResult, ValidationError, ValidationErrorKind};
use storyloom_interface::Streaming;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument};

fn reject<T>(kind: ValidationErrorKind) -> StoryloomResult<T> {
    Err(ValidationError::new(kind).into())
}

/// A pending chapter with its editable title, summary and end-state text.
///
/// Commit borrows the draft, so a rejected commit never loses what the
/// writer typed.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct ChapterDraft {
    /// Segments the chapter will cover, in order
    segment_ids: Vec<SegmentId>,
    /// Last covered segment
    through: SegmentId,
    /// Story text handed to the generators
    story: String,
    /// Every assistant segment of the prefix, for review
    preview: String,
    /// Chapter title
    title: String,
    /// Chapter summary text
    summary: String,
    /// End-state text, parsed as JSON on commit
    end_state: String,
    /// Why the last summary generation stopped early
    summary_failure: Option<GenerationErrorKind>,
    /// Why the last end-state generation stopped early
    end_state_failure: Option<GenerationErrorKind>,
}

impl ChapterDraft {
    /// Set the title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Replace the summary text.
    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = summary.into();
        self
    }

    /// Replace the end-state text.
    pub fn with_end_state(mut self, end_state: impl Into<String>) -> Self {
        self.end_state = end_state.into();
        self
    }
}

/// Drives the chapter wrap transition.
pub struct ChapterWrapper<D: Streaming> {
    driver: D,
    config: NarratorConfig,
}

impl<D: Streaming> ChapterWrapper<D> {
    /// Create a chapter wrapper over `driver`.
    pub fn new(driver: D, config: NarratorConfig) -> Self {
        Self { driver, config }
    }

    /// Open a draft covering every unchaptered segment up to and including
    /// `through`.
    pub fn prepare(
        &self,
        store: &SegmentStore,
        through: &SegmentId,
    ) -> StoryloomResult<ChapterDraft> {
        let end = match store.position(through) {
            Some(end) => end,
            None => return reject(ValidationErrorKind::UnknownSegment(through.to_string())),
        };
        if store.segments()[end].is_chaptered() {
            return reject(ValidationErrorKind::AlreadyChaptered(through.to_string()));
        }

        let prefix: Vec<_> = store.segments()[..=end]
            .iter()
            .filter(|s| !s.is_chaptered())
            .collect();
        let assembler = self.config.assembler();
        let story = assembler.assemble(
            prefix.iter().copied(),
            store.summaries(),
            None,
            Inclusion::Live,
        )?;
        let preview = assembler.assemble(
            prefix.iter().copied(),
            store.summaries(),
            None,
            Inclusion::ForceAll,
        )?;

        Ok(ChapterDraft {
            segment_ids: prefix.iter().map(|s| s.id().clone()).collect(),
            through: through.clone(),
            story,
            preview,
            title: String::new(),
            summary: String::new(),
            end_state: String::new(),
            summary_failure: None,
            end_state_failure: None,
        })
    }

    fn prompts(&self, template: &Template) -> PromptConfig {
        template.prompt().merged_with(self.config.prompt_defaults())
    }

    /// Stream a chapter summary into the draft.
    #[instrument(skip_all, fields(segments = draft.segment_ids.len()))]
    pub async fn generate_summary(
        &self,
        draft: ChapterDraft,
        template: &Template,
        cancel: &CancellationToken,
    ) -> ChapterDraft {
        let prompts = self.prompts(template);
        let request = prompt::chapter_request(&draft.story, prompts.summarizer().as_deref());
        let outcome =
            collect_stream(&self.driver, &request, *self.config.policy(), cancel, |_| {}).await;
        ChapterDraft {
            summary: outcome.render(self.config.cleaner()),
            summary_failure: outcome.failure().cloned(),
            ..draft
        }
    }

    /// Stream a structured end state into the draft.
    #[instrument(skip_all, fields(segments = draft.segment_ids.len()))]
    pub async fn generate_end_state(
        &self,
        draft: ChapterDraft,
        template: &Template,
        cancel: &CancellationToken,
    ) -> ChapterDraft {
        let prompts = self.prompts(template);
        let request =
            prompt::chapter_request(&draft.story, prompts.summarizer_end_state().as_deref());
        let outcome =
            collect_stream(&self.driver, &request, *self.config.policy(), cancel, |_| {}).await;
        ChapterDraft {
            end_state: outcome.render(self.config.cleaner()),
            end_state_failure: outcome.failure().cloned(),
            ..draft
        }
    }

    /// Create the chapter and assign it to every covered segment.
    ///
    /// Title, summary and end state must all be non-blank and the end state
    /// must parse as JSON; the prefix must still match the draft.
    #[instrument(skip_all, fields(through = %draft.through))]
    pub fn commit(
        &self,
        store: &SegmentStore,
        draft: &ChapterDraft,
    ) -> StoryloomResult<(SegmentStore, Chapter)> {
        for (field, value) in [
            ("Chapter title", &draft.title),
            ("Chapter summary", &draft.summary),
            ("End state", &draft.end_state),
        ] {
            if value.trim().is_empty() {
                return reject(ValidationErrorKind::BlankField(field.to_string()));
            }
        }
        let end_state: serde_json::Value =
            serde_json::from_str(draft.end_state.trim()).map_err(|e| {
                ValidationError::new(ValidationErrorKind::MalformedEndState(e.to_string()))
            })?;

        let current = self.prepare(store, &draft.through)?;
        if current.segment_ids != draft.segment_ids {
            return reject(ValidationErrorKind::StaleSelection);
        }

        let chapter = Chapter::new(
            ChapterId::generate(),
            draft.title.trim(),
            draft.summary.trim(),
            end_state,
        );
        let next = store.apply_chapter(chapter.clone(), &draft.through)?;
        info!(chapter_id = %chapter.id(), covered = draft.segment_ids.len(), "Committed chapter");
        Ok((next, chapter))
    }
}

/// Renders closed chapters as prose.
#[derive(Debug, Clone)]
pub struct ChapterRenderer {
    divider: String,
}

impl Default for ChapterRenderer {
    fn default() -> Self {
        Self::new("\n\n")
    }
}

impl ChapterRenderer {
    /// Renderer joining segments with `divider`.
    pub fn new(divider: impl Into<String>) -> Self {
        Self {
            divider: divider.into(),
        }
    }

    /// Every assistant segment of one chapter, in order, with its raw text.
    pub fn render(&self, store: &SegmentStore, chapter_id: &ChapterId) -> StoryloomResult<String> {
        if store.chapter(chapter_id).is_none() {
            return reject(ValidationErrorKind::UnknownChapter(chapter_id.to_string()));
        }
        let prose: Vec<&str> = store
            .chapter_segments(chapter_id)
            .into_iter()
            .filter(|s| s.is_assistant())
            .map(|s| s.content().as_str())
            .collect();
        Ok(prose.join(&self.divider))
    }

    /// Every chapter with its rendered prose, oldest first.
    pub fn render_all(&self, store: &SegmentStore) -> StoryloomResult<Vec<(Chapter, String)>> {
        store
            .chapters()
            .iter()
            .map(|chapter| Ok((chapter.clone(), self.render(store, chapter.id())?)))
            .collect()
    }
}
