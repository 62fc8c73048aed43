//! The narration cycle: one writer turn followed by one streamed reply.

use crate::{collect_stream, prompt, NarratorConfig, SegmentStore};
use derive_getters::Getters;
use storyloom_core::{CompletionRequest, Role, SegmentId, StorySegment, Template};
use storyloom_error::{GenerationErrorKind, StoryloomResult, ValidationError, ValidationErrorKind};
use storyloom_interface::Streaming;
use tokio::sync::mpsc::UnboundedSender;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, instrument};

/// Where a narration cycle is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
pub enum CycleState {
    /// Nothing in progress
    #[display("idle")]
    Idle,
    /// Writer input received
    #[display("awaiting-user-input")]
    AwaitingUserInput,
    /// Prompt composed from the story so far
    #[display("context-assembled")]
    ContextAssembled,
    /// Reply arriving chunk by chunk
    #[display("streaming-assistant-reply")]
    StreamingAssistantReply,
    /// Reply complete
    #[display("finalized")]
    Finalized,
    /// Reply stopped early; partial text kept
    #[display("failed")]
    Failed,
}

/// Progress notifications emitted while a cycle runs.
#[derive(Debug, Clone, PartialEq)]
pub enum NarrationEvent {
    /// The cycle moved to a new state
    State(CycleState),
    /// The assistant placeholder grew; carries the full text so far
    Text {
        /// Placeholder segment
        segment_id: SegmentId,
        /// Accumulated reply text
        text: String,
    },
}

/// Result of one narration cycle.
#[derive(Debug, Clone, PartialEq, Getters)]
pub struct NarrationOutcome {
    /// Store with the new user and assistant segments
    store: SegmentStore,
    /// `Finalized` or `Failed`
    state: CycleState,
    /// Request sent to the completion backend
    request: CompletionRequest,
    /// New user segment
    user_segment_id: SegmentId,
    /// New assistant segment
    assistant_segment_id: SegmentId,
    /// Why the reply stopped early, if it did
    failure: Option<GenerationErrorKind>,
    /// The store differs from the last saved book
    dirty: bool,
}

fn notify(events: Option<&UnboundedSender<NarrationEvent>>, event: NarrationEvent) {
    if let Some(tx) = events {
        // The receiver going away means nobody is watching; the cycle goes on.
        let _ = tx.send(event);
    }
}

/// Runs narration cycles against a streaming backend.
///
/// # Example
///
/// ```rust,ignore
/// use storyloom_narrative::{Narrator, NarratorConfig, SegmentStore};
/// use tokio_util::sync::CancellationToken;
///
/// let narrator = Narrator::new(driver, NarratorConfig::from_config(&config)?);
/// let outcome = narrator
///     .narrate(&SegmentStore::new(), &template, "go north", &CancellationToken::new(), None)
///     .await?;
/// println!("{}", outcome.store().last().map(|s| s.content().as_str()).unwrap_or(""));
/// ```
pub struct Narrator<D: Streaming> {
    driver: D,
    config: NarratorConfig,
}

impl<D: Streaming> Narrator<D> {
    /// Create a narrator over `driver`.
    pub fn new(driver: D, config: NarratorConfig) -> Self {
        Self { driver, config }
    }

    /// Settings in use.
    pub fn config(&self) -> &NarratorConfig {
        &self.config
    }

    /// Compose the narration request for `input`, seeing the story only up
    /// to (not including) `until`.
    pub fn compose(
        &self,
        store: &SegmentStore,
        template: &Template,
        input: &str,
        until: Option<&SegmentId>,
    ) -> StoryloomResult<CompletionRequest> {
        let template = template.resolved(self.config.prompt_defaults());
        let story = self.config.assembler().story_so_far(store, until)?;
        Ok(prompt::narration_request(&template, store.chapters(), &story, input))
    }

    /// Run one cycle: append the writer's input, stream the reply into a new
    /// assistant segment, and return the resulting store.
    ///
    /// Generation failures do not fail the call; they end the cycle in
    /// [`CycleState::Failed`] with the partial reply kept and marked
    /// incomplete.
    #[instrument(skip_all, fields(segments = store.len(), input_len = input.len()))]
    pub async fn narrate(
        &self,
        store: &SegmentStore,
        template: &Template,
        input: &str,
        cancel: &CancellationToken,
        events: Option<&UnboundedSender<NarrationEvent>>,
    ) -> StoryloomResult<NarrationOutcome> {
        let request = self.compose(store, template, input, None)?;
        self.run_cycle(store, input, request, cancel, events).await
    }

    /// Discard the trailing exchange and narrate the same input again.
    ///
    /// Only allowed when the store ends with a user segment followed by an
    /// assistant segment. The replay sees exactly the context the discarded
    /// reply saw.
    #[instrument(skip_all, fields(segments = store.len()))]
    pub async fn redo(
        &self,
        store: &SegmentStore,
        template: &Template,
        cancel: &CancellationToken,
        events: Option<&UnboundedSender<NarrationEvent>>,
    ) -> StoryloomResult<NarrationOutcome> {
        let (user, assistant) = redo_target(store)?;
        let input = user.content().clone();
        let trimmed = store.remove(assistant.id())?.remove(user.id())?;
        let request = self.compose(store, template, &input, Some(user.id()))?;
        info!(user_segment_id = %user.id(), "Redoing last exchange");
        self.run_cycle(&trimmed, &input, request, cancel, events).await
    }

    async fn run_cycle(
        &self,
        store: &SegmentStore,
        input: &str,
        request: CompletionRequest,
        cancel: &CancellationToken,
        events: Option<&UnboundedSender<NarrationEvent>>,
    ) -> StoryloomResult<NarrationOutcome> {
        let day = store.current_day();
        let user = StorySegment::user(input).with_day(day);
        let user_segment_id = user.id().clone();
        let store = store.append(user)?;
        notify(events, NarrationEvent::State(CycleState::AwaitingUserInput));
        notify(events, NarrationEvent::State(CycleState::ContextAssembled));

        let placeholder = StorySegment::assistant("").with_day(day);
        let assistant_segment_id = placeholder.id().clone();
        let store = store.append(placeholder)?;
        notify(events, NarrationEvent::State(CycleState::StreamingAssistantReply));

        let outcome = collect_stream(
            &self.driver,
            &request,
            *self.config.policy(),
            cancel,
            |text| {
                notify(
                    events,
                    NarrationEvent::Text {
                        segment_id: assistant_segment_id.clone(),
                        text: text.to_string(),
                    },
                )
            },
        )
        .await;

        let content = outcome.render(self.config.cleaner());
        let store = store.replace_content(&assistant_segment_id, content, !outcome.is_complete())?;
        let state = match outcome.failure() {
            None => CycleState::Finalized,
            Some(kind) => {
                error!(segment_id = %assistant_segment_id, error = %kind, "Narration failed");
                CycleState::Failed
            }
        };
        notify(events, NarrationEvent::State(state));
        info!(segment_id = %assistant_segment_id, state = %state, "Narration cycle finished");

        Ok(NarrationOutcome {
            store,
            state,
            request,
            user_segment_id,
            assistant_segment_id,
            failure: outcome.failure().cloned(),
            dirty: true,
        })
    }
}

fn invalid_redo<T>(detail: &str) -> StoryloomResult<T> {
    Err(ValidationError::new(ValidationErrorKind::InvalidRedo(detail.to_string())).into())
}

/// The `(user, assistant)` pair a redo would replace.
fn redo_target(store: &SegmentStore) -> StoryloomResult<(&StorySegment, &StorySegment)> {
    match store.segments().as_slice() {
        [.., user, assistant] => {
            if *assistant.role() != Role::Assistant {
                invalid_redo("the last segment is not an assistant reply")
            } else if *user.role() != Role::User {
                invalid_redo("the reply is not preceded by a user segment")
            } else {
                Ok((user, assistant))
            }
        }
        _ => invalid_redo("the story has no complete exchange"),
    }
}
