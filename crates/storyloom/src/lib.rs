//! Storyloom - collaborative fiction on top of a text-completion model.
//!
//! Storyloom keeps a book's story as an ordered list of writer and narrator
//! turns and decides, on every turn, exactly what the model gets to see.
//! Older turns collapse into summaries, finished arcs close into chapters,
//! and every save is guarded by an optimistic version check.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use storyloom::{
//!     BookRepository, CancellationToken, InMemoryBookRepository, Narrator, NarratorConfig,
//!     SegmentStore, StoryloomConfig,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let repo = InMemoryBookRepository::new();
//!     let book = repo.create(&storyloom::Book::new("book-1", "noir")).await?;
//!
//!     let narrator = Narrator::new(my_driver(), NarratorConfig::from_config(&StoryloomConfig::load()?)?);
//!     let outcome = narrator
//!         .narrate(&SegmentStore::from_book(&book), &template, "look around", &CancellationToken::new(), None)
//!         .await?;
//!
//!     repo.save(&outcome.store().apply_to(&book)).await?;
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - `storyloom_error` - Error types
//! - `storyloom_core` - Books, segments, summaries, chapters, templates, messages
//! - `storyloom_interface` - Completion driver and repository traits
//! - `storyloom_config` - Layered configuration
//! - `storyloom_narrative` - The story engine
//!
//! This crate (`storyloom`) re-exports everything for convenience.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub use storyloom_config::{
    ContextSettings, PromptDefaults, StoryloomConfig, StreamSettings, SummarySettings,
};
pub use storyloom_core::{
    Book, Chapter, ChapterId, CompletionRequest, CompletionRequestBuilder, CompletionResponse,
    Message, MessageBuilder, PromptConfig, Role, SegmentId, SegmentSummary, StorySegment,
    SummaryId, Template,
};
pub use storyloom_error::{
    ConfigError, ConflictError, GenerationError, GenerationErrorKind, JsonError, StorageError,
    StorageErrorKind, StoryloomError, StoryloomErrorKind, StoryloomResult, ValidationError,
    ValidationErrorKind,
};
pub use storyloom_interface::{
    BookRepository, ChunkStream, CompletionDriver, FinishReason, StreamChunk, Streaming,
    TemplateRepository,
};
pub use storyloom_narrative::{
    collect_stream, export_filename, prompt, Annotation, ChapterDraft, ChapterRenderer,
    ChapterWrapper, ContextAssembler, CycleState, EnhancementDraft, Enhancer, Exporter,
    FileBookRepository, FileTemplateRepository, InMemoryBookRepository,
    InMemoryTemplateRepository, Inclusion, NarrationEvent, NarrationOutcome, Narrator,
    NarratorConfig, ResponseCleaner, SegmentStore, StoryExport, StreamOutcome, StreamPolicy,
    SummarizationDraft, Summarizer, NO_CONTENT_MARKER,
};
pub use tokio_util::sync::CancellationToken;

pub mod telemetry;
