//! Story engine for storyloom.
//!
//! This crate owns the narrative state of a book and every transition on it:
//! appending turns, assembling the "story so far" handed to the model,
//! collapsing old turns into summaries, closing chapters, redoing the last
//! reply, and exporting the whole story as Markdown.
//!
//! # Features
//!
//! - **Segment store**: immutable, validated story state with id-stable segments
//! - **Context assembly**: deterministic story text with summaries substituted
//! - **Summarization and chapters**: bounded context growth for long stories
//! - **Streaming narration**: bounded, cancellable replies with visible failures
//! - **Repositories**: versioned in-memory and JSON-file book persistence
//!
//! # Example
//!
//! ```rust,ignore
//! use storyloom_config::StoryloomConfig;
//! use storyloom_narrative::{Narrator, NarratorConfig, SegmentStore};
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example(driver: impl storyloom_interface::Streaming, template: storyloom_core::Template)
//! #     -> Result<(), Box<dyn std::error::Error>> {
//! let config = NarratorConfig::from_config(&StoryloomConfig::load()?)?;
//! let narrator = Narrator::new(driver, config);
//!
//! let outcome = narrator
//!     .narrate(&SegmentStore::new(), &template, "go north", &CancellationToken::new(), None)
//!     .await?;
//! println!("{}", outcome.state());
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod chapter;
mod cleanup;
mod context;
mod enhance;
mod export;
mod file_repository;
mod in_memory_repository;
mod narration;
pub mod prompt;
mod settings;
mod store;
mod stream;
mod summarize;

pub use chapter::{ChapterDraft, ChapterRenderer, ChapterWrapper};
pub use cleanup::{ResponseCleaner, NO_CONTENT_MARKER};
pub use context::{ContextAssembler, Inclusion};
pub use enhance::{EnhancementDraft, Enhancer};
pub use export::{export_filename, Exporter, StoryExport};
pub use file_repository::{FileBookRepository, FileTemplateRepository};
pub use in_memory_repository::{InMemoryBookRepository, InMemoryTemplateRepository};
pub use narration::{CycleState, NarrationEvent, NarrationOutcome, Narrator};
pub use settings::NarratorConfig;
pub use store::{Annotation, SegmentStore};
pub use stream::{collect_stream, StreamOutcome, StreamPolicy};
pub use summarize::{SummarizationDraft, Summarizer};
