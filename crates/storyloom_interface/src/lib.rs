//! Trait definitions for the storyloom story engine.
//!
//! The story engine talks to two external collaborators: a text completion
//! backend and a versioned document store. This crate defines both
//! boundaries so the engine can be driven by any backend.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod repository;
mod traits;
mod types;

pub use repository::{BookRepository, TemplateRepository};
pub use traits::{ChunkStream, CompletionDriver, Streaming};
pub use types::{FinishReason, StreamChunk};
