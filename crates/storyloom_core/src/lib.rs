//! Core data types for the storyloom story engine.
//!
//! This crate provides the persisted story model (books, segments, summaries,
//! chapters, templates) and the chat message types exchanged with a
//! completion backend. The types serialize with the field names of the
//! persisted book document, so a stored book round-trips unchanged.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod book;
mod chapter;
mod ids;
mod message;
mod request;
mod role;
mod segment;
mod summary;
mod template;

pub use book::Book;
pub use chapter::Chapter;
pub use ids::{ChapterId, SegmentId, SummaryId};
pub use message::{Message, MessageBuilder};
pub use request::{CompletionRequest, CompletionRequestBuilder, CompletionResponse};
pub use role::Role;
pub use segment::StorySegment;
pub use summary::SegmentSummary;
pub use template::{PromptConfig, Template};
