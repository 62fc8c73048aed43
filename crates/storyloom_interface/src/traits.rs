//! Trait definitions for completion backends.

use crate::StreamChunk;
use async_trait::async_trait;
use futures_util::stream::Stream;
use std::pin::Pin;
use storyloom_core::{CompletionRequest, CompletionResponse};
use storyloom_error::StoryloomResult;

/// Ordered stream of response chunks.
pub type ChunkStream = Pin<Box<dyn Stream<Item = StoryloomResult<StreamChunk>> + Send>>;

/// Core trait that every completion backend implements.
///
/// A request is an optional system instruction plus ordered
/// `{role, content}` messages; the response is a single final string.
#[async_trait]
pub trait CompletionDriver: Send + Sync {
    /// Generate a complete response.
    async fn complete(&self, req: &CompletionRequest) -> StoryloomResult<CompletionResponse>;

    /// Provider name (e.g., "openai", "anthropic").
    fn provider_name(&self) -> &'static str;

    /// Model identifier.
    fn model_name(&self) -> &str;
}

/// Backends that deliver the response incrementally.
#[async_trait]
pub trait Streaming: CompletionDriver {
    /// Generate a streaming response.
    ///
    /// Chunks are yielded in the order the backend produced them. A failure
    /// after the stream opened arrives as an `Err` item; the consumer decides
    /// whether to keep the partial text.
    async fn complete_stream(&self, req: &CompletionRequest) -> StoryloomResult<ChunkStream>;
}
