//! Mock streaming driver for testing.

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use std::sync::{Arc, Mutex};
use storyloom_core::{CompletionRequest, CompletionResponse};
use storyloom_error::{GenerationError, GenerationErrorKind, StoryloomError, StoryloomResult};
use storyloom_interface::{ChunkStream, CompletionDriver, FinishReason, StreamChunk, Streaming};

/// Behavior configuration for mock streams.
#[derive(Debug, Clone)]
pub enum MockBehavior {
    /// Stream the chunks, then a final `Stop` chunk
    Chunks(Vec<String>),
    /// Stream the chunks, then fail with the error
    FailAfter {
        chunks: Vec<String>,
        error: GenerationErrorKind,
    },
    /// Refuse to open the stream
    OpenError(GenerationErrorKind),
    /// Stream the chunks, then never produce another item
    Hang(Vec<String>),
    /// One behavior per call; the last one repeats
    Sequence(Vec<MockBehavior>),
}

/// Mock streaming driver.
///
/// Clones share call counts and captured requests, so a test can hand one
/// clone to a component and inspect the other.
#[derive(Debug, Clone)]
pub struct MockStreamingDriver {
    behavior: MockBehavior,
    call_count: Arc<Mutex<usize>>,
    requests: Arc<Mutex<Vec<CompletionRequest>>>,
}

fn owned(chunks: &[&str]) -> Vec<String> {
    chunks.iter().map(|c| c.to_string()).collect()
}

fn generation_error(kind: GenerationErrorKind) -> StoryloomError {
    GenerationError::new(kind).into()
}

impl MockStreamingDriver {
    /// Mock that streams `chunks` and finishes normally.
    pub fn new_chunks(chunks: &[&str]) -> Self {
        Self::new_with_behavior(MockBehavior::Chunks(owned(chunks)))
    }

    /// Mock that streams `chunks`, then fails mid-stream.
    #[allow(dead_code)]
    pub fn new_fail_after(chunks: &[&str], error: GenerationErrorKind) -> Self {
        Self::new_with_behavior(MockBehavior::FailAfter {
            chunks: owned(chunks),
            error,
        })
    }

    /// Mock whose stream never opens.
    #[allow(dead_code)]
    pub fn new_open_error(error: GenerationErrorKind) -> Self {
        Self::new_with_behavior(MockBehavior::OpenError(error))
    }

    /// Mock that streams `chunks`, then stalls forever.
    #[allow(dead_code)]
    pub fn new_hang(chunks: &[&str]) -> Self {
        Self::new_with_behavior(MockBehavior::Hang(owned(chunks)))
    }

    /// Mock replying with one full text per call.
    #[allow(dead_code)]
    pub fn new_replies(replies: &[&str]) -> Self {
        Self::new_with_behavior(MockBehavior::Sequence(
            replies
                .iter()
                .map(|r| MockBehavior::Chunks(vec![r.to_string()]))
                .collect(),
        ))
    }

    /// Mock with custom behavior.
    pub fn new_with_behavior(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            call_count: Arc::new(Mutex::new(0)),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Number of streams requested so far.
    #[allow(dead_code)]
    pub fn call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }

    /// Every request received, in order.
    #[allow(dead_code)]
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }

    fn record(&self, request: &CompletionRequest) -> usize {
        self.requests.lock().unwrap().push(request.clone());
        let mut count = self.call_count.lock().unwrap();
        let current = *count;
        *count += 1;
        current
    }

    fn behavior_for(&self, call: usize) -> MockBehavior {
        match &self.behavior {
            MockBehavior::Sequence(steps) if !steps.is_empty() => {
                steps[call.min(steps.len() - 1)].clone()
            }
            MockBehavior::Sequence(_) => MockBehavior::Chunks(Vec::new()),
            other => other.clone(),
        }
    }
}

fn text_items(chunks: Vec<String>) -> Vec<StoryloomResult<StreamChunk>> {
    chunks.into_iter().map(|c| Ok(StreamChunk::text(c))).collect()
}

#[async_trait]
impl CompletionDriver for MockStreamingDriver {
    async fn complete(&self, request: &CompletionRequest) -> StoryloomResult<CompletionResponse> {
        let mut stream = self.complete_stream(request).await?;
        let mut content = String::new();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            content.push_str(chunk.content());
            if chunk.is_final() {
                break;
            }
        }
        Ok(CompletionResponse::new(content))
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }

    fn model_name(&self) -> &str {
        "mock-storyteller"
    }
}

#[async_trait]
impl Streaming for MockStreamingDriver {
    async fn complete_stream(&self, request: &CompletionRequest) -> StoryloomResult<ChunkStream> {
        let call = self.record(request);
        let stream: ChunkStream = match self.behavior_for(call) {
            MockBehavior::Chunks(chunks) => {
                let mut items = text_items(chunks);
                items.push(Ok(StreamChunk::finished(FinishReason::Stop)));
                Box::pin(stream::iter(items))
            }
            MockBehavior::FailAfter { chunks, error } => {
                let mut items = text_items(chunks);
                items.push(Err(generation_error(error)));
                Box::pin(stream::iter(items))
            }
            MockBehavior::OpenError(error) => return Err(generation_error(error)),
            MockBehavior::Hang(chunks) => {
                Box::pin(stream::iter(text_items(chunks)).chain(stream::pending()))
            }
            MockBehavior::Sequence(_) => Box::pin(stream::empty()),
        };
        Ok(stream)
    }
}
