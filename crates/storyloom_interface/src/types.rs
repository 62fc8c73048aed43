//! Core type definitions for the storyloom interface.

use serde::{Deserialize, Serialize};

/// A single chunk from a streaming response.
///
/// # Examples
///
/// ```
/// use storyloom_interface::{FinishReason, StreamChunk};
///
/// let chunk = StreamChunk::text("You head north");
/// assert!(!chunk.is_final());
///
/// let last = StreamChunk::finished(FinishReason::Stop);
/// assert!(last.is_final());
/// assert!(last.content().is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_getters::Getters)]
pub struct StreamChunk {
    /// Incremental text
    content: String,
    /// Whether this is the final chunk
    #[getter(skip)]
    is_final: bool,
    /// Finish reason, set on the final chunk
    #[serde(skip_serializing_if = "Option::is_none")]
    finish_reason: Option<FinishReason>,
}

impl StreamChunk {
    /// A non-final text delta.
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            is_final: false,
            finish_reason: None,
        }
    }

    /// An empty final chunk carrying the finish reason.
    pub fn finished(reason: FinishReason) -> Self {
        Self {
            content: String::new(),
            is_final: true,
            finish_reason: Some(reason),
        }
    }

    /// Whether the backend marked this as the last chunk.
    pub fn is_final(&self) -> bool {
        self.is_final
    }
}

/// Why generation stopped.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    strum::EnumIter,
    strum::Display,
)]
pub enum FinishReason {
    /// Model completed naturally.
    Stop,
    /// Hit the backend's token limit.
    Length,
    /// Content was filtered.
    ContentFilter,
    /// Other/unknown reason.
    Other,
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn finish_reasons_serialize_by_name() {
        for reason in FinishReason::iter() {
            let json = serde_json::to_string(&reason).unwrap();
            assert_eq!(json, format!("\"{}\"", reason));
        }
    }
}
