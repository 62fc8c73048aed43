//! Request and response types for text completion.

use crate::Message;
use serde::{Deserialize, Serialize};

/// A completion request: an optional system instruction plus ordered messages.
///
/// # Examples
///
/// ```
/// use storyloom_core::{CompletionRequest, Message};
///
/// let request = CompletionRequest::builder()
///     .system(Some("Follow the instruction specified after the PROMPT:".to_string()))
///     .messages(vec![Message::user("Make it darker.")])
///     .build()
///     .unwrap();
///
/// assert_eq!(request.messages().len(), 1);
/// assert!(request.system().is_some());
/// ```
#[derive(
    Debug,
    Clone,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    derive_getters::Getters,
    derive_builder::Builder,
)]
#[builder(default)]
pub struct CompletionRequest {
    /// System instruction, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    /// Conversation messages in order
    messages: Vec<Message>,
}

impl CompletionRequest {
    /// Start building a request.
    pub fn builder() -> CompletionRequestBuilder {
        CompletionRequestBuilder::default()
    }

    /// Request made of user messages only.
    pub fn from_user_messages<I, S>(contents: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            system: None,
            messages: contents.into_iter().map(Message::user).collect(),
        }
    }

    /// Request with a system instruction and a single user message.
    pub fn with_system(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            system: Some(system.into()),
            messages: vec![Message::user(user)],
        }
    }
}

/// A complete, non-streamed completion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_getters::Getters)]
pub struct CompletionResponse {
    /// Generated text
    content: String,
}

impl CompletionResponse {
    /// Wrap generated text.
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }
}
