//! Chat messages exchanged with a completion backend.

use crate::Role;
use serde::{Deserialize, Serialize};

/// One message in a completion conversation.
///
/// # Examples
///
/// ```
/// use storyloom_core::{Message, MessageBuilder, Role};
///
/// let message = MessageBuilder::default()
///     .role(Role::User)
///     .content("STORY TO SUMMARIZE:\nIt rained.")
///     .build()
///     .unwrap();
///
/// assert_eq!(*message.role(), Role::User);
/// assert_eq!(message, Message::user("STORY TO SUMMARIZE:\nIt rained."));
/// ```
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    derive_getters::Getters,
    derive_builder::Builder,
)]
#[builder(setter(into))]
pub struct Message {
    /// Sender role
    role: Role,
    /// Text content
    content: String,
}

impl Message {
    /// Create a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    /// Create an assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}
