//! Role types for story turns.

use serde::{Deserialize, Serialize};

/// Who produced a story turn.
///
/// # Examples
///
/// ```
/// use storyloom_core::Role;
///
/// assert_ne!(Role::User, Role::Assistant);
/// assert_eq!(format!("{}", Role::Assistant), "assistant");
/// assert_eq!(serde_json::to_string(&Role::User).unwrap(), "\"user\"");
/// ```
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
    derive_more::Display,
)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Instruction typed by the writer
    #[display("user")]
    User,
    /// Prose generated by the model
    #[display("assistant")]
    Assistant,
}
