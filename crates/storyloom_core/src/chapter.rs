//! Chapter records.

use crate::ChapterId;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// A closed narrative unit covering a contiguous prefix of segments.
///
/// The end state is a free-form structured snapshot of the world and
/// characters when the chapter closed.
///
/// # Examples
///
/// ```
/// use storyloom_core::{Chapter, ChapterId};
/// use serde_json::json;
///
/// let chapter = Chapter::new(
///     ChapterId::from("ch-1"),
///     "The Woods",
///     "The party entered the woods.",
///     json!({"location": "woods"}),
/// );
/// assert_eq!(chapter.title(), "The Woods");
/// assert_eq!(chapter.end_state()["location"], "woods");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, derive_getters::Getters)]
#[serde(rename_all = "camelCase")]
pub struct Chapter {
    /// Chapter identifier
    id: ChapterId,
    /// Writer-supplied title
    title: String,
    /// Prose compression of the chapter
    summary: String,
    /// Structured end-of-chapter state
    #[serde(default)]
    end_state: JsonValue,
}

impl Chapter {
    /// Create a chapter record.
    pub fn new(
        id: ChapterId,
        title: impl Into<String>,
        summary: impl Into<String>,
        end_state: JsonValue,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            summary: summary.into(),
            end_state,
        }
    }
}
