//! Segment summaries.

use crate::SummaryId;
use serde::{Deserialize, Serialize};

/// Condensed text standing in for a contiguous run of assistant segments.
///
/// Created once per summarization batch and never modified afterwards.
///
/// # Examples
///
/// ```
/// use storyloom_core::{SegmentSummary, SummaryId};
///
/// let summary = SegmentSummary::new(SummaryId::from("s-1"), "They went north.");
/// assert_eq!(summary.content(), "They went north.");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_getters::Getters)]
pub struct SegmentSummary {
    /// Summary identifier
    id: SummaryId,
    /// Generated (possibly hand-edited) short form
    content: String,
}

impl SegmentSummary {
    /// Create a summary record.
    pub fn new(id: SummaryId, content: impl Into<String>) -> Self {
        Self {
            id,
            content: content.into(),
        }
    }
}
