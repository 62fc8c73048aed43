//! Validation error types.
//!
//! Raised before any story state is touched: a rejected operation leaves the
//! segment store exactly as it was.

/// Specific validation failures for story operations.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum ValidationErrorKind {
    /// Segment id not present in the store
    #[display("Segment '{}' does not exist", _0)]
    UnknownSegment(String),
    /// Segment id already used by another segment
    #[display("Segment id '{}' is already in use", _0)]
    DuplicateSegment(String),
    /// Summary id not present in the book
    #[display("Summary '{}' does not exist", _0)]
    UnknownSummary(String),
    /// Chapter id not present in the book
    #[display("Chapter '{}' does not exist", _0)]
    UnknownChapter(String),
    /// Operation only valid on assistant segments
    #[display("Segment '{}' is not an assistant segment", _0)]
    NotAssistant(String),
    /// Segment already collapsed into a summary
    #[display("Segment '{}' is already summarized", _0)]
    AlreadySummarized(String),
    /// Segment already belongs to a chapter
    #[display("Segment '{}' already belongs to a chapter", _0)]
    AlreadyChaptered(String),
    /// Chaptering would leave an unchaptered segment before a chaptered one
    #[display("Segment '{}' cannot be chaptered: an earlier segment is not in a chapter", _0)]
    ChapterGap(String),
    /// New segment arrived with annotations it cannot carry yet
    #[display("New segment '{}' must not carry summary or chapter annotations", _0)]
    PreAnnotatedSegment(String),
    /// Summarization selection is empty
    #[display("No segments are marked for summarization")]
    EmptySelection,
    /// Summarization selection skips an unmarked assistant segment
    #[display("Segments to summarize must be contiguous: '{}' sits between marked segments", _0)]
    NonContiguousSelection(String),
    /// Summarization selection changed since the draft was prepared
    #[display("Summarization selection changed since the draft was prepared")]
    StaleSelection,
    /// Paragraph target must be at least one
    #[display("Target paragraph count must be at least 1")]
    ZeroParagraphs,
    /// Required text field is empty or whitespace
    #[display("{} cannot be empty", _0)]
    BlankField(String),
    /// End state text is not valid structured data
    #[display("End state is not valid JSON: {}", _0)]
    MalformedEndState(String),
    /// Redo requested on something other than the trailing assistant turn
    #[display("Redo is only allowed on the last segment when it is an assistant reply: {}", _0)]
    InvalidRedo(String),
    /// Segment is referenced by a summary or chapter and cannot be deleted
    #[display("Segment '{}' is part of a summary or chapter and cannot be deleted", _0)]
    SegmentLocked(String),
    /// Document id unusable as a storage key
    #[display("'{}' is not a valid document id", _0)]
    InvalidId(String),
}

/// Validation error with location tracking.
///
/// # Examples
///
/// ```
/// use storyloom_error::{ValidationError, ValidationErrorKind};
///
/// let err = ValidationError::new(ValidationErrorKind::EmptySelection);
/// assert!(format!("{}", err).contains("No segments"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Validation Error: {} at line {} in {}", kind, line, file)]
pub struct ValidationError {
    /// The specific validation failure
    pub kind: ValidationErrorKind,
    /// Line number where the error occurred
    pub line: u32,
    /// Source file where the error occurred
    pub file: &'static str,
}

impl ValidationError {
    /// Create a new ValidationError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: ValidationErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Get the error kind.
    pub fn kind(&self) -> &ValidationErrorKind {
        &self.kind
    }
}
