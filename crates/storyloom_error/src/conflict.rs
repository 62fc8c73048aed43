//! Optimistic concurrency conflict errors.

/// A save was rejected because the stored book changed since it was loaded.
///
/// The caller's local edits are untouched; resubmission after a refresh is
/// left to the user.
///
/// # Examples
///
/// ```
/// use storyloom_error::ConflictError;
///
/// let err = ConflictError::new("book-1", 3, 4);
/// assert_eq!(err.stored, 4);
/// assert!(format!("{}", err).contains("changed elsewhere"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display(
    "Conflict Error: book '{}' changed elsewhere (submitted version {}, stored version {}); refresh before saving, at line {} in {}",
    book_id,
    submitted,
    stored,
    line,
    file
)]
pub struct ConflictError {
    /// Book whose save was rejected
    pub book_id: String,
    /// Version the caller submitted
    pub submitted: u64,
    /// Version currently stored
    pub stored: u64,
    /// Line number where the error occurred
    pub line: u32,
    /// File where the error occurred
    pub file: &'static str,
}

impl ConflictError {
    /// Create a new ConflictError at the current location.
    #[track_caller]
    pub fn new(book_id: impl Into<String>, submitted: u64, stored: u64) -> Self {
        let location = std::panic::Location::caller();
        Self {
            book_id: book_id.into(),
            submitted,
            stored,
            line: location.line(),
            file: location.file(),
        }
    }
}
