//! Storage error types.

/// Kinds of storage errors.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum StorageErrorKind {
    /// Requested document does not exist
    #[display("Not found: {}", _0)]
    NotFound(String),
    /// Failed to create storage directory
    #[display("Failed to create storage directory: {}", _0)]
    DirectoryCreation(String),
    /// Failed to read file
    #[display("Failed to read file: {}", _0)]
    FileRead(String),
    /// Failed to write file
    #[display("Failed to write file: {}", _0)]
    FileWrite(String),
    /// Document already exists
    #[display("Already exists: {}", _0)]
    AlreadyExists(String),
}

/// Storage error with location tracking.
///
/// # Examples
///
/// ```
/// use storyloom_error::{StorageError, StorageErrorKind};
///
/// let err = StorageError::new(StorageErrorKind::NotFound("book-1".to_string()));
/// assert!(format!("{}", err).contains("Not found"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Storage Error: {} at line {} in {}", kind, line, file)]
pub struct StorageError {
    /// The kind of error that occurred
    pub kind: StorageErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl StorageError {
    /// Create a new storage error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: StorageErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
