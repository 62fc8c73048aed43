//! Top-level error wrapper types.

use crate::{
    ConfigError, ConflictError, GenerationError, JsonError, StorageError, ValidationError,
};

/// Every error condition a storyloom crate can report.
///
/// # Examples
///
/// ```
/// use storyloom_error::{StoryloomError, StorageError, StorageErrorKind};
///
/// let storage = StorageError::new(StorageErrorKind::NotFound("book-1".to_string()));
/// let err: StoryloomError = storage.into();
/// assert!(format!("{}", err).contains("Storage Error"));
/// ```
#[derive(Debug, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum StoryloomErrorKind {
    /// Rejected operation, state unchanged
    #[from(ValidationError)]
    Validation(ValidationError),
    /// Optimistic concurrency version mismatch
    #[from(ConflictError)]
    Conflict(ConflictError),
    /// Persistence failure
    #[from(StorageError)]
    Storage(StorageError),
    /// Completion backend failure
    #[from(GenerationError)]
    Generation(GenerationError),
    /// JSON serialization/deserialization error
    #[from(JsonError)]
    Json(JsonError),
    /// Configuration error
    #[from(ConfigError)]
    Config(ConfigError),
}

/// Storyloom error with kind discrimination.
///
/// # Examples
///
/// ```
/// use storyloom_error::{ConflictError, StoryloomResult};
///
/// fn save() -> StoryloomResult<()> {
///     Err(ConflictError::new("book-1", 3, 4))?
/// }
///
/// let err = save().unwrap_err();
/// assert!(err.is_conflict());
/// assert!(!err.is_validation());
/// ```
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("Storyloom Error: {}", _0)]
pub struct StoryloomError(Box<StoryloomErrorKind>);

impl StoryloomError {
    /// Create a new error from a kind.
    pub fn new(kind: StoryloomErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &StoryloomErrorKind {
        &self.0
    }

    /// True when a save lost an optimistic concurrency race.
    pub fn is_conflict(&self) -> bool {
        matches!(*self.0, StoryloomErrorKind::Conflict(_))
    }

    /// True when the operation was rejected before touching any state.
    pub fn is_validation(&self) -> bool {
        matches!(*self.0, StoryloomErrorKind::Validation(_))
    }

    /// The validation failure, if this is one.
    pub fn validation_kind(&self) -> Option<&crate::ValidationErrorKind> {
        match &*self.0 {
            StoryloomErrorKind::Validation(err) => Some(&err.kind),
            _ => None,
        }
    }
}

// Generic From implementation for any type that converts to StoryloomErrorKind
impl<T> From<T> for StoryloomError
where
    T: Into<StoryloomErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for storyloom operations.
pub type StoryloomResult<T> = std::result::Result<T, StoryloomError>;
