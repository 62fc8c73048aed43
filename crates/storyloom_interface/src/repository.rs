//! Persistence boundaries for books and templates.

use async_trait::async_trait;
use storyloom_core::{Book, Template};
use storyloom_error::StoryloomResult;

/// Versioned persistence for books.
///
/// Implementations enforce optimistic concurrency: `save` succeeds only when
/// the submitted book's `version` equals the stored one, and the stored
/// version then increases by exactly one. A mismatch is reported as a
/// [`storyloom_error::ConflictError`] and leaves the stored book untouched.
#[async_trait]
pub trait BookRepository: Send + Sync {
    /// Load the full aggregate, or a `NotFound` storage error.
    async fn load(&self, book_id: &str) -> StoryloomResult<Book>;

    /// Store a new book at version 0.
    ///
    /// Fails with `AlreadyExists` when the id is taken.
    async fn create(&self, book: &Book) -> StoryloomResult<Book>;

    /// Replace a stored book, returning the aggregate with its new version.
    async fn save(&self, book: &Book) -> StoryloomResult<Book>;

    /// Ids of every stored book.
    async fn list_ids(&self) -> StoryloomResult<Vec<String>>;
}

/// Read/write access to templates.
///
/// Templates are never modified by the story engine; `save` exists for the
/// editing surface that owns them.
#[async_trait]
pub trait TemplateRepository: Send + Sync {
    /// Load a template by id, or a `NotFound` storage error.
    async fn load(&self, template_id: &str) -> StoryloomResult<Template>;

    /// Insert or replace a template.
    async fn save(&self, template: &Template) -> StoryloomResult<Template>;
}
