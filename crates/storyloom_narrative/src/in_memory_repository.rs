//! In-memory book and template repositories.
//!
//! HashMap-backed stores behind a tokio `RwLock`. They enforce the same
//! version contract as persistent stores, which makes them the reference
//! implementation for tests.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use storyloom_core::{Book, Template};
use storyloom_error::{ConflictError, StorageError, StorageErrorKind, StoryloomResult};
use storyloom_interface::{BookRepository, TemplateRepository};
use tokio::sync::RwLock;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

/// In-memory repository for books.
///
/// # Example
/// ```no_run
/// use storyloom_core::Book;
/// use storyloom_interface::BookRepository;
/// use storyloom_narrative::InMemoryBookRepository;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let repo = InMemoryBookRepository::new();
/// let stored = repo.create(&Book::new("b1", "t1")).await?;
/// let saved = repo.save(&stored).await?;
/// assert_eq!(*saved.version(), 1);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemoryBookRepository {
    books: Arc<RwLock<HashMap<String, Book>>>,
}

impl InMemoryBookRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored books.
    pub async fn len(&self) -> usize {
        self.books.read().await.len()
    }

    /// Check if the repository is empty.
    pub async fn is_empty(&self) -> bool {
        self.books.read().await.is_empty()
    }

    /// Remove every book.
    pub async fn clear(&self) {
        self.books.write().await.clear();
    }
}

fn not_found(id: &str) -> StorageError {
    StorageError::new(StorageErrorKind::NotFound(id.to_string()))
}

#[async_trait]
impl BookRepository for InMemoryBookRepository {
    async fn load(&self, book_id: &str) -> StoryloomResult<Book> {
        let books = self.books.read().await;
        Ok(books.get(book_id).cloned().ok_or_else(|| not_found(book_id))?)
    }

    #[instrument(skip_all, fields(book_id = %book.book_id()))]
    async fn create(&self, book: &Book) -> StoryloomResult<Book> {
        let mut books = self.books.write().await;
        if books.contains_key(book.book_id()) {
            return Err(StorageError::new(StorageErrorKind::AlreadyExists(
                book.book_id().clone(),
            ))
            .into());
        }
        let stored = book.with_version(0);
        books.insert(book.book_id().clone(), stored.clone());
        debug!("Created book");
        Ok(stored)
    }

    #[instrument(skip_all, fields(book_id = %book.book_id(), submitted = *book.version()))]
    async fn save(&self, book: &Book) -> StoryloomResult<Book> {
        let mut books = self.books.write().await;
        let stored = books
            .get(book.book_id())
            .ok_or_else(|| not_found(book.book_id()))?;
        if stored.version() != book.version() {
            warn!(stored = *stored.version(), "Rejected stale save");
            return Err(
                ConflictError::new(book.book_id().clone(), *book.version(), *stored.version())
                    .into(),
            );
        }
        let saved = book.with_version(book.version() + 1);
        books.insert(book.book_id().clone(), saved.clone());
        debug!(version = *saved.version(), "Saved book");
        Ok(saved)
    }

    async fn list_ids(&self) -> StoryloomResult<Vec<String>> {
        let mut ids: Vec<String> = self.books.read().await.keys().cloned().collect();
        ids.sort();
        Ok(ids)
    }
}

/// In-memory repository for templates.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTemplateRepository {
    templates: Arc<RwLock<HashMap<String, Template>>>,
}

impl InMemoryTemplateRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TemplateRepository for InMemoryTemplateRepository {
    async fn load(&self, template_id: &str) -> StoryloomResult<Template> {
        let templates = self.templates.read().await;
        Ok(templates
            .get(template_id)
            .cloned()
            .ok_or_else(|| not_found(template_id))?)
    }

    async fn save(&self, template: &Template) -> StoryloomResult<Template> {
        let id = template
            .template_id()
            .clone()
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| Uuid::now_v7().to_string());
        let stored = Template::new(
            Some(id.clone()),
            template.name().clone(),
            template.prompt().clone(),
            template.story_background().clone(),
        );
        self.templates.write().await.insert(id, stored.clone());
        debug!(template_id = ?stored.template_id(), "Saved template");
        Ok(stored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn save_increments_version_and_rejects_stale_copies() {
        let repo = InMemoryBookRepository::new();
        let v0 = repo.create(&Book::new("b1", "t1")).await.unwrap();
        let v1 = repo.save(&v0).await.unwrap();
        assert_eq!(*v1.version(), 1);

        let err = repo.save(&v0).await.unwrap_err();
        assert!(err.is_conflict());
        assert_eq!(*repo.load("b1").await.unwrap().version(), 1);
    }

    #[tokio::test]
    async fn create_rejects_taken_id() {
        let repo = InMemoryBookRepository::new();
        repo.create(&Book::new("b1", "t1")).await.unwrap();
        assert!(repo.create(&Book::new("b1", "t2")).await.is_err());
        assert_eq!(repo.len().await, 1);
    }

    #[tokio::test]
    async fn templates_get_an_id_on_first_save() {
        let repo = InMemoryTemplateRepository::new();
        let saved = repo
            .save(&Template::new(None, "Noir", Default::default(), "Rain."))
            .await
            .unwrap();
        let id = saved.template_id().clone().unwrap();
        assert_eq!(repo.load(&id).await.unwrap().name(), "Noir");
    }
}
