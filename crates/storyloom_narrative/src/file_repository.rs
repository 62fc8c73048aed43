//! JSON file persistence for books and templates.
//!
//! Each document is stored as `<id>.json` under its own directory. Saves are
//! serialized per repository, so the version check and the write happen as
//! one step, and every write lands through a temp file and a rename.

use async_trait::async_trait;
use derive_getters::Getters;
use serde::{de::DeserializeOwned, Serialize};
use std::path::{Path, PathBuf};
use storyloom_core::{Book, Template};
use storyloom_error::{
    ConflictError, JsonError, StorageError, StorageErrorKind, StoryloomResult, ValidationError,
    ValidationErrorKind,
};
use storyloom_interface::{BookRepository, TemplateRepository};
use tokio::sync::Mutex;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

fn ensure_dir(dir: &Path) -> StoryloomResult<()> {
    if !dir.exists() {
        std::fs::create_dir_all(dir).map_err(|e| {
            StorageError::new(StorageErrorKind::DirectoryCreation(format!(
                "{}: {}",
                dir.display(),
                e
            )))
        })?;
    }
    Ok(())
}

/// Reject ids that would name a file outside the target directory.
pub(crate) fn check_document_id(id: &str) -> StoryloomResult<()> {
    if id.trim().is_empty() || id.contains(['/', '\\']) || id.contains("..") {
        return Err(ValidationError::new(ValidationErrorKind::InvalidId(id.to_string())).into());
    }
    Ok(())
}

fn document_path(dir: &Path, id: &str) -> StoryloomResult<PathBuf> {
    check_document_id(id)?;
    Ok(dir.join(format!("{}.json", id)))
}

async fn document_exists(path: &Path) -> bool {
    tokio::fs::try_exists(path).await.unwrap_or(false)
}

async fn read_document<T: DeserializeOwned>(path: &Path, id: &str) -> StoryloomResult<T> {
    let contents = tokio::fs::read(path).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            StorageError::new(StorageErrorKind::NotFound(id.to_string()))
        } else {
            StorageError::new(StorageErrorKind::FileRead(format!("{}: {}", path.display(), e)))
        }
    })?;
    let document = serde_json::from_slice(&contents)
        .map_err(|e| JsonError::new(format!("Failed to parse {}: {}", path.display(), e)))?;
    Ok(document)
}

/// Write to a sibling temp file, then rename over the target.
async fn write_document<T: Serialize>(path: &Path, document: &T) -> StoryloomResult<()> {
    let contents = serde_json::to_string_pretty(document)
        .map_err(|e| JsonError::new(format!("Failed to serialize document: {}", e)))?;

    let temp_path = path.with_extension("json.tmp");
    tokio::fs::write(&temp_path, contents).await.map_err(|e| {
        StorageError::new(StorageErrorKind::FileWrite(format!(
            "{}: {}",
            temp_path.display(),
            e
        )))
    })?;

    tokio::fs::rename(&temp_path, path).await.map_err(|e| {
        StorageError::new(StorageErrorKind::FileWrite(format!(
            "rename {} to {}: {}",
            temp_path.display(),
            path.display(),
            e
        )))
    })?;
    Ok(())
}

/// Book repository backed by one JSON file per book.
#[derive(Debug, Getters)]
pub struct FileBookRepository {
    /// Directory holding `<book_id>.json` files
    dir: PathBuf,
    #[getter(skip)]
    write_lock: Mutex<()>,
}

impl FileBookRepository {
    /// Open (and create if needed) a book directory.
    pub fn new(dir: impl AsRef<Path>) -> StoryloomResult<Self> {
        let dir = dir.as_ref().to_path_buf();
        ensure_dir(&dir)?;
        debug!(path = %dir.display(), "Initialized book repository");
        Ok(Self {
            dir,
            write_lock: Mutex::new(()),
        })
    }
}

#[async_trait]
impl BookRepository for FileBookRepository {
    async fn load(&self, book_id: &str) -> StoryloomResult<Book> {
        let path = document_path(&self.dir, book_id)?;
        let book: Book = read_document(&path, book_id).await?;
        debug!(book_id, version = *book.version(), "Loaded book");
        Ok(book)
    }

    #[instrument(skip_all, fields(book_id = %book.book_id()))]
    async fn create(&self, book: &Book) -> StoryloomResult<Book> {
        let _guard = self.write_lock.lock().await;
        let path = document_path(&self.dir, book.book_id())?;
        if document_exists(&path).await {
            return Err(StorageError::new(StorageErrorKind::AlreadyExists(
                book.book_id().clone(),
            ))
            .into());
        }
        let stored = book.with_version(0);
        write_document(&path, &stored).await?;
        debug!("Created book");
        Ok(stored)
    }

    #[instrument(skip_all, fields(book_id = %book.book_id(), submitted = *book.version()))]
    async fn save(&self, book: &Book) -> StoryloomResult<Book> {
        let _guard = self.write_lock.lock().await;
        let path = document_path(&self.dir, book.book_id())?;
        let stored: Book = read_document(&path, book.book_id()).await?;
        if stored.version() != book.version() {
            warn!(stored = *stored.version(), "Rejected stale save");
            return Err(
                ConflictError::new(book.book_id().clone(), *book.version(), *stored.version())
                    .into(),
            );
        }
        let saved = book.with_version(book.version() + 1);
        write_document(&path, &saved).await?;
        debug!(version = *saved.version(), "Saved book");
        Ok(saved)
    }

    async fn list_ids(&self) -> StoryloomResult<Vec<String>> {
        let read_error = |e: std::io::Error| {
            StorageError::new(StorageErrorKind::FileRead(format!(
                "{}: {}",
                self.dir.display(),
                e
            )))
        };
        let mut entries = tokio::fs::read_dir(&self.dir).await.map_err(read_error)?;

        let mut ids = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(read_error)? {
            let path = entry.path();
            if !path.extension().is_some_and(|ext| ext == "json") {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                ids.push(stem.to_string());
            }
        }
        ids.sort();
        Ok(ids)
    }
}

/// Template repository backed by one JSON file per template.
#[derive(Debug, Clone, Getters)]
pub struct FileTemplateRepository {
    /// Directory holding `<template_id>.json` files
    dir: PathBuf,
}

impl FileTemplateRepository {
    /// Open (and create if needed) a template directory.
    pub fn new(dir: impl AsRef<Path>) -> StoryloomResult<Self> {
        let dir = dir.as_ref().to_path_buf();
        ensure_dir(&dir)?;
        Ok(Self { dir })
    }
}

#[async_trait]
impl TemplateRepository for FileTemplateRepository {
    async fn load(&self, template_id: &str) -> StoryloomResult<Template> {
        let path = document_path(&self.dir, template_id)?;
        read_document(&path, template_id).await
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
        write_document(&document_path(&self.dir, &id)?, &stored).await?;
        debug!(template_id = %id, "Saved template");
        Ok(stored)
    }
}
