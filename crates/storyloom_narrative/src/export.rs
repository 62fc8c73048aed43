//! Whole-book export.

use crate::file_repository::check_document_id;
use crate::{ContextAssembler, Inclusion, SegmentStore};
use derive_getters::Getters;
use std::path::{Path, PathBuf};
use storyloom_core::Book;
use storyloom_error::{StorageError, StorageErrorKind, StoryloomResult};
use tracing::{debug, instrument};

/// A rendered export document.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct StoryExport {
    /// Suggested file name, `Story-{bookId}-[NN].md`
    filename: String,
    /// Document body
    content: String,
}

impl StoryExport {
    /// Write the document into `dir` under its suggested name.
    ///
    /// Names that would land outside `dir` are rejected.
    pub fn write_to(&self, dir: impl AsRef<Path>) -> StoryloomResult<PathBuf> {
        check_document_id(&self.filename)?;
        let path = dir.as_ref().join(&self.filename);
        std::fs::write(&path, &self.content).map_err(|e| {
            StorageError::new(StorageErrorKind::FileWrite(format!("{}: {}", path.display(), e)))
        })?;
        debug!(path = %path.display(), bytes = self.content.len(), "Wrote export");
        Ok(path)
    }
}

/// Export file name for a book with `segment_count` segments.
///
/// # Examples
///
/// ```
/// use storyloom_narrative::export_filename;
///
/// assert_eq!(export_filename("abc", 7), "Story-abc-[07].md");
/// assert_eq!(export_filename("abc", 123), "Story-abc-[123].md");
/// ```
pub fn export_filename(book_id: &str, segment_count: usize) -> String {
    format!("Story-{}-[{:02}].md", book_id, segment_count)
}

/// Renders a book's full narrative for download.
///
/// Every assistant segment takes part, excluded asides included, joined
/// with the export divider. Exporting never changes the book.
#[derive(Debug, Clone)]
pub struct Exporter {
    assembler: ContextAssembler,
}

impl Default for Exporter {
    fn default() -> Self {
        Self::new(ContextAssembler::new("\n\n---\n\n"))
    }
}

impl Exporter {
    /// Exporter using `assembler`'s divider.
    pub fn new(assembler: ContextAssembler) -> Self {
        Self { assembler }
    }

    /// Render `book`.
    #[instrument(skip_all, fields(book_id = %book.book_id()))]
    pub fn export(&self, book: &Book) -> StoryloomResult<StoryExport> {
        let store = SegmentStore::from_book(book);
        let content =
            self.assembler
                .assemble(store.segments(), store.summaries(), None, Inclusion::ForceAll)?;
        Ok(StoryExport {
            filename: export_filename(book.book_id(), store.len()),
            content,
        })
    }
}
