//! Book command handlers.

use super::commands::OutputFormat;
use std::path::Path;
use storyloom::{
    prompt, Book, BookRepository, CompletionRequest, ConfigError, Exporter, FileBookRepository,
    JsonError, NarratorConfig, SegmentId, SegmentStore, StorageError, StorageErrorKind,
    StoryloomConfig, StoryloomResult, StorySegment, Template,
};
use tracing::{info, instrument, warn};

fn read_file(path: &Path) -> StoryloomResult<String> {
    if !path.exists() {
        let missing = path.display().to_string();
        return Err(StorageError::new(StorageErrorKind::NotFound(missing)).into());
    }
    Ok(std::fs::read_to_string(path).map_err(|e| {
        StorageError::new(StorageErrorKind::FileRead(format!("{}: {}", path.display(), e)))
    })?)
}

/// Load a persisted book document.
pub(crate) fn load_book(path: &Path) -> StoryloomResult<Book> {
    let contents = read_file(path)?;
    Ok(serde_json::from_str(&contents)
        .map_err(|e| JsonError::new(format!("Failed to parse book {}: {}", path.display(), e)))?)
}

/// Load a template from JSON, or from TOML when the file ends in `.toml`.
pub(crate) fn load_template(path: &Path) -> StoryloomResult<Template> {
    let contents = read_file(path)?;
    if path.extension().is_some_and(|ext| ext == "toml") {
        Ok(toml::from_str(&contents).map_err(|e| {
            ConfigError::new(format!("Failed to parse template {}: {}", path.display(), e))
        })?)
    } else {
        Ok(serde_json::from_str(&contents).map_err(|e| {
            JsonError::new(format!("Failed to parse template {}: {}", path.display(), e))
        })?)
    }
}

/// The narration request for `book` as it stands.
pub(crate) fn compose_context(
    config: &StoryloomConfig,
    book: &Book,
    template: &Template,
    until: Option<&str>,
    input: &str,
) -> StoryloomResult<CompletionRequest> {
    let narrator = NarratorConfig::from_config(config)?;
    let store = SegmentStore::from_book(book);
    let until = until.map(SegmentId::from);
    let story = narrator.assembler().story_so_far(&store, until.as_ref())?;
    let template = template.resolved(narrator.prompt_defaults());
    Ok(prompt::narration_request(&template, store.chapters(), &story, input))
}

/// Print the narration request for a book.
#[instrument(skip_all, fields(book = %book_path.display()))]
pub fn print_context(
    config: &StoryloomConfig,
    book_path: &Path,
    template_path: &Path,
    until: Option<&str>,
    input: &str,
    format: OutputFormat,
) -> StoryloomResult<()> {
    let book = load_book(book_path)?;
    let template = load_template(template_path)?;
    let request = compose_context(config, &book, &template, until, input)?;

    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&request)
                .map_err(|e| JsonError::new(format!("Failed to serialize request: {}", e)))?;
            println!("{}", json);
        }
        OutputFormat::Human => {
            if let Some(system) = request.system() {
                println!("=== system ===\n{}\n", system);
            }
            for message in request.messages() {
                println!("=== {} ===\n{}\n", message.role(), message.content());
            }
        }
    }
    Ok(())
}

/// Export a book to `out_dir`, or to stdout.
#[instrument(skip_all, fields(book = %book_path.display()))]
pub fn export_book(
    config: &StoryloomConfig,
    book_path: &Path,
    out_dir: &Path,
    stdout: bool,
) -> StoryloomResult<()> {
    let book = load_book(book_path)?;
    let narrator = NarratorConfig::from_config(config)?;
    let export = Exporter::new(narrator.export_assembler().clone()).export(&book)?;

    if stdout {
        println!("{}", export.content());
    } else {
        let path = export.write_to(out_dir)?;
        info!(path = %path.display(), "Exported book");
        println!("{}", path.display());
    }
    Ok(())
}

fn flags(segment: &StorySegment) -> String {
    [
        (*segment.to_summarize(), 'Q'),
        (segment.is_summarized(), 'S'),
        (segment.is_chaptered(), 'C'),
        (*segment.exclude_from_prev_story(), 'X'),
        (*segment.incomplete(), 'I'),
    ]
    .iter()
    .map(|(set, flag)| if *set { *flag } else { '-' })
    .collect()
}

fn preview(content: &str) -> String {
    let line = content.lines().next().unwrap_or_default();
    if line.chars().count() > 48 || content.lines().nth(1).is_some() {
        format!("{}...", line.chars().take(48).collect::<String>())
    } else {
        line.to_string()
    }
}

/// Print every segment with its annotations.
pub fn inspect_book(book_path: &Path, format: OutputFormat) -> StoryloomResult<()> {
    let book = load_book(book_path)?;

    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(book.story_segments())
                .map_err(|e| JsonError::new(format!("Failed to serialize segments: {}", e)))?;
            println!("{}", json);
        }
        OutputFormat::Human => {
            println!(
                "{} (version {}, {} segments, {} summaries, {} chapters)",
                book.name().as_deref().unwrap_or(book.book_id()),
                book.version(),
                book.story_segments().len(),
                book.segment_summaries().len(),
                book.chapters().len()
            );
            println!("{:<4} {:<38} {:<9} {:>3} {:<5} TEXT", "#", "ID", "ROLE", "DAY", "FLAGS");
            for (index, segment) in book.story_segments().iter().enumerate() {
                println!(
                    "{:<4} {:<38} {:<9} {:>3} {:<5} {}",
                    index,
                    segment.id().as_str(),
                    segment.role().to_string(),
                    segment.day(),
                    flags(segment),
                    preview(segment.content())
                );
            }
            println!("\nFLAGS: Q queued, S summarized, C chaptered, X excluded, I incomplete");
        }
    }
    Ok(())
}

/// Validate a persisted book and report dangling references.
pub fn check_book(book_path: &Path) -> StoryloomResult<()> {
    let book = load_book(book_path)?;
    let store = SegmentStore::from_book(&book);
    store.validate()?;

    let issues = store.integrity_issues();
    for issue in &issues {
        warn!(book_id = %book.book_id(), "{}", issue);
        println!("warning: {}", issue);
    }
    println!(
        "{}: {} segments valid, {} integrity warnings",
        book.book_id(),
        store.len(),
        issues.len()
    );
    Ok(())
}

/// Print the ids of every book in a repository directory.
pub async fn list_books(dir: &Path) -> StoryloomResult<()> {
    let repo = FileBookRepository::new(dir)?;
    for id in repo.list_ids().await? {
        println!("{}", id);
    }
    Ok(())
}
