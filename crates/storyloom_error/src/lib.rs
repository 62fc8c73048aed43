//! Error types for the storyloom story engine.
//!
//! This crate provides the foundation error types used throughout the storyloom workspace.
//!
//! # Error Hierarchy
//!
//! All errors follow the `ErrorKind` + wrapper struct pattern:
//! - `*ErrorKind` enum defines specific error conditions
//! - `*Error` struct wraps the kind with source location tracking
//! - All constructors use `#[track_caller]` for automatic location capture
//!
//! Validation and conflict errors are recoverable:
//! the story state is never mutated when one is returned.
//!
//! # Examples
//!
//! ```
//! use storyloom_error::{StoryloomResult, ValidationError, ValidationErrorKind};
//!
//! fn wrap_chapter(title: &str) -> StoryloomResult<()> {
//!     if title.trim().is_empty() {
//!         Err(ValidationError::new(ValidationErrorKind::BlankField("title".to_string())))?
//!     }
//!     Ok(())
//! }
//!
//! assert!(wrap_chapter("   ").is_err());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod conflict;
mod error;
mod generation;
mod json;
mod storage;
mod validation;

pub use config::ConfigError;
pub use conflict::ConflictError;
pub use error::{StoryloomError, StoryloomErrorKind, StoryloomResult};
pub use generation::{GenerationError, GenerationErrorKind};
pub use json::JsonError;
pub use storage::{StorageError, StorageErrorKind};
pub use validation::{ValidationError, ValidationErrorKind};
