//! Command-line interface module.
//!
//! This module provides the CLI structure and command handlers for the storyloom binary.

mod commands;
mod story;

pub use commands::{Cli, Commands};
pub use story::{check_book, export_book, inspect_book, list_books, print_context};
