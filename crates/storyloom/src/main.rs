//! Storyloom CLI binary.
//!
//! This binary provides command-line access to persisted books:
//! - Print the prompt the next narration would send
//! - Export a book as Markdown
//! - Inspect segment annotations and check store invariants

use clap::Parser;

mod cli;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    use cli::{Cli, Commands, check_book, export_book, inspect_book, list_books, print_context};

    let cli = Cli::parse();
    storyloom::telemetry::init_console_telemetry(cli.verbose)?;

    let config = match &cli.config {
        Some(path) => storyloom::StoryloomConfig::from_file(path)?,
        None => storyloom::StoryloomConfig::load()?,
    };

    match cli.command {
        Commands::Context {
            book,
            template,
            until,
            input,
            format,
        } => {
            print_context(&config, &book, &template, until.as_deref(), &input, format)?;
        }

        Commands::Export { book, out_dir, stdout } => {
            export_book(&config, &book, &out_dir, stdout)?;
        }

        Commands::Inspect { book, format } => {
            inspect_book(&book, format)?;
        }

        Commands::Check { book } => {
            check_book(&book)?;
        }

        Commands::List { dir } => {
            list_books(&dir).await?;
        }
    }

    Ok(())
}
