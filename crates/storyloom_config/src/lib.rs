//! Layered configuration for the storyloom story engine.
//!
//! Configuration is assembled with this precedence (later wins):
//! - Bundled defaults (`include_str!` from `storyloom.toml`)
//! - `~/.config/storyloom/storyloom.toml`
//! - `./storyloom.toml`
//!
//! The loaded value is handed to the story components at construction;
//! nothing here is global.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod settings;

pub use settings::{
    ContextSettings, PromptDefaults, StoryloomConfig, StreamSettings, SummarySettings,
};
