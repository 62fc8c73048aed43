//! Construction-time settings shared by the story components.

use crate::{ContextAssembler, ResponseCleaner, StreamPolicy};
use derive_getters::Getters;
use derive_setters::Setters;
use storyloom_config::{StoryloomConfig, SummarySettings};
use storyloom_core::PromptConfig;
use storyloom_error::StoryloomResult;

/// Everything a narrator, summarizer, chapter wrapper or enhancer needs
/// besides its completion driver.
///
/// Built once from a [`StoryloomConfig`] and handed to each component;
/// individual pieces can be swapped with the `with_*` setters.
///
/// # Examples
///
/// ```
/// use storyloom_config::StoryloomConfig;
/// use storyloom_narrative::{ContextAssembler, NarratorConfig};
///
/// let config = NarratorConfig::from_config(&StoryloomConfig::default())?
///     .with_assembler(ContextAssembler::new("\n---\n"));
/// assert_eq!(config.assembler().divider(), "\n---\n");
/// # Ok::<(), storyloom_error::StoryloomError>(())
/// ```
#[derive(Debug, Clone, Getters, Setters)]
#[setters(prefix = "with_")]
pub struct NarratorConfig {
    /// Live story-so-far assembler
    assembler: ContextAssembler,
    /// Export assembler
    export_assembler: ContextAssembler,
    /// Stream bounds
    policy: StreamPolicy,
    /// System-wide prompt fallbacks
    prompt_defaults: PromptConfig,
    /// Segment summarization instruction
    summary: SummarySettings,
    /// Response post-processing
    cleaner: ResponseCleaner,
}

impl NarratorConfig {
    /// Settings derived from a loaded configuration.
    pub fn from_config(config: &StoryloomConfig) -> StoryloomResult<Self> {
        Ok(Self {
            assembler: ContextAssembler::from_settings(&config.context),
            export_assembler: ContextAssembler::for_export(&config.context),
            policy: StreamPolicy::from_settings(&config.stream),
            prompt_defaults: config.default_prompt(),
            summary: config.summary.clone(),
            cleaner: ResponseCleaner::new()?,
        })
    }
}
